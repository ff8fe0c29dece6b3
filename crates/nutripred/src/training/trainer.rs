//! Bagged forest training.
//!
//! Trees are grown exact-greedy: every boundary between adjacent distinct
//! feature values is a candidate threshold, scored by the summed squared
//! error of the two children. Each tree sees its own bootstrap resample and
//! the forest averages the members, so no shrinkage or base score is
//! involved.

use ndarray::ArrayView2;

use super::config::TrainerConfig;
use super::sampling::BootstrapSampler;
use crate::repr::{BaggedForest, RegressionTree};
use crate::utils::Parallelism;

/// Node variance below this trains no further splits.
const VARIANCE_EPSILON: f64 = 1e-10;

// =============================================================================
// ForestTrainer
// =============================================================================

/// Trains one [`BaggedForest`] per call from a feature matrix and a target
/// vector.
#[derive(Debug, Clone, Copy)]
pub struct ForestTrainer<'a> {
    config: &'a TrainerConfig,
}

impl<'a> ForestTrainer<'a> {
    pub fn new(config: &'a TrainerConfig) -> Self {
        Self { config }
    }

    /// Train a forest of `config.n_trees` trees on bootstrap resamples.
    ///
    /// Tree `t` is seeded with `config.seed + t`, so the result is fully
    /// deterministic and independent of the parallelism mode.
    pub fn train<'b>(
        &self,
        features: ArrayView2<'b, f32>,
        targets: &'b [f32],
        parallelism: Parallelism,
    ) -> BaggedForest {
        debug_assert_eq!(features.nrows(), targets.len());

        let sampler = BootstrapSampler::new(features.nrows() as u32);
        let grower = TreeGrower {
            features,
            targets,
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
        };
        let seed = self.config.seed;

        let trees = parallelism.maybe_par_map(0..self.config.n_trees, |t| {
            let rows = sampler.sample(seed.wrapping_add(t as u64));
            grower.grow(&rows)
        });

        BaggedForest::from_trees(trees, features.ncols())
    }
}

// =============================================================================
// Tree Growing
// =============================================================================

/// One candidate split, scored by summed child SSE (lower is better).
struct BestSplit {
    feature: u32,
    threshold: f32,
    sse: f64,
}

/// Grows a single tree over a set of row indices.
struct TreeGrower<'a> {
    features: ArrayView2<'a, f32>,
    targets: &'a [f32],
    max_depth: u32,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

impl TreeGrower<'_> {
    /// Grow a tree over `rows`. An empty row set yields a zero leaf.
    fn grow(&self, rows: &[u32]) -> RegressionTree {
        let mut builder = TreeBuilder::default();
        if rows.is_empty() {
            builder.push_leaf(0.0);
        } else {
            let mut scratch = rows.to_vec();
            self.grow_node(&mut builder, &mut scratch, 0);
        }
        builder.finish()
    }

    /// Grow the subtree for `rows`, returning its root node id.
    ///
    /// Nodes are appended in preorder, so the first call lands at id 0.
    fn grow_node(&self, builder: &mut TreeBuilder, rows: &mut [u32], depth: u32) -> u32 {
        let (mean, variance) = self.mean_variance(rows);

        if depth >= self.max_depth
            || rows.len() < self.min_samples_split
            || variance < VARIANCE_EPSILON
        {
            return builder.push_leaf(mean);
        }

        let Some(split) = self.find_best_split(rows) else {
            return builder.push_leaf(mean);
        };

        let node = builder.push_split(split.feature, split.threshold);
        let mid = self.partition(rows, split.feature, split.threshold);
        let (left_rows, right_rows) = rows.split_at_mut(mid);

        let left = self.grow_node(builder, left_rows, depth + 1);
        let right = self.grow_node(builder, right_rows, depth + 1);
        builder.set_children(node, left, right);
        node
    }

    fn mean_variance(&self, rows: &[u32]) -> (f32, f64) {
        let n = rows.len();
        if n == 0 {
            return (0.0, 0.0);
        }
        let sum: f64 = rows.iter().map(|&r| self.targets[r as usize] as f64).sum();
        let mean = sum / n as f64;
        if n == 1 {
            return (mean as f32, 0.0);
        }
        let var = rows
            .iter()
            .map(|&r| {
                let d = self.targets[r as usize] as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;
        (mean as f32, var)
    }

    /// Scan every feature for the boundary with the lowest child SSE.
    ///
    /// Candidates that leave either side under `min_samples_leaf` are
    /// skipped. Returns `None` when no candidate reduces the parent SSE.
    fn find_best_split(&self, rows: &[u32]) -> Option<BestSplit> {
        let n = rows.len();

        let total: f64 = rows.iter().map(|&r| self.targets[r as usize] as f64).sum();
        let total_sq: f64 = rows
            .iter()
            .map(|&r| {
                let t = self.targets[r as usize] as f64;
                t * t
            })
            .sum();
        let parent_sse = (total_sq - total * total / n as f64).max(0.0);

        let mut best: Option<BestSplit> = None;
        let mut pairs: Vec<(f32, f64)> = Vec::with_capacity(n);

        for feature in 0..self.features.ncols() {
            pairs.clear();
            pairs.extend(rows.iter().map(|&r| {
                (
                    self.features[(r as usize, feature)],
                    self.targets[r as usize] as f64,
                )
            }));
            pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0f64;
            let mut left_sq = 0.0f64;
            for i in 1..n {
                let (prev_value, prev_target) = pairs[i - 1];
                left_sum += prev_target;
                left_sq += prev_target * prev_target;

                let value = pairs[i].0;
                if value <= prev_value {
                    continue;
                }
                if i < self.min_samples_leaf || n - i < self.min_samples_leaf {
                    continue;
                }

                // Halfway between adjacent distinct values; rounding can pull
                // the midpoint onto the lower value, which would route the
                // whole boundary right, so such candidates are dropped.
                let threshold = (prev_value + value) / 2.0;
                if threshold <= prev_value {
                    continue;
                }

                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / i as f64).max(0.0)
                    + (right_sq - right_sum * right_sum / (n - i) as f64).max(0.0);

                let is_better = match &best {
                    None => true,
                    Some(b) => sse < b.sse,
                };
                if is_better {
                    best = Some(BestSplit {
                        feature: feature as u32,
                        threshold,
                        sse,
                    });
                }
            }
        }

        best.filter(|b| parent_sse - b.sse > 0.0)
    }

    /// Partition `rows` in place by `feature < threshold`; returns the size
    /// of the left side.
    fn partition(&self, rows: &mut [u32], feature: u32, threshold: f32) -> usize {
        let mut mid = 0;
        for i in 0..rows.len() {
            if self.features[(rows[i] as usize, feature as usize)] < threshold {
                rows.swap(mid, i);
                mid += 1;
            }
        }
        mid
    }
}

// =============================================================================
// TreeBuilder
// =============================================================================

/// Append-only arena for the SoA tree arrays.
///
/// Split nodes are pushed with placeholder children and patched once the
/// subtrees are grown.
#[derive(Default)]
struct TreeBuilder {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
}

impl TreeBuilder {
    fn push_leaf(&mut self, value: f32) -> u32 {
        let id = self.split_indices.len() as u32;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(true);
        self.is_leaf.push(true);
        self.leaf_values.push(value);
        id
    }

    fn push_split(&mut self, feature: u32, threshold: f32) -> u32 {
        let id = self.split_indices.len() as u32;
        self.split_indices.push(feature);
        self.split_thresholds.push(threshold);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(true);
        self.is_leaf.push(false);
        self.leaf_values.push(0.0);
        id
    }

    fn set_children(&mut self, node: u32, left: u32, right: u32) {
        self.left_children[node as usize] = left;
        self.right_children[node as usize] = right;
    }

    fn finish(self) -> RegressionTree {
        RegressionTree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.default_left,
            self.is_leaf,
            self.leaf_values,
        )
    }
}
