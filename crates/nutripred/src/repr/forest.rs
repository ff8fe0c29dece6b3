//! Bagged forest representation (collection of averaged trees).

use ndarray::ArrayView2;

use super::tree::{RegressionTree, TreeValidationError};

/// Structural validation errors for [`BaggedForest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("forest has no trees")]
    EmptyForest,

    #[error("tree {tree_idx} splits on feature {index} but the forest has {n_features} features")]
    SplitIndexOutOfRange {
        tree_idx: usize,
        index: u32,
        n_features: usize,
    },

    #[error("tree {tree_idx}: {error}")]
    InvalidTree {
        tree_idx: usize,
        #[source]
        error: TreeValidationError,
    },
}

/// A bagged ensemble of regression trees.
///
/// Unlike boosted ensembles, trees here are peers: the forest prediction is
/// the plain average of the tree predictions, with no learning rate or base
/// score. Every tree was fitted on its own bootstrap resample of the same
/// training partition.
#[derive(Debug, Clone, PartialEq)]
pub struct BaggedForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl BaggedForest {
    /// Create an empty forest over `n_features` input columns.
    pub fn new(n_features: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_features,
        }
    }

    /// Create a forest directly from member trees.
    pub fn from_trees(trees: Vec<RegressionTree>, n_features: usize) -> Self {
        Self { trees, n_features }
    }

    /// Append one more member tree.
    pub fn push_tree(&mut self, tree: RegressionTree) {
        self.trees.push(tree);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// The member tree at `idx`.
    #[inline]
    pub fn tree(&self, idx: usize) -> &RegressionTree {
        &self.trees[idx]
    }

    /// Iterate over the member trees in insertion order.
    pub fn trees(&self) -> impl Iterator<Item = &RegressionTree> {
        self.trees.iter()
    }

    /// Validate structural invariants for this forest.
    ///
    /// Checks every tree structurally and confirms no split references a
    /// feature the forest does not have.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.trees.is_empty() {
            return Err(ForestValidationError::EmptyForest);
        }

        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;

            if let Some(index) = tree.max_split_index() {
                if index as usize >= self.n_features {
                    return Err(ForestValidationError::SplitIndexOutOfRange {
                        tree_idx,
                        index,
                        n_features: self.n_features,
                    });
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // Prediction Methods
    // =========================================================================

    /// Predict for a single feature row by averaging all trees.
    ///
    /// An empty forest predicts `0`.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.trees.iter().map(|tree| tree.predict_row(features)).sum();
        sum / self.trees.len() as f32
    }

    /// Predict for every row of a feature matrix into `out`.
    pub fn predict_into(&self, features: ArrayView2<'_, f32>, out: &mut [f32]) {
        debug_assert_eq!(features.nrows(), out.len());
        debug_assert_eq!(features.ncols(), self.n_features);

        for (slot, row) in out.iter_mut().zip(features.rows()) {
            *slot = match row.as_slice() {
                Some(slice) => self.predict_row(slice),
                None => {
                    let buf: Vec<f32> = row.to_vec();
                    self.predict_row(&buf)
                }
            };
        }
    }
}
