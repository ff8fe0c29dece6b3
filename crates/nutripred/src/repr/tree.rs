//! Regression tree storage and traversal.
//!
//! - [`RegressionTree`]: flat parallel-array node storage
//! - [`TreeValidationError`]: what can be wrong with that storage

use super::NodeId;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural defects [`RegressionTree::validate`] can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    /// The node arrays are empty.
    #[error("tree has no nodes")]
    EmptyTree,

    /// A child index points past the end of the node arrays.
    #[error("node {node}: {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },

    /// A node lists itself as one of its children.
    #[error("node {node} references itself as a child")]
    SelfLoop { node: NodeId },

    /// A node is reachable along more than one path, so the storage encodes
    /// a shared subtree or a cycle rather than a tree.
    #[error("node {node} reached by more than one path")]
    NodeRevisited { node: NodeId },

    /// A stored node that no path from the root ever reaches.
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
}

// ============================================================================
// RegressionTree
// ============================================================================

/// A single regression tree in structure-of-arrays layout.
///
/// Node fields live in parallel flat arrays indexed by [`NodeId`], with the
/// root at index 0. Every split is a numeric `feature < threshold`
/// comparison; NaN features take the node's default direction.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
}

impl RegressionTree {
    /// Assemble a tree from its parallel node arrays.
    ///
    /// All arrays must have one entry per node. Leaf nodes carry their
    /// prediction in `leaf_values`; their split fields are ignored.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f32>,
    ) -> Self {
        let n_nodes = split_indices.len();
        debug_assert_eq!(n_nodes, split_thresholds.len());
        debug_assert_eq!(n_nodes, left_children.len());
        debug_assert_eq!(n_nodes, right_children.len());
        debug_assert_eq!(n_nodes, default_left.len());
        debug_assert_eq!(n_nodes, is_leaf.len());
        debug_assert_eq!(n_nodes, leaf_values.len());

        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
        }
    }

    /// Create a single-leaf tree that always predicts `value`.
    pub fn leaf(value: f32) -> Self {
        Self::new(
            vec![0],
            vec![0.0],
            vec![0],
            vec![0],
            vec![true],
            vec![true],
            vec![value],
        )
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.split_indices.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    /// Number of leaf nodes.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&leaf| leaf).count()
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Highest feature index referenced by any split node, if any split exists.
    pub fn max_split_index(&self) -> Option<u32> {
        self.split_indices
            .iter()
            .zip(self.is_leaf.iter())
            .filter(|&(_, &leaf)| !leaf)
            .map(|(&idx, _)| idx)
            .max()
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check the node arrays for structural corruption.
    ///
    /// Run when rebuilding trees from persisted artifacts, where a garbled
    /// file must surface as an error rather than a wild index.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        // Walk from the root, marking each node as it is first reached. A
        // well-formed tree reaches every node exactly once, so a second
        // arrival (shared subtree or cycle) and leftover unmarked nodes are
        // both storage corruption.
        let mut seen = vec![false; n_nodes];
        seen[0] = true;
        let mut pending: Vec<NodeId> = vec![0];

        while let Some(node) = pending.pop() {
            if self.is_leaf(node) {
                continue;
            }

            let children = [
                ("left", self.left_child(node)),
                ("right", self.right_child(node)),
            ];
            for (side, child) in children {
                if child == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                if std::mem::replace(&mut seen[child as usize], true) {
                    return Err(TreeValidationError::NodeRevisited { node: child });
                }
                pending.push(child);
            }
        }

        if let Some(node) = seen.iter().position(|&reached| !reached) {
            return Err(TreeValidationError::UnreachableNode { node: node as u32 });
        }

        Ok(())
    }

    // =========================================================================
    // Prediction Methods
    // =========================================================================

    /// Traverse the tree to find the leaf for the given feature row.
    #[inline]
    pub fn traverse_to_leaf(&self, features: &[f32]) -> NodeId {
        let mut node: NodeId = 0;

        while !self.is_leaf(node) {
            let value = features[self.split_index(node) as usize];
            // NaN features take the node's default direction.
            let go_left = if value.is_nan() {
                self.default_left(node)
            } else {
                value < self.split_threshold(node)
            };

            node = if go_left {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }

        node
    }

    /// Predict for a single feature row.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.leaf_value(self.traverse_to_leaf(features))
    }
}
