//! Canonical model representations.

/// Canonical node identifier used by the tree representation.
///
/// Internally this is just an index into the tree's SoA arrays.
pub type NodeId = u32;

pub mod forest;
pub mod tree;

pub use forest::{BaggedForest, ForestValidationError};
pub use tree::{RegressionTree, TreeValidationError};
