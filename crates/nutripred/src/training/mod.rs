//! Training infrastructure for per-nutrient ensembles.
//!
//! This module provides the pieces one training run is assembled from:
//!
//! - [`TrainerConfig`]: hyperparameters shared by every ensemble
//! - [`shuffle_split`]: the seeded train/eval partition
//! - [`BootstrapSampler`]: per-tree bootstrap resampling
//! - [`ForestTrainer`]: exact-greedy bagged tree growing
//! - [`Mae`] / [`Mse`] / [`RSquared`]: held-out evaluation metrics
//!
//! The engine drives these once per nutrient; everything here is agnostic
//! to which nutrient a target vector belongs to.

mod config;
mod metrics;
mod sampling;
mod splitter;
mod trainer;

pub use config::{ConfigError, TrainerConfig};
pub use metrics::{Mae, MetricFn, Mse, RSquared};
pub use sampling::BootstrapSampler;
pub use splitter::{SplitIndices, shuffle_split};
pub use trainer::ForestTrainer;
