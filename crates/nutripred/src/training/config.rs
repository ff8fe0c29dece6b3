//! Trainer configuration with builder pattern.
//!
//! [`TrainerConfig`] holds the hyperparameters shared by all per-nutrient
//! ensembles in one training run. It uses the `bon` crate for builder
//! pattern generation with validation at build time.
//!
//! # Example
//!
//! ```
//! use nutripred::training::TrainerConfig;
//!
//! // All defaults
//! let config = TrainerConfig::builder().build().unwrap();
//!
//! // Customize ensemble size and depth
//! let config = TrainerConfig::builder()
//!     .n_trees(50)
//!     .max_depth(6)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! ```

use std::num::NonZeroUsize;

use bon::Builder;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Number of trees must be at least 1.
    InvalidNTrees,
    /// Maximum depth must be at least 1.
    InvalidMaxDepth,
    /// Evaluation fraction must be in [0, 1).
    InvalidEvalFraction(f32),
    /// Invalid minimum sample count for a split or leaf.
    InvalidMinSamples { field: &'static str, value: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNTrees => write!(f, "n_trees must be at least 1"),
            Self::InvalidMaxDepth => write!(f, "max_depth must be at least 1"),
            Self::InvalidEvalFraction(v) => {
                write!(f, "eval_fraction must be in [0, 1), got {}", v)
            }
            Self::InvalidMinSamples { field, value } => {
                write!(f, "{} too small: {}", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// TrainerConfig
// =============================================================================

/// Configuration for training one generation of per-nutrient ensembles.
///
/// The same hyperparameters apply to every nutrient; only the target vector
/// changes between ensembles. The builder pattern (via `bon`) provides a
/// fluent API with validation at build time.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct TrainerConfig {
    // === Ensemble parameters ===
    /// Trees per nutrient ensemble. Default: 100.
    #[builder(default = 100)]
    pub n_trees: u32,

    /// Maximum tree depth, counting the root as depth 0. Default: 10.
    #[builder(default = 10)]
    pub max_depth: u32,

    /// Minimum rows required to consider splitting a node. Default: 2.
    #[builder(default = 2)]
    pub min_samples_split: usize,

    /// Minimum rows each side of a split must keep. Default: 1.
    #[builder(default = 1)]
    pub min_samples_leaf: usize,

    // === Evaluation ===
    /// Fraction of rows held out for evaluation. Default: 0.2.
    ///
    /// Zero disables the held-out partition; metrics then report as zero.
    #[builder(default = 0.2)]
    pub eval_fraction: f32,

    // === Resource control ===
    /// Number of threads. `None` uses all available cores.
    pub n_threads: Option<NonZeroUsize>,

    // === Reproducibility ===
    /// Random seed. Default: 42.
    ///
    /// Fixes the train/eval split and every bootstrap resample, so a rerun
    /// on the same corpus reproduces the generation exactly.
    #[builder(default = 42)]
    pub seed: u64,
}

/// Custom finishing function that validates the config.
impl<S: trainer_config_builder::IsComplete> TrainerConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `n_trees == 0` or `max_depth == 0`
    /// - `eval_fraction` outside [0, 1)
    /// - `min_samples_split < 2` or `min_samples_leaf < 1`
    pub fn build(self) -> Result<TrainerConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl TrainerConfig {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if !(self.eval_fraction >= 0.0 && self.eval_fraction < 1.0) {
            return Err(ConfigError::InvalidEvalFraction(self.eval_fraction));
        }
        if self.min_samples_split < 2 {
            return Err(ConfigError::InvalidMinSamples {
                field: "min_samples_split",
                value: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(ConfigError::InvalidMinSamples {
                field: "min_samples_leaf",
                value: self.min_samples_leaf,
            });
        }
        Ok(())
    }

    /// Thread count in `run_with_threads` semantics (0 = auto).
    pub fn thread_count(&self) -> usize {
        self.n_threads.map_or(0, NonZeroUsize::get)
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}
