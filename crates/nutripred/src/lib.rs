//! nutripred: per-nutrient regression models for food data.
//!
//! Trains one bagged ensemble of depth-bounded regression trees per nutrient
//! from a CSV corpus of food records, persists the result as an atomic model
//! generation, and serves portion-scaled nutrient predictions from it.
//!
//! # Key Types
//!
//! - [`PredictionEngine`] - High-level train/load/predict surface
//! - [`TrainerConfig`] / [`SynthesizerConfig`] - Configuration builders
//! - [`Nutrient`] - The fixed set of predicted nutrients
//! - [`Corpus`] - Raw food records read from CSV
//!
//! # Training
//!
//! Use `TrainerConfig::builder()` to configure, then
//! [`PredictionEngine::train`]. See the [`training`] module for details.
//!
//! # Prediction
//!
//! [`PredictionEngine::load`] restores a persisted generation, and
//! [`PredictionEngine::predict`] answers from it. Prediction never fails:
//! when no generation is loaded the result is an empty map.

pub mod data;
pub mod engine;
pub mod persist;
pub mod repr;
pub mod synth;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level engine types
pub use engine::{
    Generation, PredictionEngine, PredictionRequest, TargetMetrics, TrainError, TrainingReport,
};

// Persistence
pub use persist::{GenerationStore, ReadError, WriteError};

// Configuration types (most users want these)
pub use synth::SynthesizerConfig;
pub use training::TrainerConfig;

// Data types (for preparing training data)
pub use data::{
    CategoricalField, Codebook, CodebookSet, Corpus, CorpusError, FeatureKind, FeatureSchema,
    FoodRecord, Nutrient, StandardScaler,
};

// Shared utilities
pub use utils::{Parallelism, run_with_threads};
