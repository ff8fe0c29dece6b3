//! The prediction engine and its model generations.
//!
//! [`Generation`] is an immutable, validated bundle of training artifacts;
//! [`PredictionEngine`] holds at most one generation and serves predictions
//! from it. The engine is deliberately forgiving at the edges: prediction
//! before initialization yields an empty result, unseen categorical values
//! fall back to a shared code, and a failed load keeps the previous
//! generation serving.

mod generation;
mod predictor;

pub use generation::{Generation, GenerationError};
pub use predictor::{
    PredictionEngine, PredictionRequest, TargetMetrics, TrainError, TrainingReport,
    DEFAULT_FOOD_CATEGORY, DEFAULT_PORTION_UNIT,
};
