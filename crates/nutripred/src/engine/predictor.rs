//! The prediction engine: training, loading, and serving nutrient estimates.

use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView2, Axis};
use tracing::{debug, info};

use super::generation::Generation;
use crate::data::{
    encode_input, fit_encode, Corpus, Nutrient, PredictionInput, StandardScaler,
};
use crate::persist::{GenerationStore, ReadError};
use crate::training::{shuffle_split, ForestTrainer, Mae, MetricFn, Mse, RSquared, TrainerConfig};
use crate::utils::run_with_threads;

/// Category used when a prediction request does not name one.
pub const DEFAULT_FOOD_CATEGORY: &str = "unknown";
/// Portion unit used when a prediction request does not name one.
pub const DEFAULT_PORTION_UNIT: &str = "g";

// =============================================================================
// Requests and reports
// =============================================================================

/// One food portion to predict nutrients for.
///
/// Only the food name and portion size are required; category and unit fall
/// back to [`DEFAULT_FOOD_CATEGORY`] and [`DEFAULT_PORTION_UNIT`]. Values the
/// engine has never seen encode to the fallback code rather than failing.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub food_name: String,
    pub food_category: String,
    pub portion_size: f32,
    pub portion_unit: String,
}

impl PredictionRequest {
    pub fn new(food_name: impl Into<String>, portion_size: f32) -> Self {
        PredictionRequest {
            food_name: food_name.into(),
            food_category: DEFAULT_FOOD_CATEGORY.to_owned(),
            portion_size,
            portion_unit: DEFAULT_PORTION_UNIT.to_owned(),
        }
    }

    pub fn with_food_category(mut self, category: impl Into<String>) -> Self {
        self.food_category = category.into();
        self
    }

    pub fn with_portion_unit(mut self, unit: impl Into<String>) -> Self {
        self.portion_unit = unit.into();
        self
    }

    fn as_input(&self) -> PredictionInput<'_> {
        PredictionInput {
            food_name: &self.food_name,
            food_category: &self.food_category,
            portion_size: self.portion_size,
            portion_unit: &self.portion_unit,
        }
    }
}

/// Held-out evaluation metrics for one nutrient model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetMetrics {
    pub mae: f64,
    pub mse: f64,
    pub r2: f64,
}

/// Summary of one training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    /// Rows used to fit the models and the scaler.
    pub n_train: usize,
    /// Held-out rows used for the metrics.
    pub n_eval: usize,
    /// Evaluation metrics per trained nutrient.
    pub per_nutrient: BTreeMap<Nutrient, TargetMetrics>,
}

/// Reasons a corpus cannot be trained on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrainError {
    /// No rows, or none of the recognized feature columns.
    #[error("training corpus has no rows or no feature columns")]
    EmptyCorpus,

    /// Rows and features exist, but no nutrient column to fit against.
    #[error("training corpus has no nutrient columns")]
    NoTargets,
}

// =============================================================================
// PredictionEngine
// =============================================================================

/// Serves nutrient predictions from one model generation.
///
/// An engine starts uninitialized and becomes ready by either
/// [`train`](PredictionEngine::train)ing on a corpus or
/// [`load`](PredictionEngine::load)ing a persisted generation. Prediction
/// never fails: an uninitialized engine answers with an empty map, and a
/// failed load leaves the previously held generation in place.
#[derive(Debug, Default)]
pub struct PredictionEngine {
    generation: Option<Generation>,
}

impl PredictionEngine {
    pub fn new() -> Self {
        PredictionEngine { generation: None }
    }

    /// Wrap an already validated generation.
    pub fn with_generation(generation: Generation) -> Self {
        PredictionEngine {
            generation: Some(generation),
        }
    }

    /// Whether a generation is held and predictions will be non-empty.
    pub fn is_ready(&self) -> bool {
        self.generation.is_some()
    }

    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }

    /// Replace the held generation with the one persisted in `store`.
    ///
    /// On failure the engine keeps whatever it held before, so a bad artifact
    /// directory can never take a working engine down.
    pub fn load(&mut self, store: &GenerationStore) -> Result<(), ReadError> {
        let generation = store.load()?;
        info!(
            "loaded generation with {} nutrient models from {}",
            generation.n_models(),
            store.dir().display()
        );
        self.generation = Some(generation);
        Ok(())
    }

    /// Train a fresh generation on `corpus` and make it the held one.
    ///
    /// The corpus is split into train and evaluation partitions, the scaler
    /// is fitted on the train partition only, and one bagged forest is
    /// trained per nutrient column. The returned report carries the held-out
    /// MAE, MSE, and R² per nutrient.
    pub fn train(
        &mut self,
        corpus: &Corpus,
        config: &TrainerConfig,
    ) -> Result<TrainingReport, TrainError> {
        if corpus.is_empty() || !corpus.columns().has_features() {
            return Err(TrainError::EmptyCorpus);
        }
        if corpus.columns().nutrients.is_empty() {
            return Err(TrainError::NoTargets);
        }

        let encoded = fit_encode(corpus);
        let split = shuffle_split(encoded.n_rows(), config.eval_fraction, config.seed);
        info!(
            "training {} nutrient models on {} rows ({} held out)",
            encoded.targets.len(),
            split.train.len(),
            split.eval.len()
        );

        let train_features = select_rows(encoded.features.view(), &split.train);
        let eval_features = select_rows(encoded.features.view(), &split.eval);

        let scaler = StandardScaler::fit(train_features.view());
        let train_scaled = scaler.transform(train_features.view());
        let eval_scaled = scaler.transform(eval_features.view());

        let (models, per_nutrient) = run_with_threads(config.thread_count(), |parallelism| {
            let trainer = ForestTrainer::new(config);
            let mut models = BTreeMap::new();
            let mut per_nutrient = BTreeMap::new();

            for (&nutrient, column) in &encoded.targets {
                let train_targets = gather(column, &split.train);
                let eval_targets = gather(column, &split.eval);

                let forest = trainer.train(train_scaled.view(), &train_targets, parallelism);

                let mut predictions = vec![0.0f32; eval_targets.len()];
                forest.predict_into(eval_scaled.view(), &mut predictions);
                let metrics = TargetMetrics {
                    mae: Mae.compute(&predictions, &eval_targets),
                    mse: Mse.compute(&predictions, &eval_targets),
                    r2: RSquared.compute(&predictions, &eval_targets),
                };
                debug!(
                    "trained {nutrient}: mae={:.4} mse={:.4} r2={:.4}",
                    metrics.mae, metrics.mse, metrics.r2
                );

                models.insert(nutrient, forest);
                per_nutrient.insert(nutrient, metrics);
            }
            (models, per_nutrient)
        });

        let generation = Generation::new(encoded.schema, encoded.codebooks, scaler, models)
            .expect("artifacts from one training run are consistent");
        self.generation = Some(generation);

        Ok(TrainingReport {
            n_train: split.train.len(),
            n_eval: split.eval.len(),
            per_nutrient,
        })
    }

    /// Predict nutrient amounts for one request.
    ///
    /// Returns one entry per trained nutrient, each clamped to be
    /// non-negative. An uninitialized engine returns an empty map.
    pub fn predict(&self, request: &PredictionRequest) -> BTreeMap<Nutrient, f32> {
        let Some(generation) = &self.generation else {
            debug!("predict called before any generation was loaded or trained");
            return BTreeMap::new();
        };

        let raw = encode_input(
            &request.as_input(),
            generation.schema(),
            generation.codebooks(),
        );
        let scaled = generation.scaler().transform_row(&raw);

        generation
            .models()
            .map(|(nutrient, forest)| (nutrient, forest.predict_row(&scaled).max(0.0)))
            .collect()
    }
}

fn select_rows(features: ArrayView2<'_, f32>, indices: &[u32]) -> Array2<f32> {
    let indices: Vec<usize> = indices.iter().map(|&idx| idx as usize).collect();
    features.select(Axis(0), &indices)
}

fn gather(column: &[f32], indices: &[u32]) -> Vec<f32> {
    indices.iter().map(|&idx| column[idx as usize]).collect()
}
