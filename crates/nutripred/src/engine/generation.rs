//! One validated model generation.

use std::collections::BTreeMap;

use crate::data::{CodebookSet, FeatureSchema, Nutrient, StandardScaler};
use crate::repr::{BaggedForest, ForestValidationError};

/// Inconsistencies between the artifacts of a generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Scaler width does not match the feature schema.
    #[error("scaler covers {scaler} features but the schema has {schema}")]
    ScalerWidthMismatch { scaler: usize, schema: usize },

    /// A model was trained against a different feature width.
    #[error("{nutrient} model expects {model} features but the schema has {schema}")]
    ModelWidthMismatch {
        nutrient: Nutrient,
        model: usize,
        schema: usize,
    },

    /// A model failed structural validation.
    #[error("{nutrient} model is invalid: {source}")]
    InvalidModel {
        nutrient: Nutrient,
        #[source]
        source: ForestValidationError,
    },
}

/// The artifacts of one training run, validated as a consistent unit.
///
/// A generation bundles the feature schema, the codebooks and scaler fitted
/// on the training partition, and one bagged forest per trained nutrient.
/// Construction checks that every part agrees on the feature width, so a
/// generation that exists is always safe to predict with. Nutrients without
/// a model are allowed; they are simply absent from prediction results.
#[derive(Debug, Clone)]
pub struct Generation {
    schema: FeatureSchema,
    codebooks: CodebookSet,
    scaler: StandardScaler,
    models: BTreeMap<Nutrient, BaggedForest>,
}

impl Generation {
    pub fn new(
        schema: FeatureSchema,
        codebooks: CodebookSet,
        scaler: StandardScaler,
        models: BTreeMap<Nutrient, BaggedForest>,
    ) -> Result<Self, GenerationError> {
        if scaler.n_features() != schema.len() {
            return Err(GenerationError::ScalerWidthMismatch {
                scaler: scaler.n_features(),
                schema: schema.len(),
            });
        }
        for (&nutrient, forest) in &models {
            if forest.n_features() != schema.len() {
                return Err(GenerationError::ModelWidthMismatch {
                    nutrient,
                    model: forest.n_features(),
                    schema: schema.len(),
                });
            }
            forest
                .validate()
                .map_err(|source| GenerationError::InvalidModel { nutrient, source })?;
        }

        Ok(Generation {
            schema,
            codebooks,
            scaler,
            models,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn codebooks(&self) -> &CodebookSet {
        &self.codebooks
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// The model for one nutrient, `None` if that nutrient was not trained.
    pub fn model(&self, nutrient: Nutrient) -> Option<&BaggedForest> {
        self.models.get(&nutrient)
    }

    /// All trained models in canonical nutrient order.
    pub fn models(&self) -> impl Iterator<Item = (Nutrient, &BaggedForest)> {
        self.models.iter().map(|(&nutrient, forest)| (nutrient, forest))
    }

    pub fn n_models(&self) -> usize {
        self.models.len()
    }

    pub fn n_features(&self) -> usize {
        self.schema.len()
    }
}
