//! Synthetic corpus generation from a curated reference table.
//!
//! The synthesizer samples foods uniformly from [`REFERENCE_FOODS`], draws a
//! portion size and a small multiplicative noise factor per record, and
//! scales the per-100 g reference amounts accordingly. Alongside the corpus
//! CSV it writes a `<name>_metadata.json` sidecar describing how the corpus
//! was produced.

mod reference;

pub use reference::{reference_food, ReferenceFood, N_NUTRIENTS, REFERENCE_FOODS};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bon::Builder;
use chrono::{DateTime, Utc};
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::{write_records_csv, CorpusError, FoodRecord, Nutrient};

/// Label recorded in the metadata sidecar for the reference values.
pub const DATA_SOURCE: &str = "USDA Standard Reference";

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// At least one record must be generated.
    InvalidRecordCount,
    /// Portion bounds must satisfy `0 < min < max`, both finite.
    InvalidPortionRange { min: f32, max: f32 },
    /// Noise fraction must be in [0, 1).
    InvalidVariation(f32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecordCount => write!(f, "n_records must be at least 1"),
            Self::InvalidPortionRange { min, max } => {
                write!(f, "portion range must satisfy 0 < min < max, got {}..{}", min, max)
            }
            Self::InvalidVariation(v) => {
                write!(f, "variation must be in [0, 1), got {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// SynthesizerConfig
// =============================================================================

/// Configuration for one synthetic corpus.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct SynthesizerConfig {
    /// Records to generate. Default: 5000.
    #[builder(default = 5000)]
    pub n_records: usize,

    /// Smallest portion size in grams. Default: 25.
    #[builder(default = 25.0)]
    pub portion_min: f32,

    /// Largest portion size in grams. Default: 500.
    #[builder(default = 500.0)]
    pub portion_max: f32,

    /// Multiplicative noise half-width; each record's nutrient amounts are
    /// scaled by a factor drawn from `1 ± variation`. Default: 0.05.
    #[builder(default = 0.05)]
    pub variation: f32,

    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,
}

/// Custom finishing function that validates the config.
impl<S: synthesizer_config_builder::IsComplete> SynthesizerConfigBuilder<S> {
    /// Build and validate the configuration.
    pub fn build(self) -> Result<SynthesizerConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl SynthesizerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.n_records == 0 {
            return Err(ConfigError::InvalidRecordCount);
        }
        if !(self.portion_min > 0.0 && self.portion_min < self.portion_max)
            || !self.portion_max.is_finite()
        {
            return Err(ConfigError::InvalidPortionRange {
                min: self.portion_min,
                max: self.portion_max,
            });
        }
        if !(self.variation >= 0.0 && self.variation < 1.0) {
            return Err(ConfigError::InvalidVariation(self.variation));
        }
        Ok(())
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

// =============================================================================
// Metadata sidecar
// =============================================================================

/// Description of a generated corpus, written next to the CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusMetadata {
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,
    /// Distinct categories in the reference table, in table order.
    pub food_categories: Vec<String>,
    pub total_foods: usize,
    /// `[min, max]` portion bounds in grams.
    pub portion_range_g: [f32; 2],
    pub variation_fraction: f32,
    pub data_source: String,
}

/// Sidecar path for a corpus CSV (`corpus.csv` -> `corpus_metadata.json`).
pub fn metadata_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("corpus");
    csv_path.with_file_name(format!("{stem}_metadata.json"))
}

/// Errors that can occur while writing a corpus and its sidecar.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    /// Failure writing the corpus CSV.
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    /// Failure writing the metadata sidecar.
    #[error("failed to write metadata: {0}")]
    Io(#[from] io::Error),

    /// Failure serializing the metadata sidecar.
    #[error("failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Synthesizer
// =============================================================================

/// Generates a synthetic training corpus from the reference table.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    config: &'a SynthesizerConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(config: &'a SynthesizerConfig) -> Self {
        Self { config }
    }

    /// Generate the configured number of records.
    ///
    /// Fully determined by the seed. Each record picks a food uniformly,
    /// draws a portion from `[portion_min, portion_max)`, and scales the
    /// per-100 g reference amounts by `portion / 100` times a noise factor
    /// from `1 ± variation`. The scale uses the raw portion sample; only the
    /// stored portion and nutrient amounts are rounded to one decimal.
    pub fn generate(&self) -> Vec<FoodRecord> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.seed);
        let food_dist = Uniform::from(0..REFERENCE_FOODS.len());
        let portion_dist = Uniform::from(self.config.portion_min..self.config.portion_max);
        let noise_dist = (self.config.variation > 0.0).then(|| {
            Uniform::from(1.0 - self.config.variation..1.0 + self.config.variation)
        });

        let mut records = Vec::with_capacity(self.config.n_records);
        for _ in 0..self.config.n_records {
            let food = &REFERENCE_FOODS[food_dist.sample(&mut rng)];
            let portion = portion_dist.sample(&mut rng);
            let noise = noise_dist.as_ref().map_or(1.0, |d| d.sample(&mut rng));
            let scale = portion / 100.0 * noise;

            let nutrients = Nutrient::ALL
                .iter()
                .zip(food.per_100g)
                .map(|(&nutrient, base)| (nutrient, round1(base * scale)))
                .collect();

            records.push(FoodRecord {
                food_name: food.name.to_owned(),
                food_category: food.category.to_owned(),
                portion_size: round1(portion),
                portion_unit: "g".to_owned(),
                nutrients,
            });
        }
        records
    }

    /// Generate the corpus and write it as CSV plus metadata sidecar.
    pub fn write(&self, csv_path: impl AsRef<Path>) -> Result<CorpusMetadata, SynthError> {
        let csv_path = csv_path.as_ref();
        let records = self.generate();
        write_records_csv(csv_path, &records)?;

        let metadata = self.metadata(records.len());
        let json = serde_json::to_string_pretty(&metadata)?;
        fs::write(metadata_path(csv_path), json)?;

        info!(
            "wrote {} synthetic records to {}",
            records.len(),
            csv_path.display()
        );
        Ok(metadata)
    }

    fn metadata(&self, total_records: usize) -> CorpusMetadata {
        let mut food_categories: Vec<String> = Vec::new();
        for food in &REFERENCE_FOODS {
            if !food_categories.iter().any(|c| c == food.category) {
                food_categories.push(food.category.to_owned());
            }
        }

        CorpusMetadata {
            generated_at: Utc::now(),
            total_records,
            food_categories,
            total_foods: REFERENCE_FOODS.len(),
            portion_range_g: [self.config.portion_min, self.config.portion_max],
            variation_fraction: self.config.variation,
            data_source: DATA_SOURCE.to_owned(),
        }
    }
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
