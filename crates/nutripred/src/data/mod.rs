//! Data handling: corpora, encoding, and standardization.
//!
//! This module owns everything between a raw CSV file and the numeric
//! matrices the trainers consume:
//!
//! - [`Corpus`]: tolerant CSV loading with column-presence tracking
//! - [`Nutrient`]: the closed set of prediction targets
//! - [`Codebook`] / [`CodebookSet`]: categorical value coding
//! - [`FeatureSchema`]: the ordered feature layout of a generation
//! - [`fit_encode`] / [`encode_input`]: record and input encoding
//! - [`StandardScaler`]: shared feature standardization
//!
//! The invariant tying these together: whatever schema, codebooks, and
//! scaler a generation was trained with are the ones predictions must be
//! encoded with.

mod codebook;
mod corpus;
mod encoder;
mod nutrient;
mod scaler;
mod schema;

pub use codebook::{CategoricalField, Codebook, CodebookSet, DuplicateValue, FALLBACK_CODE};
pub use corpus::{Corpus, CorpusColumns, CorpusError, FoodRecord, write_records_csv};
pub use encoder::{EncodedCorpus, PredictionInput, encode_input, fit_encode};
pub use nutrient::Nutrient;
pub use scaler::{ScalerError, StandardScaler};
pub use schema::{FeatureKind, FeatureSchema, SchemaError};
