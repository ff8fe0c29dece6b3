//! Model persistence: JSON artifacts for trained generations.
//!
//! Persistence is split into three layers:
//!
//! - `schema`: serde types mirroring the on-disk JSON layout. These are
//!   deliberately separate from the runtime types so the disk format can
//!   stay stable while the runtime representation evolves.
//! - `convert`: conversion between runtime and schema types. Writing is
//!   infallible; reading validates and returns [`ReadError`].
//! - `store`: the [`GenerationStore`], which maps one generation to a
//!   directory of JSON files and knows which artifacts are required.

mod convert;
mod error;
mod schema;
mod store;

pub use convert::{forest_from_schema, forest_to_schema};
pub use error::{ReadError, WriteError};
pub use schema::{
    CodebooksSchema, FeatureNamesSchema, ForestSchema, ScalerSchema, TreeSchema, SCHEMA_VERSION,
};
pub use store::{GenerationStore, CODEBOOKS_FILE, FEATURE_NAMES_FILE, SCALER_FILE};
