//! Shared error types for artifact I/O.

use std::io;
use std::path::PathBuf;

/// Errors that can occur when reading a persisted generation.
///
/// `NotFound` is the only recoverable case: it means no generation (or no
/// model for one nutrient) exists at the expected path. Everything else
/// indicates an artifact that exists but cannot be trusted.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("artifact not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported schema version {found} in {path} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("validation failed: {0}")]
    Validation(String),
}

impl ReadError {
    /// Returns `true` if the artifact was simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReadError::NotFound { .. })
    }
}

/// Errors that can occur when writing a generation.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
