//! Error types for todolist store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing a key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved in the failed operation.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold a JSON object of strings.
    #[error("store file {path} is not a JSON object of strings: {source}")]
    Corrupt {
        /// Offending file.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize a value before writing it.
    #[error("Failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
