//! Error types for local key-value storage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing stored values.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key contains characters outside `[a-z0-9_]`.
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),

    /// Failed to create the storage directory.
    #[error("Failed to create storage directory {path:?}: {source}")]
    DirectoryCreation {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Failed to read a stored value.
    #[error("Failed to read {path:?}: {source}")]
    Read {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Failed to write a stored value.
    #[error("Failed to write {path:?}: {source}")]
    Write {
        /// File that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Failed to serialize a value before storing it.
    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        /// Key being written
        key: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
