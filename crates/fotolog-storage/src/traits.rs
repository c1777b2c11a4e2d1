//! Storage abstraction trait
//!
//! This module defines the Storage trait that storage backends implement.

use fotolog_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid filename: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::NotFound(name),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// Operations are blocking; async callers run them on a blocking thread.
/// All methods take the bare stored filename, never a path.
pub trait Storage: Send + Sync {
    /// Write `data` and return the filename it was stored under.
    ///
    /// See [`crate::keys::storage_filename`] for how the name is chosen. The
    /// name is only returned once the content is completely on disk.
    fn store(&self, data: &[u8], extension: &str, filename: Option<&str>)
        -> StorageResult<String>;

    /// Read a stored file back
    fn read(&self, filename: &str) -> StorageResult<Vec<u8>>;

    /// Check if a file exists
    fn exists(&self, filename: &str) -> StorageResult<bool>;

    /// Delete a stored file. Deleting a missing file succeeds.
    fn delete(&self, filename: &str) -> StorageResult<()>;
}
