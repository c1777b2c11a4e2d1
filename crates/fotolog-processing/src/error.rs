//! Processing errors
//!
//! Metadata problems never show up here; they are absorbed by the extractor.

use fotolog_core::AppError;
use fotolog_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Unsupported image format: {extension:?}")]
    UnsupportedFormat { extension: String },

    #[error("Failed to decode {format} image: {reason}")]
    DecodeFailure { format: String, reason: String },

    #[error("Failed to encode JPEG: {0}")]
    EncodeFailure(String),

    #[error("Failed to write image: {0}")]
    StorageWriteFailure(#[from] StorageError),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

impl ProcessingError {
    pub(crate) fn decode(format: impl Into<String>, reason: impl ToString) -> Self {
        ProcessingError::DecodeFailure {
            format: format.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::UnsupportedFormat { extension } => AppError::UnsupportedFormat {
                extension,
                supported: crate::format::supported_formats(),
            },
            ProcessingError::DecodeFailure { .. } => AppError::ImageProcessing(err.to_string()),
            ProcessingError::EncodeFailure(_) => AppError::Internal(err.to_string()),
            ProcessingError::StorageWriteFailure(storage) => storage.into(),
        }
    }
}
