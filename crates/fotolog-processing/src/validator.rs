use crate::format::{extension_of, supported_formats, FormatClass};
use fotolog_core::AppError;

/// Upload validation errors, raised before anything is decoded
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Unsupported image format: {extension:?} (allowed: {allowed:?})")]
    UnsupportedFormat {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyFile => AppError::InvalidInput(err.to_string()),
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::UnsupportedFormat { extension, allowed } => {
                AppError::UnsupportedFormat {
                    extension,
                    supported: allowed,
                }
            }
        }
    }
}

/// Upload validator
///
/// Checks the size limit and the filename's extension against the accepted
/// image formats.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
}

impl UploadValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the filename's extension, returning its format class.
    pub fn validate_extension(&self, filename: &str) -> Result<FormatClass, ValidationError> {
        let extension = extension_of(filename);
        let class = FormatClass::from_extension(&extension);
        if !class.is_supported() {
            return Err(ValidationError::UnsupportedFormat {
                extension,
                allowed: supported_formats(),
            });
        }
        Ok(class)
    }

    /// Run all checks, size first.
    pub fn validate_all(&self, filename: &str, size: usize) -> Result<FormatClass, ValidationError> {
        self.validate_file_size(size)?;
        self.validate_extension(filename)
    }
}
