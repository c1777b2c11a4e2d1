//! Fotolog image processing
//!
//! Turns an uploaded photo into a stored JPEG: format classification,
//! RAW/HEIC/raster decoding, conversion to JPEG, bounded resizing, metadata
//! extraction and persistence. [`ImageAsset`] is the value every step works on;
//! transforms return a new asset instead of mutating the old one.

pub mod asset;
pub mod compression;
pub mod error;
pub mod format;
pub mod image;
pub mod metadata;
pub mod upload;
pub mod validator;

pub use asset::ImageAsset;
pub use compression::{JpegEncoder, JpegQuality};
pub use error::{ProcessingError, ProcessingResult};
pub use format::{extension_of, is_supported, supported_formats, FormatClass};
pub use metadata::{
    ContainerBackend, ContainerInfo, ExifFields, MetadataBackend, MetadataError,
    MetadataExtractor, RasterBackend,
};
pub use upload::{
    process_upload, sanitize_filename, upload_pipeline, UploadData, UploadImageMetadata,
};
pub use validator::{UploadValidator, ValidationError};
