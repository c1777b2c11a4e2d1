//! Upload pipeline: validate → classify → convert → resize → store.

pub mod pipeline;
pub mod types;

pub use pipeline::{process_upload, sanitize_filename, upload_pipeline};
pub use types::{UploadData, UploadImageMetadata};
