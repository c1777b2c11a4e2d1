//! Types for the upload pipeline.

use chrono::{DateTime, Utc};
use fotolog_core::ImageMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Data produced by the upload pipeline for the post record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadData {
    pub file_id: Uuid,
    /// Bare filename inside the upload directory
    pub stored_filename: String,
    pub safe_original_filename: String,
    pub content_type: String,
    /// Size of the stored file
    pub file_size: u64,
    pub processed_at: DateTime<Utc>,
}

/// Metadata of the upload before and after processing.
///
/// `original` is what the post is saved with: it describes the photo as the
/// user sent it, including the capture fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadImageMetadata {
    pub original: ImageMetadata,
    pub stored: ImageMetadata,
}
