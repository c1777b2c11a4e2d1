//! Upload pipeline
//!
//! [`process_upload`] runs the whole blocking chain; [`upload_pipeline`] moves
//! it onto tokio's blocking pool and applies the configured deadline.

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::Utc;
use fotolog_core::{AppError, Config};
use fotolog_storage::{LocalStorage, Storage};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::types::{UploadData, UploadImageMetadata};
use crate::asset::ImageAsset;
use crate::metadata::MetadataExtractor;
use crate::validator::UploadValidator;

const CONTENT_TYPE_FALLBACK: &str = "application/octet-stream";

/// Reduce a client-supplied filename to a safe display name.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let path = std::path::Path::new(filename);
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "invalid_filename".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim().is_empty() || s.len() < 3 {
        "file".to_string()
    } else {
        s
    }
}

/// Validate, convert, resize and store one upload. Blocking.
pub fn process_upload(
    data: impl Into<Bytes>,
    original_filename: &str,
    config: &Config,
) -> Result<(UploadData, UploadImageMetadata), AppError> {
    let start = Instant::now();
    let data = data.into();

    UploadValidator::new(config.max_upload_size_bytes).validate_all(original_filename, data.len())?;

    let extractor = Arc::new(MetadataExtractor::from_kind(config.metadata_backend));
    let asset = ImageAsset::with_extractor(data, original_filename, extractor)?;

    let converted = if config.force_jpeg {
        asset.to_jpeg()?
    } else {
        asset.clone()
    };
    let resized = converted.resize(config.max_image_dimension)?;

    let file_id = Uuid::new_v4();
    let name = file_id.simple().to_string();
    let stored_filename = resized.to_file(&config.upload_dir, Some(name.as_str()))?;

    let stored = resized.metadata().clone();
    let upload = UploadData {
        file_id,
        stored_filename,
        safe_original_filename: sanitize_filename(original_filename),
        content_type: stored
            .format
            .clone()
            .unwrap_or_else(|| CONTENT_TYPE_FALLBACK.to_string()),
        file_size: resized.len() as u64,
        processed_at: Utc::now(),
    };

    tracing::info!(
        file_id = %upload.file_id,
        stored_filename = %upload.stored_filename,
        original_size = asset.len(),
        file_size = upload.file_size,
        width = ?stored.width,
        height = ?stored.height,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Upload processed"
    );

    Ok((
        upload,
        UploadImageMetadata {
            original: asset.metadata().clone(),
            stored,
        },
    ))
}

/// Run [`process_upload`] on the blocking pool.
///
/// With `processing_timeout_secs` set, a chain that misses the deadline fails
/// with [`AppError::Timeout`]; if it still finishes later, the file it wrote
/// is removed. Errors carry the underlying [`AppError`], reachable with
/// `downcast_ref`.
pub async fn upload_pipeline(
    data: Vec<u8>,
    original_filename: String,
    config: &Config,
) -> Result<(UploadData, UploadImageMetadata)> {
    let task_config = config.clone();
    let mut task = tokio::task::spawn_blocking(move || {
        process_upload(data, &original_filename, &task_config)
    });

    let joined = match config.processing_timeout_secs {
        None => task.await,
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                let storage = LocalStorage::new(config.upload_dir.clone());
                tokio::spawn(async move {
                    if let Ok(Ok((upload, _))) = task.await {
                        match storage.delete(&upload.stored_filename) {
                            Ok(()) => tracing::info!(
                                stored_filename = %upload.stored_filename,
                                "Removed upload that finished after the deadline"
                            ),
                            Err(e) => tracing::warn!(
                                stored_filename = %upload.stored_filename,
                                error = %e,
                                "Failed to remove upload that finished after the deadline"
                            ),
                        }
                    }
                });

                tracing::warn!(timeout_secs = secs, "Upload processing timed out");
                return Err(anyhow::Error::new(AppError::Timeout(secs))
                    .context("Upload processing timed out"));
            }
        },
    };

    let result = joined.context("Upload processing task failed")?;
    result.context("Upload processing failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("IMG 0001.CR2"), "IMG_0001.CR2");
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("a"), "file");
        assert_eq!(sanitize_filename("über.jpg"), "über.jpg");
        assert_eq!(sanitize_filename("x..jpg"), "invalid_filename");
    }
}
