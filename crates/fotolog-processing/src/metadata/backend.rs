//! Metadata backends
//!
//! A backend opens encoded bytes and reports the container format, the pixel
//! dimensions and the EXIF block.

use super::exif::{read_exif_fields, ExifFields};
use crate::image::{heic, raw};
use image::{ColorType, GenericImageView, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;

/// MIME type reported for camera RAW files.
pub const RAW_MIME_TYPE: &str = "image/x-raw";
pub const HEIC_MIME_TYPE: &str = "image/heic";

/// Format and dimensions read from an image container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// MIME type, e.g. `image/jpeg`
    pub format: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Unrecognized image container")]
    UnknownContainer,

    #[error("Failed to read {format} image: {reason}")]
    Unreadable { format: String, reason: String },

    #[error("Failed to read EXIF: {0}")]
    Exif(String),
}

impl MetadataError {
    fn unreadable(format: impl Into<String>, reason: impl ToString) -> Self {
        MetadataError::Unreadable {
            format: format.into(),
            reason: reason.to_string(),
        }
    }
}

pub trait MetadataBackend: Send + Sync {
    /// Short name for logs and configuration.
    fn name(&self) -> &'static str;

    fn probe(&self, data: &[u8]) -> Result<ContainerInfo, MetadataError>;

    fn read_exif(&self, data: &[u8]) -> Result<ExifFields, MetadataError> {
        read_exif_fields(data)
    }
}

fn guess_format(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, MetadataError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| MetadataError::unreadable("image", e))
}

/// Reads headers only: libheif for HEIF, rawloader for camera RAW (tried first
/// on TIFF-based files) and the `image` decoders' header parsing for the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerBackend;

impl MetadataBackend for ContainerBackend {
    fn name(&self) -> &'static str {
        "container"
    }

    fn probe(&self, data: &[u8]) -> Result<ContainerInfo, MetadataError> {
        if heic::is_heif(data) {
            let (width, height) = heic::probe_heic(data)
                .ok_or_else(|| MetadataError::unreadable("heic", "no readable primary image"))?;
            return Ok(ContainerInfo {
                format: HEIC_MIME_TYPE.to_string(),
                width,
                height,
            });
        }

        let reader = guess_format(data)?;
        let guessed = reader.format();

        // DNG, NEF, ARW and CR2 all start with a TIFF header.
        if matches!(guessed, None | Some(ImageFormat::Tiff)) {
            if let Some((width, height)) = raw::probe_raw(data) {
                return Ok(ContainerInfo {
                    format: RAW_MIME_TYPE.to_string(),
                    width,
                    height,
                });
            }
        }

        let format = guessed.ok_or(MetadataError::UnknownContainer)?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| MetadataError::unreadable(format.to_mime_type(), e))?;

        Ok(ContainerInfo {
            format: format.to_mime_type().to_string(),
            width,
            height,
        })
    }
}

/// Fully decodes the image with the `image` crate. Slower, but also the only
/// source of the colour mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterBackend;

impl RasterBackend {
    /// Colour mode of the decoded pixels (`RGB`, `RGBA`, `L`, ...).
    pub fn mode(&self, data: &[u8]) -> Option<String> {
        let decoder = guess_format(data).ok()?.into_decoder().ok()?;
        Some(mode_name(decoder.color_type()))
    }
}

impl MetadataBackend for RasterBackend {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn probe(&self, data: &[u8]) -> Result<ContainerInfo, MetadataError> {
        let reader = guess_format(data)?;
        let format = reader.format().ok_or(MetadataError::UnknownContainer)?;
        let img = reader
            .decode()
            .map_err(|e| MetadataError::unreadable(format.to_mime_type(), e))?;
        let (width, height) = img.dimensions();

        Ok(ContainerInfo {
            format: format.to_mime_type().to_string(),
            width,
            height,
        })
    }
}

fn mode_name(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "I;16".to_string(),
        ColorType::La16 => "LA;16".to_string(),
        ColorType::Rgb16 => "RGB;16".to_string(),
        ColorType::Rgba16 => "RGBA;16".to_string(),
        ColorType::Rgb32F => "RGB;F".to_string(),
        ColorType::Rgba32F => "RGBA;F".to_string(),
        other => format!("{:?}", other),
    }
}
