//! Decoding uploads into rasters and re-encoding them as JPEG.

use crate::compression::{JpegEncoder, JpegQuality};
use crate::error::{ProcessingError, ProcessingResult};
use crate::format::FormatClass;
use crate::image::{heic, raw};
use bytes::Bytes;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Decode `data` with the codec its format class calls for.
///
/// Raster uploads are sniffed from their content, not their extension, so a
/// PNG named `.jpg` still decodes.
pub fn decode(data: &[u8], class: FormatClass) -> ProcessingResult<DynamicImage> {
    match class {
        FormatClass::Raw => raw::decode_raw(data),
        FormatClass::Heic => heic::decode_heic(data),
        FormatClass::Raster => decode_raster(data),
        FormatClass::Unsupported => Err(ProcessingError::UnsupportedFormat {
            extension: String::new(),
        }),
    }
}

fn decode_raster(data: &[u8]) -> ProcessingResult<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ProcessingError::decode("raster", e))?;
    let format = reader
        .format()
        .map(|f| format!("{:?}", f).to_lowercase())
        .unwrap_or_else(|| "raster".to_string());
    reader.decode().map_err(|e| ProcessingError::decode(format, e))
}

/// Decode, flatten to 8-bit RGB and encode as JPEG.
///
/// Palette and alpha formats lose their alpha channel; RAW and HEIC rasters are
/// already RGB after decoding.
pub fn to_jpeg(data: &[u8], class: FormatClass) -> ProcessingResult<(Bytes, DynamicImage)> {
    let rgb = decode(data, class)?.to_rgb8();
    let jpeg = JpegEncoder::encode(&rgb, JpegQuality::Standard)?;

    tracing::debug!(
        class = class.label(),
        input_bytes = data.len(),
        output_bytes = jpeg.len(),
        "Converted image to JPEG"
    );

    Ok((jpeg, DynamicImage::ImageRgb8(rgb)))
}
