//! HEIC decoding through the system libheif.

use crate::error::{ProcessingError, ProcessingResult};
use image::DynamicImage;

/// ISO-BMFF brands of HEIF still images.
const HEIF_BRANDS: [&[u8; 4]; 6] = [b"heic", b"heix", b"heim", b"heis", b"mif1", b"msf1"];

/// Whether `data` starts with an `ftyp` box naming a HEIF brand.
pub fn is_heif(data: &[u8]) -> bool {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return false;
    }
    HEIF_BRANDS.iter().any(|brand| &data[8..12] == brand.as_slice())
}

/// Decode the primary image of a HEIC file into an 8-bit RGB raster.
#[cfg(feature = "heif")]
pub fn decode_heic(data: &[u8]) -> ProcessingResult<DynamicImage> {
    use image::RgbImage;
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data).map_err(|e| ProcessingError::decode("heic", e))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| ProcessingError::decode("heic", e))?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| ProcessingError::decode("heic", e))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| ProcessingError::decode("heic", "no interleaved RGB plane"))?;

    // Rows may be padded past width * 3.
    let row_len = plane.width as usize * 3;
    let mut pixels = Vec::with_capacity(row_len * plane.height as usize);
    for row in plane.data.chunks(plane.stride.max(1)).take(plane.height as usize) {
        pixels.extend_from_slice(&row[..row_len.min(row.len())]);
    }

    let img = RgbImage::from_raw(plane.width, plane.height, pixels)
        .ok_or_else(|| ProcessingError::decode("heic", "truncated pixel data"))?;

    tracing::debug!(
        width = plane.width,
        height = plane.height,
        "Decoded HEIC primary image"
    );

    Ok(DynamicImage::ImageRgb8(img))
}

#[cfg(not(feature = "heif"))]
pub fn decode_heic(_data: &[u8]) -> ProcessingResult<DynamicImage> {
    Err(ProcessingError::decode(
        "heic",
        "HEIC support not compiled in (enable the `heif` feature)",
    ))
}

/// Dimensions of the primary image.
#[cfg(feature = "heif")]
pub fn probe_heic(data: &[u8]) -> Option<(u32, u32)> {
    let ctx = libheif_rs::HeifContext::read_from_bytes(data).ok()?;
    let handle = ctx.primary_image_handle().ok()?;
    Some((handle.width(), handle.height()))
}

#[cfg(not(feature = "heif"))]
pub fn probe_heic(_data: &[u8]) -> Option<(u32, u32)> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_heif() {
        let mut header = vec![0, 0, 0, 24];
        header.extend_from_slice(b"ftypheic");
        header.extend_from_slice(&[0; 12]);
        assert!(is_heif(&header));

        header[8..12].copy_from_slice(b"avif");
        assert!(!is_heif(&header));
        assert!(!is_heif(b"ftyp"));
        assert!(!is_heif(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_garbage_is_decode_failure() {
        let result = decode_heic(b"not a heic file at all");
        assert!(matches!(result, Err(ProcessingError::DecodeFailure { .. })));
        assert_eq!(probe_heic(b"not a heic file at all"), None);
    }
}
