//! Canon CR3 containers.
//!
//! CR3 is an ISO-BMFF file. Next to the CRX-compressed sensor track it
//! carries the camera-rendered image as baseline JPEG at full sensor
//! resolution, plus smaller preview and thumbnail JPEGs. The largest of them
//! is the full-size image.

use crate::error::{ProcessingError, ProcessingResult};
use image::{DynamicImage, ImageFormat};

const SOI: &[u8] = b"\xff\xd8\xff";

/// `ftyp` box with the `crx ` major brand.
pub fn is_cr3(data: &[u8]) -> bool {
    data.len() >= 12 && &data[4..8] == b"ftyp" && &data[8..12] == b"crx "
}

/// Decode the full-size image of a CR3 file to 8-bit RGB.
pub fn decode_cr3(data: &[u8]) -> ProcessingResult<DynamicImage> {
    let (offset, width, height) = largest_embedded_jpeg(data)
        .ok_or_else(|| ProcessingError::decode("cr3", "no embedded full-size image"))?;

    let img = image::load_from_memory_with_format(&data[offset..], ImageFormat::Jpeg)
        .map_err(|e| ProcessingError::decode("cr3", e))?;

    tracing::debug!(offset, width, height, "Decoded CR3 full-size image");

    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Dimensions of the full-size image, from its JPEG frame header.
pub fn probe_cr3(data: &[u8]) -> Option<(u32, u32)> {
    largest_embedded_jpeg(data).map(|(_, width, height)| (width, height))
}

/// Offset and frame size of the embedded JPEG with the most pixels.
fn largest_embedded_jpeg(data: &[u8]) -> Option<(usize, u32, u32)> {
    let mut largest: Option<(usize, u32, u32)> = None;
    let mut pos = 0;

    while let Some(found) = find(&data[pos..], SOI) {
        let start = pos + found;
        if let Some((width, height)) = jpeg_frame_size(&data[start..]) {
            let area = u64::from(width) * u64::from(height);
            let best = largest.map_or(0, |(_, w, h)| u64::from(w) * u64::from(h));
            if area > best {
                largest = Some((start, width, height));
            }
        }
        pos = start + 1;
    }

    largest
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Walk the marker segments after SOI up to the first frame header.
fn jpeg_frame_size(jpeg: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 2;
    loop {
        while *jpeg.get(pos)? == 0xFF && *jpeg.get(pos + 1)? == 0xFF {
            pos += 1;
        }
        if *jpeg.get(pos)? != 0xFF {
            return None;
        }

        let marker = *jpeg.get(pos + 1)?;
        let len = usize::from(u16::from_be_bytes([*jpeg.get(pos + 2)?, *jpeg.get(pos + 3)?]));
        if len < 2 {
            return None;
        }

        match marker {
            // SOF0..SOF15, minus DHT (C4), JPG (C8) and DAC (CC)
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => {
                let frame = jpeg.get(pos + 4..pos + 2 + len)?;
                let height = u16::from_be_bytes([*frame.get(1)?, *frame.get(2)?]);
                let width = u16::from_be_bytes([*frame.get(3)?, *frame.get(4)?]);
                return (width > 0 && height > 0).then_some((u32::from(width), u32::from(height)));
            }
            // Scan data or end of image before any frame header
            0xDA | 0xD9 => return None,
            _ => pos += 2 + len,
        }
    }
}
