//! Camera RAW decoding
//!
//! rawloader reads the sensor data; the Bayer (or X-Trans) mosaic is then
//! interpolated over a 3x3 neighbourhood, white balanced with the as-shot
//! coefficients and gamma encoded to 8-bit sRGB. No camera color matrix is
//! applied.
//!
//! Canon CR3 files are not read by rawloader; they go through [`cr3`], which
//! decodes the full-resolution image the camera stores in the container.

use crate::error::{ProcessingError, ProcessingResult};
#[cfg(feature = "raw")]
use crate::image::cr3;
use image::{DynamicImage, Rgb, RgbImage};

#[cfg(feature = "raw")]
use std::io::Cursor;

/// Decode a RAW file into an 8-bit RGB raster.
#[cfg(feature = "raw")]
pub fn decode_raw(data: &[u8]) -> ProcessingResult<DynamicImage> {
    if cr3::is_cr3(data) {
        return cr3::decode_cr3(data);
    }

    let raw = rawloader::decode(&mut Cursor::new(data))
        .map_err(|e| ProcessingError::decode("raw", format!("{:?}", e)))?;

    tracing::debug!(
        make = %raw.clean_make,
        model = %raw.clean_model,
        width = raw.width,
        height = raw.height,
        cpp = raw.cpp,
        "Decoded RAW sensor data"
    );

    develop(&raw).map(DynamicImage::ImageRgb8)
}

#[cfg(not(feature = "raw"))]
pub fn decode_raw(_data: &[u8]) -> ProcessingResult<DynamicImage> {
    Err(ProcessingError::decode(
        "raw",
        "RAW support not compiled in (enable the `raw` feature)",
    ))
}

/// Visible dimensions of a RAW file, after the sensor crops.
///
/// Only the headers are parsed; the sensor data is left undecoded.
#[cfg(feature = "raw")]
pub fn probe_raw(data: &[u8]) -> Option<(u32, u32)> {
    if cr3::is_cr3(data) {
        return cr3::probe_cr3(data);
    }

    let raw = rawloader::decode_dummy(&mut Cursor::new(data)).ok()?;
    let (width, height) = cropped_size(raw.width, raw.height, raw.crops)?;
    Some((width as u32, height as u32))
}

#[cfg(not(feature = "raw"))]
pub fn probe_raw(_data: &[u8]) -> Option<(u32, u32)> {
    None
}

#[cfg(feature = "raw")]
fn develop(raw: &rawloader::RawImage) -> ProcessingResult<RgbImage> {
    let plane = normalized_plane(raw);
    let wb = wb_multipliers(raw.wb_coeffs);

    match raw.cpp {
        1 => interpolate_mosaic(raw.width, raw.height, raw.crops, &plane, &wb, |row, col| {
            raw.cfa.color_at(row, col)
        }),
        3 => from_rgb_plane(raw.width, raw.height, raw.crops, &plane, &wb),
        cpp => Err(ProcessingError::decode(
            "raw",
            format!("unsupported {} components per pixel", cpp),
        )),
    }
}

/// Sensor values scaled to 0.0..=1.0 using the per-channel black and white levels.
#[cfg(feature = "raw")]
fn normalized_plane(raw: &rawloader::RawImage) -> Vec<f32> {
    let channel_of = |idx: usize| -> usize {
        if raw.cpp == 1 {
            let row = idx / raw.width;
            let col = idx % raw.width;
            raw.cfa.color_at(row, col).min(3)
        } else {
            idx % raw.cpp
        }
    };

    match &raw.data {
        rawloader::RawImageData::Integer(values) => values
            .iter()
            .enumerate()
            .map(|(idx, &value)| {
                let ch = channel_of(idx);
                let black = raw.blacklevels[ch] as f32;
                let white = raw.whitelevels[ch] as f32;
                ((value as f32 - black) / (white - black).max(1.0)).clamp(0.0, 1.0)
            })
            .collect(),
        rawloader::RawImageData::Float(values) => {
            values.iter().map(|&value| value.clamp(0.0, 1.0)).collect()
        }
    }
}

/// As-shot white balance relative to green. Missing or invalid coefficients are neutral.
fn wb_multipliers(coeffs: [f32; 4]) -> [f32; 4] {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !valid(coeffs[1]) {
        return [1.0; 4];
    }
    let green = coeffs[1];
    let mut out = [1.0; 4];
    for (slot, &coeff) in out.iter_mut().zip(coeffs.iter()) {
        if valid(coeff) {
            *slot = coeff / green;
        }
    }
    // The fourth CFA color is a second green on most sensors.
    if !valid(coeffs[3]) {
        out[3] = 1.0;
    }
    out
}

/// Visible area of a `width`x`height` sensor with `[top, right, bottom, left]` crops.
fn cropped_size(width: usize, height: usize, crops: [usize; 4]) -> Option<(usize, usize)> {
    let [top, right, bottom, left] = crops;
    let visible_w = width.checked_sub(left + right)?;
    let visible_h = height.checked_sub(top + bottom)?;
    if visible_w == 0 || visible_h == 0 {
        return None;
    }
    Some((visible_w, visible_h))
}

fn empty_area(width: usize, height: usize) -> ProcessingError {
    ProcessingError::decode(
        "raw",
        format!("sensor crops leave no visible area in {}x{}", width, height),
    )
}

/// Fill in the two missing colors of every photosite from its 3x3 neighbours.
fn interpolate_mosaic<F>(
    width: usize,
    height: usize,
    crops: [usize; 4],
    plane: &[f32],
    wb: &[f32; 4],
    color_at: F,
) -> ProcessingResult<RgbImage>
where
    F: Fn(usize, usize) -> usize,
{
    let (out_w, out_h) = cropped_size(width, height, crops).ok_or_else(|| empty_area(width, height))?;
    if plane.len() < width * height {
        return Err(ProcessingError::decode("raw", "truncated sensor data"));
    }
    let [top, _, _, left] = crops;

    let mut img = RgbImage::new(out_w as u32, out_h as u32);
    for y in 0..out_h {
        let row = y + top;
        for x in 0..out_w {
            let col = x + left;
            let mut sum = [0f32; 3];
            let mut count = [0u32; 3];

            for r in row.saturating_sub(1)..=(row + 1).min(height - 1) {
                for c in col.saturating_sub(1)..=(col + 1).min(width - 1) {
                    let ch = color_at(r, c).min(3);
                    let out = if ch == 3 { 1 } else { ch };
                    sum[out] += plane[r * width + c] * wb[ch];
                    count[out] += 1;
                }
            }

            let mut pixel = [0u8; 3];
            for k in 0..3 {
                if count[k] > 0 {
                    pixel[k] = to_srgb(sum[k] / count[k] as f32);
                }
            }
            img.put_pixel(x as u32, y as u32, Rgb(pixel));
        }
    }

    Ok(img)
}

/// Sensors (and linear DNGs) that already deliver three values per pixel.
fn from_rgb_plane(
    width: usize,
    height: usize,
    crops: [usize; 4],
    plane: &[f32],
    wb: &[f32; 4],
) -> ProcessingResult<RgbImage> {
    let (out_w, out_h) = cropped_size(width, height, crops).ok_or_else(|| empty_area(width, height))?;
    if plane.len() < width * height * 3 {
        return Err(ProcessingError::decode("raw", "truncated sensor data"));
    }
    let [top, _, _, left] = crops;

    Ok(RgbImage::from_fn(out_w as u32, out_h as u32, |x, y| {
        let base = ((y as usize + top) * width + x as usize + left) * 3;
        Rgb([
            to_srgb(plane[base] * wb[0]),
            to_srgb(plane[base + 1] * wb[1]),
            to_srgb(plane[base + 2] * wb[2]),
        ])
    }))
}

/// Linear light to the 8-bit sRGB transfer curve.
fn to_srgb(linear: f32) -> u8 {
    let v = linear.clamp(0.0, 1.0);
    let encoded = if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RGGB Bayer layout.
    fn rggb(row: usize, col: usize) -> usize {
        match (row % 2, col % 2) {
            (0, 0) => 0,
            (1, 1) => 2,
            _ => 1,
        }
    }

    #[test]
    fn test_to_srgb_endpoints() {
        assert_eq!(to_srgb(0.0), 0);
        assert_eq!(to_srgb(1.0), 255);
        assert_eq!(to_srgb(2.0), 255);
        assert_eq!(to_srgb(-1.0), 0);
        assert_eq!(to_srgb(0.5), 188);
    }

    #[test]
    fn test_flat_field_stays_grey() {
        let plane = vec![0.5f32; 8 * 6];
        let img = interpolate_mosaic(8, 6, [0; 4], &plane, &[1.0; 4], rggb).unwrap();

        assert_eq!(img.dimensions(), (8, 6));
        for pixel in img.pixels() {
            assert_eq!(pixel.0, [188, 188, 188]);
        }
    }

    #[test]
    fn test_red_only_sensor() {
        let width = 6;
        let height = 6;
        let plane: Vec<f32> = (0..width * height)
            .map(|idx| if rggb(idx / width, idx % width) == 0 { 1.0 } else { 0.0 })
            .collect();
        let img = interpolate_mosaic(width, height, [0; 4], &plane, &[1.0; 4], rggb).unwrap();

        for pixel in img.pixels() {
            assert_eq!(pixel.0, [255, 0, 0]);
        }
    }

    #[test]
    fn test_crops_reduce_dimensions() {
        let plane = vec![0.2f32; 10 * 8];
        let img = interpolate_mosaic(10, 8, [1, 2, 3, 4], &plane, &[1.0; 4], rggb).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(cropped_size(10, 8, [1, 2, 3, 4]), Some((4, 4)));
    }

    #[test]
    fn test_crops_swallowing_sensor_fail() {
        let plane = vec![0.2f32; 4 * 4];
        let result = interpolate_mosaic(4, 4, [0, 2, 0, 2], &plane, &[1.0; 4], rggb);
        assert!(matches!(result, Err(ProcessingError::DecodeFailure { .. })));
    }

    #[test]
    fn test_truncated_plane_fails() {
        let plane = vec![0.2f32; 3];
        let result = interpolate_mosaic(4, 4, [0; 4], &plane, &[1.0; 4], rggb);
        assert!(result.is_err());
        assert!(from_rgb_plane(4, 4, [0; 4], &plane, &[1.0; 4]).is_err());
    }

    #[test]
    fn test_wb_multipliers_relative_to_green() {
        let wb = wb_multipliers([2.0, 1.0, 1.5, f32::NAN]);
        assert_eq!(wb, [2.0, 1.0, 1.5, 1.0]);
        assert_eq!(wb_multipliers([2.0, 0.0, 1.5, 1.0]), [1.0; 4]);
    }

    #[test]
    fn test_rgb_plane() {
        let plane = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let img = from_rgb_plane(2, 2, [0; 4], &plane, &[1.0; 4]).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(0, 1).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255]);
    }

    #[test]
    fn test_garbage_is_decode_failure() {
        let result = decode_raw(b"definitely not a raw file");
        assert!(matches!(result, Err(ProcessingError::DecodeFailure { .. })));
        assert_eq!(probe_raw(b"definitely not a raw file"), None);
    }

    /// Little-endian TIFF tagged as DNG, with no strips or dimensions.
    #[cfg(feature = "raw")]
    fn dng_without_image_data() -> Vec<u8> {
        let mut data = b"II*\0\x08\0\0\0".to_vec();
        data.extend_from_slice(&2u16.to_le_bytes());
        // Compression = 5
        data.extend_from_slice(&[0x03, 0x01, 0x03, 0x00, 1, 0, 0, 0, 5, 0, 0, 0]);
        // DNGVersion = 1.4.0.0
        data.extend_from_slice(&[0x12, 0xC6, 0x01, 0x00, 4, 0, 0, 0, 1, 4, 0, 0]);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.resize(100, 0);
        data
    }

    #[cfg(feature = "raw")]
    #[test]
    fn test_dng_without_image_data_is_rejected() {
        let data = dng_without_image_data();
        assert_eq!(probe_raw(&data), None);
        assert!(matches!(
            decode_raw(&data),
            Err(ProcessingError::DecodeFailure { .. })
        ));
    }
}
