use crate::error::{ProcessingError, ProcessingResult};
use bytes::Bytes;
use image::RgbImage;

/// JPEG quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JpegQuality {
    /// Format conversion; matches the usual encoder default
    #[default]
    Standard,
    /// Resized output; re-encoding already costs one generation
    Maximum,
}

impl JpegQuality {
    /// Get quality value for JPEG (0-100)
    pub fn value(self) -> u8 {
        match self {
            JpegQuality::Standard => 75,
            JpegQuality::Maximum => 100,
        }
    }
}

/// JPEG encoder backed by mozjpeg
pub struct JpegEncoder;

impl JpegEncoder {
    /// Encode an RGB raster with Huffman table optimization enabled.
    pub fn encode(img: &RgbImage, quality: JpegQuality) -> ProcessingResult<Bytes> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ProcessingError::EncodeFailure(format!(
                "cannot encode empty {}x{} image",
                width, height
            )));
        }

        tracing::debug!(
            width = width,
            height = height,
            quality = quality.value(),
            "Encoding JPEG"
        );

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality.value() as f32);
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| ProcessingError::EncodeFailure(e.to_string()))?;
        comp.write_scanlines(img.as_raw())
            .map_err(|e| ProcessingError::EncodeFailure(e.to_string()))?;
        let jpeg_data = comp
            .finish()
            .map_err(|e| ProcessingError::EncodeFailure(e.to_string()))?;

        Ok(Bytes::from(jpeg_data))
    }
}
