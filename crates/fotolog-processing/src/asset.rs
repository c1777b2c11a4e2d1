//! The image value the upload chain works on.

use crate::compression::{JpegEncoder, JpegQuality};
use crate::error::{ProcessingError, ProcessingResult};
use crate::format::{extension_of, with_extension, FormatClass};
use crate::image::{decode, resize_to_fit};
use crate::metadata::MetadataExtractor;
use bytes::Bytes;
use fotolog_core::constants::JPEG_EXTENSION;
use fotolog_core::ImageMetadata;
use fotolog_storage::{LocalStorage, Storage};
use image::GenericImageView;
use std::path::Path;
use std::sync::Arc;

/// Encoded image bytes together with what was derived from them.
///
/// The extension, format class and metadata are computed once when the asset
/// is built. `to_jpeg` and `resize` never modify an asset; they return a new
/// one whose derived state is recomputed from the new bytes.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    bytes: Bytes,
    filename_hint: String,
    extension: String,
    class: FormatClass,
    metadata: ImageMetadata,
    extractor: Arc<MetadataExtractor>,
}

impl ImageAsset {
    /// Build an asset using the default metadata backend.
    ///
    /// Fails with `UnsupportedFormat` when the filename's extension is not
    /// accepted; nothing is decoded in that case.
    pub fn new(bytes: impl Into<Bytes>, filename_hint: impl Into<String>) -> ProcessingResult<Self> {
        Self::with_extractor(bytes, filename_hint, Arc::new(MetadataExtractor::default()))
    }

    pub fn with_extractor(
        bytes: impl Into<Bytes>,
        filename_hint: impl Into<String>,
        extractor: Arc<MetadataExtractor>,
    ) -> ProcessingResult<Self> {
        let filename_hint = filename_hint.into();
        let extension = extension_of(&filename_hint);
        let class = FormatClass::from_extension(&extension);
        if !class.is_supported() {
            return Err(ProcessingError::UnsupportedFormat { extension });
        }

        let bytes = bytes.into();
        let metadata = extractor.extract(&bytes);

        tracing::debug!(
            filename = %filename_hint,
            class = class.label(),
            file_size = metadata.file_size,
            width = ?metadata.width,
            height = ?metadata.height,
            "Image asset created"
        );

        Ok(Self {
            bytes,
            filename_hint,
            extension,
            class,
            metadata,
            extractor,
        })
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn filename_hint(&self) -> &str {
        &self.filename_hint
    }

    /// Lower-cased extension of the filename hint
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn format_class(&self) -> FormatClass {
        self.class
    }

    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the bytes are already a JPEG by extension.
    pub fn is_jpeg(&self) -> bool {
        self.extension == JPEG_EXTENSION || self.extension == "jpeg"
    }

    /// Decode with the codec for this format and re-encode as JPEG.
    ///
    /// The new asset has extension `jpg` and the hint's base name with a
    /// `.jpg` suffix. Malformed bytes fail with `DecodeFailure`.
    pub fn to_jpeg(&self) -> ProcessingResult<ImageAsset> {
        let (jpeg, _) = crate::image::to_jpeg(&self.bytes, self.class)?;
        Ok(self.derive(jpeg))
    }

    /// Downscale so neither side exceeds `max_size`, keeping the aspect ratio.
    ///
    /// RAW and HEIC assets are converted to JPEG first. An asset that already
    /// fits is returned with byte-identical content; otherwise the longer
    /// side becomes exactly `max_size` and the result is a maximum quality JPEG.
    pub fn resize(&self, max_size: u32) -> ProcessingResult<ImageAsset> {
        if max_size == 0 {
            return Err(ProcessingError::EncodeFailure(
                "resize bound must be at least one pixel".to_string(),
            ));
        }

        if !self.class.is_raster_decodable() {
            return self.to_jpeg()?.resize(max_size);
        }

        if let Some(longest) = self.metadata.longest_side() {
            if longest <= max_size {
                return Ok(self.clone());
            }
        }

        let img = decode(&self.bytes, self.class)?;
        let (width, height) = img.dimensions();
        if width.max(height) <= max_size {
            return Ok(self.clone());
        }

        let resized = resize_to_fit(&img, max_size);
        let jpeg = JpegEncoder::encode(&resized.to_rgb8(), JpegQuality::Maximum)?;
        Ok(self.derive(jpeg))
    }

    /// Write the bytes into `directory`; see [`LocalStorage`] for naming rules.
    ///
    /// Returns the bare stored filename.
    pub fn to_file(&self, directory: impl AsRef<Path>, filename: Option<&str>) -> ProcessingResult<String> {
        self.store_in(&LocalStorage::new(directory.as_ref()), filename)
    }

    pub fn store_in(&self, storage: &dyn Storage, filename: Option<&str>) -> ProcessingResult<String> {
        Ok(storage.store(&self.bytes, &self.extension, filename)?)
    }

    /// New JPEG asset from re-encoded `jpeg` bytes.
    fn derive(&self, jpeg: Bytes) -> ImageAsset {
        let metadata = self.extractor.extract(&jpeg).inherit_exif(&self.metadata);

        ImageAsset {
            bytes: jpeg,
            filename_hint: with_extension(&self.filename_hint, JPEG_EXTENSION),
            extension: JPEG_EXTENSION.to_string(),
            class: FormatClass::Raster,
            metadata,
            extractor: Arc::clone(&self.extractor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn encoded(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        encoded(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([9, 99, 199, 200]))),
            ImageFormat::Png,
        )
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let result = ImageAsset::new(png(4, 4), "notes.txt");
        assert!(matches!(
            result,
            Err(ProcessingError::UnsupportedFormat { ref extension }) if extension == "txt"
        ));
    }

    #[test]
    fn test_construction_derives_metadata() {
        let data = png(40, 30);
        let asset = ImageAsset::new(data.clone(), "Holiday.PNG").unwrap();

        assert_eq!(asset.extension(), "png");
        assert_eq!(asset.format_class(), FormatClass::Raster);
        assert_eq!(asset.len(), data.len());
        assert_eq!(asset.metadata().file_size, data.len() as u64);
        assert_eq!(asset.metadata().format.as_deref(), Some("image/png"));
        assert_eq!(asset.metadata().dimensions(), Some((40, 30)));
    }

    #[test]
    fn test_to_jpeg_returns_new_asset() {
        let original = ImageAsset::new(png(40, 30), "my.photo.png").unwrap();
        let jpeg = original.to_jpeg().unwrap();

        assert_eq!(jpeg.extension(), "jpg");
        assert_eq!(jpeg.filename_hint(), "my.photo.jpg");
        assert!(jpeg.is_jpeg());
        assert_eq!(jpeg.metadata().format.as_deref(), Some("image/jpeg"));
        assert_eq!(jpeg.metadata().mode.as_deref(), Some("RGB"));
        assert_eq!(jpeg.metadata().dimensions(), Some((40, 30)));
        assert_eq!(jpeg.metadata().file_size, jpeg.len() as u64);

        // The source asset is untouched.
        assert_eq!(original.extension(), "png");
        assert_eq!(original.metadata().format.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_resize_within_bounds_is_identity() {
        let asset = ImageAsset::new(png(100, 50), "small.png").unwrap();

        let same = asset.resize(100).unwrap();
        assert_eq!(same.bytes(), asset.bytes());
        assert_eq!(same.extension(), "png");

        let larger = asset.resize(4096).unwrap();
        assert_eq!(larger.bytes(), asset.bytes());
    }

    #[test]
    fn test_resize_shrinks_longest_side() {
        let data = encoded(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, Rgb([200, 10, 10]))),
            ImageFormat::Jpeg,
        );
        let asset = ImageAsset::new(data, "wide.jpg").unwrap();

        let resized = asset.resize(150).unwrap();

        assert_eq!(resized.metadata().dimensions(), Some((150, 100)));
        assert_eq!(resized.extension(), "jpg");
        let decoded = image::load_from_memory(resized.bytes()).unwrap();
        assert_eq!(decoded.dimensions(), (150, 100));
        assert_eq!(asset.metadata().dimensions(), Some((300, 200)));
    }

    #[test]
    fn test_resize_png_produces_jpeg() {
        let asset = ImageAsset::new(png(64, 128), "tall.png").unwrap();
        let resized = asset.resize(32).unwrap();

        assert_eq!(resized.extension(), "jpg");
        assert_eq!(resized.filename_hint(), "tall.jpg");
        assert_eq!(resized.metadata().dimensions(), Some((16, 32)));
    }

    #[test]
    fn test_resize_zero_is_rejected() {
        let asset = ImageAsset::new(png(8, 8), "x.png").unwrap();
        assert!(asset.resize(0).is_err());
    }

    #[test]
    fn test_malformed_bytes_fail_conversion() {
        let asset = ImageAsset::new(b"\xFF\xD8\xFF\xE0 not really".to_vec(), "broken.jpg").unwrap();
        assert_eq!(asset.metadata(), &ImageMetadata::with_size(asset.len() as u64));
        assert!(matches!(
            asset.to_jpeg(),
            Err(ProcessingError::DecodeFailure { .. })
        ));
    }

    #[test]
    fn test_to_file() {
        let dir = tempdir().unwrap();
        let asset = ImageAsset::new(png(8, 8), "x.png").unwrap().to_jpeg().unwrap();

        let name = asset.to_file(dir.path().join("uploads"), None).unwrap();
        assert!(name.ends_with(".jpg"));
        let written = std::fs::read(dir.path().join("uploads").join(&name)).unwrap();
        assert_eq!(written, asset.bytes().as_ref());

        let named = asset.to_file(dir.path(), Some("cover")).unwrap();
        assert_eq!(named, "cover.jpg");
    }
}
