use serde::{Deserialize, Serialize};

/// Descriptive and EXIF metadata of an uploaded image.
///
/// Field names match the `image_metadata` record the post is stored with.
/// Only `file_size` is guaranteed; everything else is null when the bytes
/// could not be decoded or the tag is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub file_size: u64,
    pub format: Option<String>,
    pub mode: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub date_time: Option<String>,
    pub lens: Option<String>,
    pub iso: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
    pub focal_length: Option<String>,
}

impl ImageMetadata {
    /// Metadata for bytes nothing could be read from.
    pub fn with_size(file_size: u64) -> Self {
        Self {
            file_size,
            ..Default::default()
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }

    /// Longest side in pixels, if known.
    pub fn longest_side(&self) -> Option<u32> {
        self.dimensions().map(|(w, h)| w.max(h))
    }

    pub fn has_exif(&self) -> bool {
        self.date_time.is_some()
            || self.lens.is_some()
            || self.iso.is_some()
            || self.aperture.is_some()
            || self.shutter_speed.is_some()
            || self.focal_length.is_some()
    }

    /// Fill missing exposure and lens fields from `source`.
    ///
    /// A JPEG re-encode drops the EXIF block; these fields describe the
    /// capture, not the pixels, so they stay valid across convert/resize.
    pub fn inherit_exif(mut self, source: &ImageMetadata) -> Self {
        fn keep(slot: &mut Option<String>, from: &Option<String>) {
            if slot.is_none() {
                slot.clone_from(from);
            }
        }

        keep(&mut self.date_time, &source.date_time);
        keep(&mut self.lens, &source.lens);
        keep(&mut self.iso, &source.iso);
        keep(&mut self.aperture, &source.aperture);
        keep(&mut self.shutter_speed, &source.shutter_speed);
        keep(&mut self.focal_length, &source.focal_length);
        self
    }
}
