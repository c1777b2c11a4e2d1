//! Format tables and processing defaults.

/// Raster formats decoded directly (HEIC included; it has its own decoder).
pub const SUPPORTED_FORMATS_NORMAL: &[&str] =
    &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp", "heic"];

/// Camera RAW formats that need demosaicing before they can be treated as rasters.
pub const SUPPORTED_FORMATS_RAW: &[&str] = &["cr2", "cr3", "nef", "arw", "dng"];

/// Extension every converted or resized asset ends up with.
pub const JPEG_EXTENSION: &str = "jpg";

pub const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 2048;
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 50;

/// Every accepted extension, normal set first, in the order shown to users.
pub fn supported_formats() -> impl Iterator<Item = &'static str> {
    SUPPORTED_FORMATS_NORMAL
        .iter()
        .chain(SUPPORTED_FORMATS_RAW.iter())
        .copied()
}
