use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Dimensions of `width`x`height` scaled so the longer side is exactly `max_size`.
///
/// The shorter side is rounded to the nearest pixel and never drops below 1.
/// Returns the input unchanged when it already fits.
pub fn fit_within(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_size || longest == 0 {
        return (width, height);
    }

    let scale = |side: u32| -> u32 {
        let scaled = (side as u64 * max_size as u64 + longest as u64 / 2) / longest as u64;
        (scaled as u32).max(1)
    };

    if width >= height {
        (max_size, scale(height))
    } else {
        (scale(width), max_size)
    }
}

/// Downscale with Lanczos3 so the image fits in a `max_size` square.
pub fn resize_to_fit(img: &DynamicImage, max_size: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let (target_w, target_h) = fit_within(width, height, max_size);
    if (target_w, target_h) == (width, height) {
        return img.clone();
    }

    tracing::debug!(
        from_width = width,
        from_height = height,
        to_width = target_w,
        to_height = target_h,
        "Resizing image"
    );

    img.resize_exact(target_w, target_h, FilterType::Lanczos3)
}
