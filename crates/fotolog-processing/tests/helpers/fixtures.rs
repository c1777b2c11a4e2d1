//! Test fixtures: encoded rasters and JPEGs carrying EXIF.

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;
use std::io::Cursor;

pub const SAMPLE_DATE_TIME: &str = "2024:07:01 12:34:56";
pub const SAMPLE_LENS: &str = "MyLens";

/// Encode `img` in `format`.
pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .expect("Failed to encode test image");
    buffer
}

/// RGB image with a diagonal gradient, so resizing has real content to filter.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

/// Half-transparent RGBA image.
pub fn translucent(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([30, 60, 90, 128])))
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(&translucent(width, height), ImageFormat::Png)
}

/// Encoded sample for each raster extension the `image` crate can write.
///
/// JPEG cannot hold alpha, so it gets the RGB gradient.
pub fn raster_samples(width: u32, height: u32) -> Vec<(&'static str, Vec<u8>)> {
    let rgba = translucent(width, height);
    vec![
        ("jpg", jpeg(width, height)),
        ("jpeg", jpeg(width, height)),
        ("png", encode(&rgba, ImageFormat::Png)),
        ("bmp", encode(&rgba, ImageFormat::Bmp)),
        ("gif", encode(&rgba, ImageFormat::Gif)),
        ("tiff", encode(&rgba, ImageFormat::Tiff)),
        ("webp", encode(&rgba, ImageFormat::WebP)),
    ]
}

/// The capture fields of a typical camera JPEG.
pub fn sample_exif_fields() -> Vec<Field> {
    let field = |tag, value| Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    };
    vec![
        field(
            Tag::DateTimeOriginal,
            Value::Ascii(vec![SAMPLE_DATE_TIME.as_bytes().to_vec()]),
        ),
        field(Tag::LensModel, Value::Ascii(vec![SAMPLE_LENS.as_bytes().to_vec()])),
        field(Tag::PhotographicSensitivity, Value::Short(vec![100])),
        field(Tag::FNumber, Value::Rational(vec![Rational::from((28, 10))])),
        field(Tag::ExposureTime, Value::Rational(vec![Rational::from((1, 125))])),
        field(Tag::FocalLength, Value::Rational(vec![Rational::from((50, 1))])),
    ]
}

/// Splice an EXIF block with `fields` into `jpeg`.
pub fn with_exif(jpeg: Vec<u8>, fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut block = Cursor::new(Vec::new());
    writer
        .write(&mut block, false)
        .expect("Failed to write EXIF block");

    let mut parsed = Jpeg::from_bytes(jpeg.into()).expect("Not a JPEG");
    parsed.set_exif(Some(block.into_inner().into()));
    parsed.encoder().bytes().to_vec()
}

/// JPEG of the given size carrying [`sample_exif_fields`].
pub fn jpeg_with_sample_exif(width: u32, height: u32) -> Vec<u8> {
    with_exif(jpeg(width, height), &sample_exif_fields())
}

/// Little-endian TIFF tagged as DNG (Compression=5, DNGVersion) whose IFD
/// has no dimensions or strips, padded to 100 bytes.
pub fn dng_without_image_data() -> Vec<u8> {
    let mut data = b"II*\0\x08\0\0\0".to_vec();
    data.extend_from_slice(&2u16.to_le_bytes());
    data.extend_from_slice(&[0x03, 0x01, 0x03, 0x00, 1, 0, 0, 0, 5, 0, 0, 0]);
    data.extend_from_slice(&[0x12, 0xC6, 0x01, 0x00, 4, 0, 0, 0, 1, 4, 0, 0]);
    data.extend_from_slice(&0u32.to_le_bytes());
    data.resize(100, 0);
    data
}

/// Minimal CR3 container: an `ftyp crx ` box followed by the given JPEGs.
pub fn cr3_with_jpegs(jpegs: &[Vec<u8>]) -> Vec<u8> {
    let mut data = b"\0\0\0\x18ftypcrx \0\0\0\x01crx isom".to_vec();
    for jpeg in jpegs {
        data.extend_from_slice(b"\0\0\x10\0mdat");
        data.extend_from_slice(jpeg);
    }
    data
}
