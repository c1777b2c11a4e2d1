//! EXIF tag extraction with kamadak-exif.

use super::MetadataError;
use exif::{Field, In, Reader, Tag, Value};
use fotolog_core::ImageMetadata;
use std::io::Cursor;

/// Capture details read from the primary IFD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifFields {
    pub date_time: Option<String>,
    pub lens: Option<String>,
    pub iso: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
    pub focal_length: Option<String>,
}

impl ExifFields {
    pub fn is_empty(&self) -> bool {
        *self == ExifFields::default()
    }

    pub fn apply(self, meta: &mut ImageMetadata) {
        meta.date_time = self.date_time;
        meta.lens = self.lens;
        meta.iso = self.iso;
        meta.aperture = self.aperture;
        meta.shutter_speed = self.shutter_speed;
        meta.focal_length = self.focal_length;
    }
}

/// Read the EXIF block from any container kamadak-exif understands
/// (JPEG, TIFF and TIFF-based RAW, HEIF, PNG, WebP).
///
/// A file without EXIF yields empty fields rather than an error.
pub fn read_exif_fields(data: &[u8]) -> Result<ExifFields, MetadataError> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(ExifFields::default()),
        Err(e) => return Err(MetadataError::Exif(e.to_string())),
    };

    let get = |tag: Tag| -> Option<String> {
        exif.get_field(tag, In::PRIMARY).and_then(render)
    };

    Ok(ExifFields {
        date_time: get(Tag::DateTimeOriginal).or_else(|| get(Tag::DateTime)),
        lens: get(Tag::LensModel),
        iso: get(Tag::PhotographicSensitivity),
        aperture: get(Tag::FNumber),
        shutter_speed: get(Tag::ExposureTime),
        focal_length: get(Tag::FocalLength),
    })
}

/// Text tags keep their raw value; numeric tags use the library's display form
/// ("2.8", "1/125", "50").
fn render(field: &Field) -> Option<String> {
    let text = match field.value {
        Value::Ascii(ref parts) => {
            let first = parts.first()?;
            String::from_utf8_lossy(first)
                .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                .to_string()
        }
        _ => field.display_value().to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::experimental::Writer;
    use exif::Rational;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use img_parts::jpeg::Jpeg;
    use img_parts::ImageEXIF;

    fn jpeg_with_exif(fields: &[Field]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(16, 16));
        let mut jpeg = Vec::new();
        img.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        let mut writer = Writer::new();
        for field in fields {
            writer.push_field(field);
        }
        let mut block = Cursor::new(Vec::new());
        writer.write(&mut block, false).unwrap();

        let mut parsed = Jpeg::from_bytes(jpeg.into()).unwrap();
        parsed.set_exif(Some(block.into_inner().into()));
        parsed.encoder().bytes().to_vec()
    }

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    #[test]
    fn test_reads_all_capture_fields() {
        let data = jpeg_with_exif(&[
            field(
                Tag::DateTimeOriginal,
                Value::Ascii(vec![b"2024:07:01 12:34:56".to_vec()]),
            ),
            field(Tag::LensModel, Value::Ascii(vec![b"MyLens".to_vec()])),
            field(Tag::PhotographicSensitivity, Value::Short(vec![100])),
            field(Tag::FNumber, Value::Rational(vec![Rational::from((28, 10))])),
            field(Tag::ExposureTime, Value::Rational(vec![Rational::from((1, 125))])),
            field(Tag::FocalLength, Value::Rational(vec![Rational::from((50, 1))])),
        ]);

        let fields = read_exif_fields(&data).unwrap();

        assert_eq!(fields.date_time.as_deref(), Some("2024:07:01 12:34:56"));
        assert_eq!(fields.lens.as_deref(), Some("MyLens"));
        assert_eq!(fields.iso.as_deref(), Some("100"));
        assert_eq!(fields.aperture.as_deref(), Some("2.8"));
        assert_eq!(fields.shutter_speed.as_deref(), Some("1/125"));
        assert_eq!(fields.focal_length.as_deref(), Some("50"));
    }

    #[test]
    fn test_date_time_fallback() {
        let data = jpeg_with_exif(&[field(
            Tag::DateTime,
            Value::Ascii(vec![b"2023:01:02 03:04:05".to_vec()]),
        )]);

        let fields = read_exif_fields(&data).unwrap();
        assert_eq!(fields.date_time.as_deref(), Some("2023:01:02 03:04:05"));
        assert_eq!(fields.lens, None);
        assert_eq!(fields.iso, None);
    }

    #[test]
    fn test_missing_exif_is_empty() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let fields = read_exif_fields(&png).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(read_exif_fields(b"not an image at all").is_err());
    }

    #[test]
    fn test_apply_overwrites_exif_slots() {
        let mut meta = ImageMetadata::with_size(10);
        ExifFields {
            iso: Some("400".to_string()),
            ..Default::default()
        }
        .apply(&mut meta);
        assert_eq!(meta.iso.as_deref(), Some("400"));
        assert_eq!(meta.file_size, 10);
    }
}
