//! Metadata extraction
//!
//! Extraction never fails: whatever cannot be read is left as `None`, and only
//! `file_size` is guaranteed.

mod backend;
mod exif;

pub use self::backend::{
    ContainerBackend, ContainerInfo, MetadataBackend, MetadataError, RasterBackend,
    HEIC_MIME_TYPE, RAW_MIME_TYPE,
};
pub use self::exif::{read_exif_fields, ExifFields};

use fotolog_core::{ImageMetadata, MetadataBackendKind};
use std::fmt;

/// Extracts [`ImageMetadata`] through a primary backend, falling back to a
/// full raster decode when the primary cannot read the container.
pub struct MetadataExtractor {
    backend: Box<dyn MetadataBackend>,
    raster: RasterBackend,
}

impl MetadataExtractor {
    pub fn new(backend: Box<dyn MetadataBackend>) -> Self {
        Self {
            backend,
            raster: RasterBackend,
        }
    }

    pub fn from_kind(kind: MetadataBackendKind) -> Self {
        match kind {
            MetadataBackendKind::Container => Self::new(Box::new(ContainerBackend)),
            MetadataBackendKind::Raster => Self::new(Box::new(RasterBackend)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn extract(&self, data: &[u8]) -> ImageMetadata {
        let mut meta = ImageMetadata::with_size(data.len() as u64);

        let info = match self.backend.probe(data) {
            Ok(info) => info,
            Err(primary) if self.backend.name() != self.raster.name() => {
                tracing::debug!(
                    backend = self.backend.name(),
                    error = %primary,
                    "Primary metadata backend failed, decoding raster"
                );
                match self.raster.probe(data) {
                    Ok(info) => info,
                    Err(e) => {
                        tracing::debug!(error = %e, "No readable image data, keeping file size only");
                        return meta;
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "No readable image data, keeping file size only");
                return meta;
            }
        };

        meta.format = Some(info.format);
        meta.width = Some(info.width);
        meta.height = Some(info.height);
        meta.mode = self.raster.mode(data);

        match self.backend.read_exif(data) {
            Ok(fields) => fields.apply(&mut meta),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    file_size = meta.file_size,
                    "Failed to read EXIF, leaving capture fields empty"
                );
            }
        }

        meta
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::from_kind(MetadataBackendKind::default())
    }
}

impl fmt::Debug for MetadataExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataExtractor")
            .field("backend", &self.backend.name())
            .finish()
    }
}
