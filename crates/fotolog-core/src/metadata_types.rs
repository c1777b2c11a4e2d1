use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Metadata backend types
///
/// Selects which backend reads format, dimensions and EXIF from uploaded bytes.
/// Defined in core because it is part of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackendKind {
    /// Container-aware backend: image headers, RAW headers, HEIF headers and EXIF.
    #[default]
    Container,
    /// Plain raster decoder only; RAW and HEIC uploads report no dimensions.
    Raster,
}

impl FromStr for MetadataBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "container" => Ok(MetadataBackendKind::Container),
            "raster" => Ok(MetadataBackendKind::Raster),
            _ => Err(anyhow::anyhow!("Invalid metadata backend: {}", s)),
        }
    }
}

impl Display for MetadataBackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MetadataBackendKind::Container => write!(f, "container"),
            MetadataBackendKind::Raster => write!(f, "raster"),
        }
    }
}
