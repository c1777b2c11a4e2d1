//! Format classification from filename hints.

use fotolog_core::constants::{self, SUPPORTED_FORMATS_NORMAL, SUPPORTED_FORMATS_RAW};

const HEIF_ENABLED: bool = cfg!(feature = "heif");
const RAW_ENABLED: bool = cfg!(feature = "raw");

/// How an upload has to be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatClass {
    /// Decoded by the general raster codec
    Raster,
    /// Needs the HEIF decoder
    Heic,
    /// Camera RAW, needs demosaicing
    Raw,
    Unsupported,
}

impl FormatClass {
    /// Classify a filename by its extension.
    pub fn of(filename: &str) -> Self {
        Self::from_extension(&extension_of(filename))
    }

    /// Classify an already lower-cased extension.
    ///
    /// HEIC and RAW extensions are only accepted when their decoder is
    /// compiled in.
    pub fn from_extension(extension: &str) -> Self {
        let class = if extension == "heic" {
            FormatClass::Heic
        } else if SUPPORTED_FORMATS_NORMAL.contains(&extension) {
            FormatClass::Raster
        } else if SUPPORTED_FORMATS_RAW.contains(&extension) {
            FormatClass::Raw
        } else {
            FormatClass::Unsupported
        };
        if class.is_decoder_enabled() {
            class
        } else {
            FormatClass::Unsupported
        }
    }

    /// Whether this build carries a decoder for the class.
    pub fn is_decoder_enabled(self) -> bool {
        match self {
            FormatClass::Raster => true,
            FormatClass::Heic => HEIF_ENABLED,
            FormatClass::Raw => RAW_ENABLED,
            FormatClass::Unsupported => false,
        }
    }

    pub fn is_supported(self) -> bool {
        self != FormatClass::Unsupported
    }

    /// Whether the general raster decoder can read this class directly.
    pub fn is_raster_decodable(self) -> bool {
        self == FormatClass::Raster
    }

    pub fn label(self) -> &'static str {
        match self {
            FormatClass::Raster => "raster",
            FormatClass::Heic => "heic",
            FormatClass::Raw => "raw",
            FormatClass::Unsupported => "unsupported",
        }
    }
}

/// Lower-cased text after the last `.`; the whole lower-cased name if there is no dot.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or(filename)
        .to_lowercase()
}

pub fn is_supported(filename: &str) -> bool {
    FormatClass::of(filename).is_supported()
}

/// Accepted extensions in display order, limited to the decoders in this build.
pub fn supported_formats() -> Vec<String> {
    constants::supported_formats()
        .filter(|ext| FormatClass::from_extension(ext).is_supported())
        .map(String::from)
        .collect()
}

/// Replace the extension of `filename` with `extension`, keeping the base name.
pub(crate) fn with_extension(filename: &str, extension: &str) -> String {
    let base = match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    };
    format!("{}.{}", base, extension)
}
