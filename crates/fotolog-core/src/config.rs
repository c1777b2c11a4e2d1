//! Configuration module
//!
//! Upload and processing settings, read from the environment (and a `.env`
//! file when present).

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_MAX_IMAGE_DIMENSION, DEFAULT_MAX_UPLOAD_SIZE_MB, DEFAULT_UPLOAD_DIR,
};
use crate::metadata_types::MetadataBackendKind;

/// Log output format for binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    /// Directory processed uploads are written to
    pub upload_dir: PathBuf,
    /// Upload size limit, enforced before any decoding
    pub max_upload_size_bytes: usize,
    /// Longest side of a stored image, in pixels
    pub max_image_dimension: u32,
    /// Convert every upload to JPEG before resizing
    pub force_jpeg: bool,
    /// Deadline for the blocking processing chain. `None` = no deadline.
    pub processing_timeout_secs: Option<u64>,
    pub metadata_backend: MetadataBackendKind,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            max_image_dimension: DEFAULT_MAX_IMAGE_DIMENSION,
            force_jpeg: true,
            processing_timeout_secs: None,
            metadata_backend: MetadataBackendKind::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset keys take their defaults; malformed numeric values fall back to
    /// the default as well, except for keys naming an enum, which are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let max_upload_size_mb: usize = lookup("MAX_UPLOAD_SIZE_MB")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_MB);

        let metadata_backend = match lookup("METADATA_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.metadata_backend,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        let config = Config {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            upload_dir: lookup("UPLOAD_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            max_image_dimension: lookup("MAX_IMAGE_DIMENSION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_IMAGE_DIMENSION),
            force_jpeg: lookup("FORCE_JPEG")
                .unwrap_or_else(|| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            processing_timeout_secs: lookup("PROCESSING_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0),
            metadata_backend,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_MB must be greater than zero"
            ));
        }

        if self.max_image_dimension == 0 {
            return Err(anyhow::anyhow!(
                "MAX_IMAGE_DIMENSION must be greater than zero"
            ));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR must not be empty"));
        }

        Ok(())
    }
}
