//! Fotolog Core Library
//!
//! This crate provides the domain models, error types, configuration and format
//! constants shared by the fotolog processing, storage and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod metadata_types;
pub mod models;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use metadata_types::MetadataBackendKind;
pub use models::ImageMetadata;
