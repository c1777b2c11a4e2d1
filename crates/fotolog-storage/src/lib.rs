//! Fotolog Storage Library
//!
//! This crate provides the storage abstraction processed uploads are flushed
//! through, and its local filesystem implementation.
//!
//! # Filename format
//!
//! Stored files live directly in the configured upload directory. Generated
//! names are a hex-encoded v4 UUID followed by the asset's extension
//! (`3f2a...9c.jpg`). Names must not contain path separators or `..`.
//! Name generation is centralized in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
