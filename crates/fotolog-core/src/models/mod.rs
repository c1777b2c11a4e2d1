//! Domain models

pub mod image;

pub use image::ImageMetadata;
