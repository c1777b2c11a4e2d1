//! Image decoding and transforms
//!
//! - Decoding any supported upload to a raster (decoder, raw, cr3, heic)
//! - Bounded resizing (resize)

pub mod cr3;
pub mod decoder;
pub mod heic;
pub mod raw;
pub mod resize;

pub use decoder::{decode, to_jpeg};
pub use resize::{fit_within, resize_to_fit};
