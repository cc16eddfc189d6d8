//! Image processing — pure Rust, in-memory only.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format-guessing, JPEG decoder compiled in) |
//! | **Scale** | `resize_exact` with Lanczos3 |
//! | **Sharpen** | 3×3 convolution via `filter3x3` |
//! | **Encode** | `image::codecs::jpeg::JpegEncoder` at a caller-chosen quality |
//!
//! The module is split into:
//! - **Params**: [`Quality`] and [`Sharpening`] value types
//! - **Scale**: decoding plus dimension math and resizing
//! - **Encode**: JPEG serialization

mod encode;
mod params;
mod scale;

pub use encode::encode_jpeg;
pub use params::{Quality, Sharpening};
pub use scale::{decode, scale_to_long_edge, scaled_dimensions};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decoding failed: {0}")]
    Decode(image::ImageError),
    #[error("JPEG encoding failed: {0}")]
    Encode(image::ImageError),
}
