//! Decoding and proportional scaling.

use super::{ImagingError, Sharpening};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Decode an image from in-memory bytes, guessing the format from content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(ImagingError::Io)?
        .decode()
        .map_err(ImagingError::Decode)
}

/// Compute scaled dimensions for a target size on the longer edge.
///
/// The longer edge is normalized to `target_long_edge`; the shorter edge
/// scales proportionally. Each dimension gets a slight upward bias before
/// rounding and a floor of 1 pixel, so extreme aspect ratios never collapse
/// to a zero-area image.
///
/// ```
/// # use rethumb::imaging::scaled_dimensions;
/// assert_eq!(scaled_dimensions(4000, 3000, 320), (320, 240));
/// assert_eq!(scaled_dimensions(3000, 4000, 320), (240, 320));
/// assert_eq!(scaled_dimensions(1, 1, 320), (320, 320));
/// ```
pub fn scaled_dimensions(width: u32, height: u32, target_long_edge: u32) -> (u32, u32) {
    let factor = f64::from(target_long_edge) / f64::from(width.max(height));

    let scaled_width = ((factor * f64::from(width) + 0.3).round() as u32).max(1);
    let scaled_height = ((factor * f64::from(height) + 0.3).round() as u32).max(1);
    (scaled_width, scaled_height)
}

/// Scale an image so its longer edge matches `target_long_edge`, preserving
/// aspect ratio, with an optional sharpening pass.
///
/// Uses Lanczos3 resampling. Any rotation implied by metadata is not applied
/// here; the caller decides how orientation is handled before decoding.
pub fn scale_to_long_edge(
    image: &DynamicImage,
    target_long_edge: u32,
    sharpening: Option<Sharpening>,
) -> DynamicImage {
    let (width, height) = scaled_dimensions(image.width(), image.height(), target_long_edge);
    let resized = image.resize_exact(width, height, FilterType::Lanczos3);

    match sharpening {
        Some(sharpening) => resized.filter3x3(&sharpening.kernel()),
        None => resized,
    }
}
