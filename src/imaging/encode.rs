//! JPEG serialization.

use super::{ImagingError, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

/// Encode a raster as baseline JPEG at the given quality.
///
/// The raster is converted to 8-bit RGB first; JPEG has no alpha channel.
/// Encoder failures are propagated, never swallowed into empty bytes.
pub fn encode_jpeg(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, ImagingError> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();

    JpegEncoder::new_with_quality(&mut buffer, quality.value())
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(ImagingError::Encode)?;

    Ok(buffer)
}
