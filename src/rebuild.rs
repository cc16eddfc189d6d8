//! The thumbnail rebuild pipeline.
//!
//! Composes the Exif and imaging layers into one operation:
//!
//! ```text
//! source bytes ─┬─► scratch copy ─► reset orientation ─► decode ─► scale ─► encode
//!               │                                                             │
//!               └────────────────────────────► splice new thumbnail ◄─────────┘
//! ```
//!
//! The orientation reset happens on a scratch copy only, so the thumbnail is
//! rendered in as-stored pixel orientation while the output file keeps the
//! source's orientation tag for its full-resolution image. Viewers apply
//! that tag to the thumbnail and the full image alike; a pre-rotated
//! thumbnail would be rotated twice.

use crate::exif::{self, ExifError};
use crate::imaging::{self, ImagingError, Quality, Sharpening};
use image::DynamicImage;
use thiserror::Error;

/// Size ceiling for the encoded thumbnail.
///
/// Exif data is capped at 64 KiB per segment, so the embedded thumbnail
/// should stay below 50 KiB to leave room for the remaining fields.
pub const MAX_EMBEDDED_THUMBNAIL_BYTES: usize = 50 * 1024;

/// Fallback qualities tried in order when the encoded thumbnail exceeds
/// [`MAX_EMBEDDED_THUMBNAIL_BYTES`]. Whatever the last rung produces is
/// accepted, oversized or not; the hard stop is the Exif segment cap,
/// enforced by the splicer.
pub const FALLBACK_QUALITIES: [Quality; 2] = [Quality(80), Quality(75)];

/// Default thumbnail size on the longer edge, in pixels.
pub const DEFAULT_SIZE: u32 = 320;

#[derive(Error, Debug)]
pub enum RebuildError {
    #[error("could not decode source image: {0}")]
    Decode(#[source] ImagingError),
    #[error("could not encode thumbnail: {0}")]
    Encode(#[source] ImagingError),
    #[error("could not update embedded thumbnail: {0}")]
    Splice(#[from] ExifError),
}

/// Options for a thumbnail rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebuildOptions {
    /// Target size on the longer edge, in pixels.
    pub size: u32,
    /// JPEG quality for the first encoding attempt.
    pub quality: Quality,
    /// Post-resize sharpening; `None` disables the pass.
    pub sharpening: Option<Sharpening>,
}

impl Default for RebuildOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            quality: Quality::default(),
            sharpening: Some(Sharpening::light()),
        }
    }
}

/// Rebuild the embedded Exif thumbnail of a JPEG file.
///
/// Returns new file bytes with the thumbnail replaced; every byte outside
/// the Exif segment is unchanged, and the caller's buffer is never mutated.
/// Rebuilding the same bytes with the same options is deterministic.
pub fn rebuild_thumbnail(bytes: &[u8], options: &RebuildOptions) -> Result<Vec<u8>, RebuildError> {
    // Decode from a copy with the orientation flag reset, so the thumbnail
    // is rendered as stored. Embedded thumbnails must not be pre-rotated.
    let mut scratch = bytes.to_vec();
    exif::reset_orientation(&mut scratch);

    let image = imaging::decode(&scratch).map_err(RebuildError::Decode)?;
    drop(scratch);

    let scaled = imaging::scale_to_long_edge(&image, options.size, options.sharpening);
    drop(image);

    let thumbnail = encode_with_fallback(&scaled, options.quality, MAX_EMBEDDED_THUMBNAIL_BYTES)?;

    // Splice into the original, non-reset bytes: the output file keeps its
    // orientation tag.
    Ok(exif::update_thumbnail(bytes, &thumbnail)?)
}

/// Encode at the requested quality, stepping down the fixed fallback ladder
/// while the result exceeds `ceiling`.
fn encode_with_fallback(
    image: &DynamicImage,
    quality: Quality,
    ceiling: usize,
) -> Result<Vec<u8>, RebuildError> {
    let mut thumbnail = imaging::encode_jpeg(image, quality).map_err(RebuildError::Encode)?;

    for fallback in FALLBACK_QUALITIES {
        if thumbnail.len() <= ceiling {
            break;
        }
        thumbnail = imaging::encode_jpeg(image, fallback).map_err(RebuildError::Encode)?;
    }

    Ok(thumbnail)
}
