//! Exif container access for JPEG files.
//!
//! A JPEG stores its Exif metadata as a TIFF structure inside an APP1 marker
//! segment. This module walks both layers directly on byte slices:
//!
//! - **Segments**: JPEG marker scanning: find the APP1/Exif segment and
//!   rebuild the file around a replaced payload
//! - **TIFF**: endianness handling, IFD walking, and the offset census the
//!   splicer needs when the thumbnail changes length
//! - **Orientation**: locate and reset the orientation flag (IFD0 tag 0x0112)
//! - **Thumbnail**: extract or replace the IFD1 embedded thumbnail
//!
mod orientation;
pub(crate) mod segments;
mod thumbnail;
pub(crate) mod tiff;

pub use orientation::{ORIENTATION_STANDARD, find_orientation_offset, reset_orientation};
pub use thumbnail::{extract_thumbnail, update_thumbnail};

use thiserror::Error;

/// Maximum size of a JPEG marker segment payload plus its two length bytes.
///
/// The segment length is a big-endian u16 that counts itself, so the payload
/// can hold at most 65533 bytes.
pub const MAX_SEGMENT_LENGTH: usize = u16::MAX as usize;

#[derive(Error, Debug)]
pub enum ExifError {
    #[error("not a JPEG file")]
    NotJpeg,
    #[error("no Exif segment found")]
    NoExifSegment,
    #[error("no embedded thumbnail found")]
    NoThumbnail,
    #[error("corrupt Exif data: {0}")]
    Corrupt(&'static str),
    #[error("updated Exif payload of {0} bytes exceeds the segment size limit")]
    SegmentOverflow(usize),
}

/// Locate the Exif segment and return it together with its TIFF payload.
pub(crate) fn find_tiff(data: &[u8]) -> Result<(segments::RawSegment, &[u8]), ExifError> {
    if !data.starts_with(&segments::JPEG_MAGIC) {
        return Err(ExifError::NotJpeg);
    }
    let segment = segments::find_exif_segment(data).ok_or(ExifError::NoExifSegment)?;
    let tiff = &data[segment.tiff_start()..segment.payload_end];
    Ok((segment, tiff))
}
