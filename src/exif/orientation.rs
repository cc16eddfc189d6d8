//! Orientation flag patching.
//!
//! The Exif orientation tag (IFD0, 0x0112) tells viewers to rotate or flip
//! the image at display time. Resetting it to the standard value makes a
//! subsequent decode render the pixels exactly as stored.

use super::segments::{self, JPEG_MAGIC};
use super::tiff::{self, TAG_ORIENTATION, TYPE_SHORT};

/// Orientation code for "upright, no transform".
pub const ORIENTATION_STANDARD: u8 = 1;

/// Find the absolute file offset of the orientation value byte.
///
/// The orientation is a SHORT stored inline in its IFD entry; only the
/// low-order byte carries the code (valid values are 1..=8), and its
/// position within the value field depends on the byte order. Returns
/// `None` for non-JPEG input, missing Exif data, a missing tag, or any
/// structure the scan cannot follow.
pub fn find_orientation_offset(data: &[u8]) -> Option<usize> {
    if !data.starts_with(&JPEG_MAGIC) {
        return None;
    }
    let segment = segments::find_exif_segment(data)?;
    let tiff = &data[segment.tiff_start()..segment.payload_end];

    let header = tiff::parse_header(tiff).ok()?;
    let ifd0 = tiff::parse_ifd(tiff, header.byte_order, header.ifd0_offset).ok()?;
    let entry = ifd0.find(TAG_ORIENTATION)?;
    if entry.field_type != TYPE_SHORT || entry.count != 1 {
        return None;
    }

    let low_byte = match header.byte_order {
        tiff::ByteOrder::LittleEndian => 0,
        tiff::ByteOrder::BigEndian => 1,
    };
    let offset = segment.tiff_start() + entry.value_pos() + low_byte;
    (offset < data.len()).then_some(offset)
}

/// Reset the orientation flag to [`ORIENTATION_STANDARD`], in place.
///
/// A single-byte overwrite: the buffer length never changes and no other
/// byte is touched. Files without a scannable orientation tag are left
/// untouched; corrupt metadata here must not abort a rebuild.
pub fn reset_orientation(data: &mut [u8]) {
    if let Some(offset) = find_orientation_offset(data) {
        data[offset] = ORIENTATION_STANDARD;
    }
}
