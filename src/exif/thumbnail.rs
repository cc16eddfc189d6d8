//! Embedded thumbnail extraction and splicing.
//!
//! The preview thumbnail lives in IFD1, the second directory in the Exif
//! TIFF chain, referenced by a pair of tags: JPEGInterchangeFormat (0x0201,
//! the data offset) and JPEGInterchangeFormatLength (0x0202). Replacing it
//! with data of a different length displaces everything stored behind it,
//! so [`update_thumbnail`] patches the length tag and shifts every absolute
//! offset that points past the replaced range.

use super::segments;
use super::tiff::{self, TAG_THUMBNAIL_LENGTH, TAG_THUMBNAIL_OFFSET, TYPE_SHORT, TiffHeader};
use super::{ExifError, find_tiff};

/// Location of the thumbnail data within the TIFF blob.
#[derive(Debug, Clone, Copy)]
struct ThumbnailRange {
    offset: usize,
    length: usize,
    /// Value-field position of the 0x0202 length entry.
    length_value_pos: usize,
    /// Field type of the length entry (SHORT in some writers, LONG in most).
    length_field_type: u16,
}

fn locate_thumbnail(tiff: &[u8], header: &TiffHeader) -> Result<ThumbnailRange, ExifError> {
    let order = header.byte_order;
    let ifd0 = tiff::parse_ifd(tiff, order, header.ifd0_offset)?;
    if ifd0.next_offset == 0 {
        return Err(ExifError::NoThumbnail);
    }
    let ifd1 = tiff::parse_ifd(tiff, order, ifd0.next_offset)?;

    let offset_entry = ifd1.find(TAG_THUMBNAIL_OFFSET).ok_or(ExifError::NoThumbnail)?;
    let length_entry = ifd1.find(TAG_THUMBNAIL_LENGTH).ok_or(ExifError::NoThumbnail)?;

    let offset = offset_entry
        .read_uint(tiff, order)
        .ok_or(ExifError::Corrupt("unreadable thumbnail offset"))? as usize;
    let length = length_entry
        .read_uint(tiff, order)
        .ok_or(ExifError::Corrupt("unreadable thumbnail length"))? as usize;

    if offset < 8 || offset + length > tiff.len() {
        return Err(ExifError::Corrupt("thumbnail range out of bounds"));
    }

    Ok(ThumbnailRange {
        offset,
        length,
        length_value_pos: length_entry.value_pos(),
        length_field_type: length_entry.field_type,
    })
}

/// Extract the embedded thumbnail bytes.
pub fn extract_thumbnail(data: &[u8]) -> Result<Vec<u8>, ExifError> {
    let (_, tiff) = find_tiff(data)?;
    let header = tiff::parse_header(tiff)?;
    let range = locate_thumbnail(tiff, &header)?;
    Ok(tiff[range.offset..range.offset + range.length].to_vec())
}

/// Replace the embedded thumbnail with `thumbnail`, returning new file bytes.
///
/// The replacement may differ in length; the file grows or shrinks
/// accordingly. The thumbnail offset tag keeps its value (the splice starts
/// where the old data started), the length tag is patched, and every stored
/// absolute offset pointing past the old data (out-of-line values, sub-IFD
/// pointers, next-IFD links) is shifted by the length delta. Offsets inside
/// maker notes are vendor-opaque and stay as they are.
///
/// The caller's buffer is never mutated; on any error the original bytes
/// remain the only valid version of the file.
pub fn update_thumbnail(data: &[u8], thumbnail: &[u8]) -> Result<Vec<u8>, ExifError> {
    let (segment, tiff) = find_tiff(data)?;
    let header = tiff::parse_header(tiff)?;
    let range = locate_thumbnail(tiff, &header)?;
    let old_end = range.offset + range.length;
    let delta = thumbnail.len() as i64 - range.length as i64;

    // Census before splicing: positions are relative to the old blob.
    let slots = tiff::collect_offset_slots(tiff, &header)?;

    let mut new_tiff = Vec::with_capacity((tiff.len() as i64 + delta) as usize);
    new_tiff.extend_from_slice(&tiff[..range.offset]);
    new_tiff.extend_from_slice(thumbnail);
    new_tiff.extend_from_slice(&tiff[old_end..]);

    let order = header.byte_order;
    let shifted = |pos: usize| -> usize {
        if pos >= old_end {
            (pos as i64 + delta) as usize
        } else {
            pos
        }
    };

    for slot in &slots {
        if slot.value as usize >= old_end {
            let new_value = (slot.value as i64 + delta) as u32;
            order.write_u32(&mut new_tiff, shifted(slot.pos), new_value);
        }
    }

    let new_length = thumbnail.len() as u32;
    match range.length_field_type {
        TYPE_SHORT => {
            if new_length > u32::from(u16::MAX) {
                return Err(ExifError::SegmentOverflow(thumbnail.len()));
            }
            order.write_u16(&mut new_tiff, shifted(range.length_value_pos), new_length as u16);
        }
        _ => order.write_u32(&mut new_tiff, shifted(range.length_value_pos), new_length),
    }

    let mut payload = Vec::with_capacity(segments::EXIF_IDENTIFIER.len() + new_tiff.len());
    payload.extend_from_slice(segments::EXIF_IDENTIFIER);
    payload.extend_from_slice(&new_tiff);
    segments::replace_segment_payload(data, &segment, &payload)
}
