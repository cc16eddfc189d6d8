//! JPEG marker-segment scanning.
//!
//! A JPEG file is a sequence of marker segments (0xFF + marker byte, most
//! followed by a big-endian length that counts itself) up to the SOS marker,
//! after which entropy-coded image data runs to EOI. Exif metadata lives in
//! an APP1 segment whose payload starts with the `Exif\0\0` identifier.

use super::{ExifError, MAX_SEGMENT_LENGTH};

/// SOI — the JPEG magic number.
pub const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];

/// Identifier prefix of an Exif APP1 payload.
pub const EXIF_IDENTIFIER: &[u8] = b"Exif\0\0";

const MARKER_APP1: u8 = 0xE1;
const MARKER_SOS: u8 = 0xDA;
const MARKER_EOI: u8 = 0xD9;

/// A marker segment located in a JPEG byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSegment {
    pub marker: u8,
    /// Absolute offset of the segment's 0xFF marker byte.
    pub offset: usize,
    /// Payload range, after the two length bytes.
    pub payload_start: usize,
    pub payload_end: usize,
}

impl RawSegment {
    /// Start of the TIFF blob within an Exif APP1 payload.
    pub fn tiff_start(&self) -> usize {
        self.payload_start + EXIF_IDENTIFIER.len()
    }
}

/// Find the first APP1 segment carrying the Exif identifier.
///
/// Returns `None` for non-JPEG input, for files without such a segment, and
/// for streams that lose marker sync before one is found.
pub fn find_exif_segment(data: &[u8]) -> Option<RawSegment> {
    if !data.starts_with(&JPEG_MAGIC) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            // Lost marker sync; the rest of the stream is unscannable.
            return None;
        }
        let marker = data[pos + 1];

        // Fill bytes: 0xFF may be repeated before a marker.
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS starts entropy-coded data, EOI ends the file. APP1 cannot
        // appear past either.
        if marker == MARKER_SOS || marker == MARKER_EOI {
            return None;
        }
        // Markers without a length field.
        if marker == 0x01 || (0xD0..=0xD8).contains(&marker) {
            pos += 2;
            continue;
        }

        let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if length < 2 || pos + 2 + length > data.len() {
            return None;
        }
        let payload_start = pos + 4;
        let payload_end = pos + 2 + length;

        if marker == MARKER_APP1 && data[payload_start..payload_end].starts_with(EXIF_IDENTIFIER) {
            return Some(RawSegment {
                marker,
                offset: pos,
                payload_start,
                payload_end,
            });
        }

        pos = payload_end;
    }
    None
}

/// Rebuild the file with `segment`'s payload replaced by `payload`.
///
/// The segment length header is recomputed; every other byte of the file is
/// copied through unchanged. The payload may differ in length from the one
/// it replaces.
pub fn replace_segment_payload(
    data: &[u8],
    segment: &RawSegment,
    payload: &[u8],
) -> Result<Vec<u8>, ExifError> {
    let segment_length = payload.len() + 2;
    if segment_length > MAX_SEGMENT_LENGTH {
        return Err(ExifError::SegmentOverflow(payload.len()));
    }

    let mut out = Vec::with_capacity(data.len() - (segment.payload_end - segment.payload_start) + payload.len());
    out.extend_from_slice(&data[..segment.offset]);
    out.push(0xFF);
    out.push(segment.marker);
    out.extend_from_slice(&(segment_length as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&data[segment.payload_end..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ExifJpegBuilder;

    #[test]
    fn finds_exif_segment_in_fixture() {
        let jpeg = ExifJpegBuilder::new(32, 24).orientation(6).build();
        let segment = find_exif_segment(&jpeg).unwrap();
        assert_eq!(segment.marker, MARKER_APP1);
        assert_eq!(segment.offset, 2);
        assert!(jpeg[segment.payload_start..].starts_with(EXIF_IDENTIFIER));
    }

    #[test]
    fn none_for_non_jpeg_input() {
        assert_eq!(find_exif_segment(b"not a jpeg at all"), None);
        assert_eq!(find_exif_segment(&[]), None);
    }

    #[test]
    fn none_for_jpeg_without_exif() {
        let jpeg = crate::test_helpers::encode_test_jpeg(16, 16);
        assert_eq!(find_exif_segment(&jpeg), None);
    }

    #[test]
    fn none_for_truncated_segment_length() {
        // SOI + APP1 claiming a payload longer than the file.
        let data = [0xFF, 0xD8, 0xFF, 0xE1, 0xFF, 0xFF, 0x00];
        assert_eq!(find_exif_segment(&data), None);
    }

    #[test]
    fn replace_grows_and_shrinks_the_file() {
        let jpeg = ExifJpegBuilder::new(32, 24).orientation(6).build();
        let segment = find_exif_segment(&jpeg).unwrap();
        let old_payload_len = segment.payload_end - segment.payload_start;

        let mut payload = EXIF_IDENTIFIER.to_vec();
        payload.extend_from_slice(&[0u8; 300]);
        let grown = replace_segment_payload(&jpeg, &segment, &payload).unwrap();
        assert_eq!(grown.len(), jpeg.len() - old_payload_len + payload.len());

        // The replaced segment is found where the old one was, with the
        // declared length matching the new payload.
        let reread = find_exif_segment(&grown).unwrap();
        assert_eq!(reread.offset, segment.offset);
        assert_eq!(reread.payload_end - reread.payload_start, payload.len());

        // Bytes after the segment are untouched.
        assert_eq!(&grown[reread.payload_end..], &jpeg[segment.payload_end..]);
    }

    #[test]
    fn replace_rejects_oversized_payload() {
        let jpeg = ExifJpegBuilder::new(32, 24).orientation(1).build();
        let segment = find_exif_segment(&jpeg).unwrap();
        let payload = vec![0u8; MAX_SEGMENT_LENGTH];
        let result = replace_segment_payload(&jpeg, &segment, &payload);
        assert!(matches!(result, Err(ExifError::SegmentOverflow(_))));
    }
}
