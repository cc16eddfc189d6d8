//! Shared test utilities for the rethumb test suite.
//!
//! Provides synthetic JPEG encoding and an [`ExifJpegBuilder`] that
//! hand-assembles an Exif APP1 segment (header, IFD0, IFD1 thumbnail)
//! in either byte order, so tests control the exact container layout.

use crate::exif::tiff::{self, ByteOrder};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

const TAG_IMAGE_DESCRIPTION: u16 = 0x010E;

/// A deterministic RGB gradient raster.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Encode a gradient raster as a plain JPEG (no metadata segments).
pub fn encode_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = gradient_image(width, height);
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, 85)
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

/// Builder for a synthetic JPEG with a hand-assembled Exif segment.
///
/// Layout of the TIFF blob: header, IFD0 (optional description + optional
/// orientation), IFD1 (when a thumbnail is set: compression, offset, length),
/// then the thumbnail data, then the description's out-of-line ASCII value.
/// Parking the description *behind* the thumbnail is deliberate: it gives
/// splice tests an offset that must move when the thumbnail changes length.
pub struct ExifJpegBuilder {
    width: u32,
    height: u32,
    big_endian: bool,
    orientation: Option<u16>,
    thumbnail: Option<Vec<u8>>,
    description: Option<String>,
}

impl ExifJpegBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            big_endian: false,
            orientation: None,
            thumbnail: None,
            description: None,
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn orientation(mut self, value: u16) -> Self {
        self.orientation = Some(value);
        self
    }

    pub fn thumbnail(mut self, bytes: Vec<u8>) -> Self {
        self.thumbnail = Some(bytes);
        self
    }

    /// Add an ImageDescription tag whose value is stored after the thumbnail
    /// data. The text must be at least 4 bytes so it is stored out of line.
    pub fn description_after_thumbnail(mut self, text: &str) -> Self {
        assert!(text.len() >= 4, "short descriptions would be stored inline");
        self.description = Some(text.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let order = if self.big_endian {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        };

        // NUL-terminated per the ASCII field type.
        let description: Option<Vec<u8>> = self.description.as_ref().map(|text| {
            let mut bytes = text.as_bytes().to_vec();
            bytes.push(0);
            bytes
        });

        let entry_count = usize::from(self.orientation.is_some()) + usize::from(description.is_some());
        let ifd0_offset = 8usize;
        let ifd0_size = 2 + entry_count * 12 + 4;
        let ifd1_offset = ifd0_offset + ifd0_size;
        let ifd1_size = if self.thumbnail.is_some() { 2 + 3 * 12 + 4 } else { 0 };
        let thumbnail_offset = ifd1_offset + ifd1_size;
        let thumbnail_len = self.thumbnail.as_ref().map_or(0, Vec::len);
        let description_offset = thumbnail_offset + thumbnail_len;

        let mut tiff = Vec::new();
        tiff.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        push_u16(&mut tiff, order, 42);
        push_u32(&mut tiff, order, ifd0_offset as u32);

        // IFD0, entries in ascending tag order.
        push_u16(&mut tiff, order, entry_count as u16);
        if let Some(description) = &description {
            push_u16(&mut tiff, order, TAG_IMAGE_DESCRIPTION);
            push_u16(&mut tiff, order, 2); // ASCII
            push_u32(&mut tiff, order, description.len() as u32);
            push_u32(&mut tiff, order, description_offset as u32);
        }
        if let Some(orientation) = self.orientation {
            push_u16(&mut tiff, order, tiff::TAG_ORIENTATION);
            push_u16(&mut tiff, order, tiff::TYPE_SHORT);
            push_u32(&mut tiff, order, 1);
            push_u16(&mut tiff, order, orientation);
            push_u16(&mut tiff, order, 0); // value-field padding
        }
        push_u32(
            &mut tiff,
            order,
            if self.thumbnail.is_some() { ifd1_offset as u32 } else { 0 },
        );

        if let Some(thumbnail) = &self.thumbnail {
            // IFD1: compression (6 = JPEG), thumbnail offset, thumbnail length.
            push_u16(&mut tiff, order, 3);
            push_u16(&mut tiff, order, 0x0103);
            push_u16(&mut tiff, order, tiff::TYPE_SHORT);
            push_u32(&mut tiff, order, 1);
            push_u16(&mut tiff, order, 6);
            push_u16(&mut tiff, order, 0);
            push_u16(&mut tiff, order, tiff::TAG_THUMBNAIL_OFFSET);
            push_u16(&mut tiff, order, tiff::TYPE_LONG);
            push_u32(&mut tiff, order, 1);
            push_u32(&mut tiff, order, thumbnail_offset as u32);
            push_u16(&mut tiff, order, tiff::TAG_THUMBNAIL_LENGTH);
            push_u16(&mut tiff, order, tiff::TYPE_LONG);
            push_u32(&mut tiff, order, 1);
            push_u32(&mut tiff, order, thumbnail.len() as u32);
            push_u32(&mut tiff, order, 0);

            tiff.extend_from_slice(thumbnail);
        }
        if let Some(description) = &description {
            tiff.extend_from_slice(description);
        }

        // Wrap: SOI + APP1(Exif + TIFF) + the rest of a plain encoded JPEG.
        let base = encode_test_jpeg(self.width, self.height);
        let segment_length = 2 + 6 + tiff.len();
        assert!(segment_length <= u16::MAX as usize);

        let mut out = Vec::with_capacity(base.len() + 4 + segment_length);
        out.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE1]);
        out.extend_from_slice(&(segment_length as u16).to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend_from_slice(&tiff);
        out.extend_from_slice(&base[2..]);
        out
    }
}

fn push_u16(buffer: &mut Vec<u8>, order: ByteOrder, value: u16) {
    buffer.extend_from_slice(&match order {
        ByteOrder::LittleEndian => value.to_le_bytes(),
        ByteOrder::BigEndian => value.to_be_bytes(),
    });
}

fn push_u32(buffer: &mut Vec<u8>, order: ByteOrder, value: u32) {
    buffer.extend_from_slice(&match order {
        ByteOrder::LittleEndian => value.to_le_bytes(),
        ByteOrder::BigEndian => value.to_be_bytes(),
    });
}

// =========================================================================
// Read-back helpers — independent walks over the fixture structure
// =========================================================================

fn ifd0(data: &[u8]) -> Option<(&[u8], tiff::TiffHeader, tiff::Ifd)> {
    let (_, tiff_blob) = crate::exif::find_tiff(data).ok()?;
    let header = tiff::parse_header(tiff_blob).ok()?;
    let ifd = tiff::parse_ifd(tiff_blob, header.byte_order, header.ifd0_offset).ok()?;
    Some((tiff_blob, header, ifd))
}

/// Read the stored orientation value, if any.
pub fn read_orientation(data: &[u8]) -> Option<u16> {
    let (tiff_blob, header, ifd) = ifd0(data)?;
    let entry = ifd.find(tiff::TAG_ORIENTATION)?;
    entry.read_uint(tiff_blob, header.byte_order).map(|v| v as u16)
}

/// Read the ImageDescription string through its stored offset.
pub fn read_description(data: &[u8]) -> Option<String> {
    let (tiff_blob, header, ifd) = ifd0(data)?;
    let entry = ifd.find(TAG_IMAGE_DESCRIPTION)?;
    let offset = header.byte_order.read_u32(tiff_blob, entry.value_pos())? as usize;
    let bytes = tiff_blob.get(offset..offset + entry.count as usize)?;
    let text = bytes.strip_suffix(&[0]).unwrap_or(bytes);
    Some(String::from_utf8_lossy(text).into_owned())
}
