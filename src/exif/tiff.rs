//! TIFF structure primitives for the Exif payload.
//!
//! Exif wraps its tags in a TIFF container: a header selecting byte order,
//! then a chain of IFDs (image file directories) of 12-byte entries. Values
//! wider than four bytes are stored out of line, referenced by absolute
//! offset from the start of the TIFF blob, which is why a variable-length
//! edit needs the offset census in [`collect_offset_slots`].

use super::ExifError;

pub const TAG_ORIENTATION: u16 = 0x0112;
pub const TAG_EXIF_IFD: u16 = 0x8769;
pub const TAG_GPS_IFD: u16 = 0x8825;
pub const TAG_INTEROP_IFD: u16 = 0xA005;
/// JPEGInterchangeFormat — offset of the IFD1 thumbnail data.
pub const TAG_THUMBNAIL_OFFSET: u16 = 0x0201;
/// JPEGInterchangeFormatLength — length of the IFD1 thumbnail data.
pub const TAG_THUMBNAIL_LENGTH: u16 = 0x0202;

pub const TYPE_SHORT: u16 = 3;
pub const TYPE_LONG: u16 = 4;
/// IFD pointer type from TIFF tech note 1; some writers use it for sub-IFDs.
pub const TYPE_IFD: u16 = 13;

/// TIFF type sizes: count is number of values, not bytes.
/// Total bytes = count * type_size.
pub fn type_size(field_type: u16) -> usize {
    match field_type {
        1 | 2 | 6 | 7 => 1,  // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => 2,          // SHORT, SSHORT
        4 | 9 | 11 | 13 => 4, // LONG, SLONG, FLOAT, IFD
        5 | 10 | 12 => 8,    // RATIONAL, SRATIONAL, DOUBLE
        _ => 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    pub fn read_u16(self, data: &[u8], pos: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(pos..pos + 2)?.try_into().ok()?;
        Some(match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_u32(self, data: &[u8], pos: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(pos..pos + 4)?.try_into().ok()?;
        Some(match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
        })
    }

    pub fn write_u16(self, data: &mut [u8], pos: usize, value: u16) {
        if let Some(slice) = data.get_mut(pos..pos + 2) {
            slice.copy_from_slice(&match self {
                ByteOrder::LittleEndian => value.to_le_bytes(),
                ByteOrder::BigEndian => value.to_be_bytes(),
            });
        }
    }

    pub fn write_u32(self, data: &mut [u8], pos: usize, value: u32) {
        if let Some(slice) = data.get_mut(pos..pos + 4) {
            slice.copy_from_slice(&match self {
                ByteOrder::LittleEndian => value.to_le_bytes(),
                ByteOrder::BigEndian => value.to_be_bytes(),
            });
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TiffHeader {
    pub byte_order: ByteOrder,
    pub ifd0_offset: usize,
}

/// Parse the 8-byte TIFF header: byte-order mark, magic 42, IFD0 offset.
pub fn parse_header(tiff: &[u8]) -> Result<TiffHeader, ExifError> {
    if tiff.len() < 8 {
        return Err(ExifError::Corrupt("Exif payload too short for a TIFF header"));
    }
    let byte_order = match &tiff[0..2] {
        b"II" => ByteOrder::LittleEndian,
        b"MM" => ByteOrder::BigEndian,
        _ => return Err(ExifError::Corrupt("unknown TIFF byte-order mark")),
    };
    if byte_order.read_u16(tiff, 2) != Some(42) {
        return Err(ExifError::Corrupt("bad TIFF magic number"));
    }
    let ifd0_offset = byte_order
        .read_u32(tiff, 4)
        .ok_or(ExifError::Corrupt("truncated TIFF header"))? as usize;
    Ok(TiffHeader {
        byte_order,
        ifd0_offset,
    })
}

/// One 12-byte IFD entry: tag, type, count, then the value field, which holds
/// the value itself when it fits in four bytes and an absolute offset to it
/// otherwise.
#[derive(Debug, Clone, Copy)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    /// Absolute position of the entry within the TIFF blob.
    pub pos: usize,
}

impl IfdEntry {
    /// Position of the 4-byte value field.
    pub fn value_pos(&self) -> usize {
        self.pos + 8
    }

    pub fn byte_len(&self) -> usize {
        self.count as usize * type_size(self.field_type)
    }

    pub fn is_inline(&self) -> bool {
        self.byte_len() <= 4
    }

    /// Read the value as an unsigned integer (SHORT or LONG).
    pub fn read_uint(&self, tiff: &[u8], order: ByteOrder) -> Option<u32> {
        match self.field_type {
            TYPE_SHORT => order.read_u16(tiff, self.value_pos()).map(u32::from),
            TYPE_LONG | TYPE_IFD => order.read_u32(tiff, self.value_pos()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Ifd {
    pub entries: Vec<IfdEntry>,
    /// Position of the next-IFD link field.
    pub next_link_pos: usize,
    /// Offset of the next IFD in the chain; 0 means none.
    pub next_offset: usize,
}

impl Ifd {
    pub fn find(&self, tag: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }
}

pub fn parse_ifd(tiff: &[u8], order: ByteOrder, offset: usize) -> Result<Ifd, ExifError> {
    let entry_count = order
        .read_u16(tiff, offset)
        .ok_or(ExifError::Corrupt("IFD offset out of bounds"))? as usize;
    let entries_start = offset + 2;

    let mut entries = Vec::with_capacity(entry_count);
    for i in 0..entry_count {
        let pos = entries_start + i * 12;
        if pos + 12 > tiff.len() {
            return Err(ExifError::Corrupt("truncated IFD entry"));
        }
        // read_u16/read_u32 cannot fail within the bounds checked above
        let tag = order.read_u16(tiff, pos).unwrap_or(0);
        let field_type = order.read_u16(tiff, pos + 2).unwrap_or(0);
        let count = order.read_u32(tiff, pos + 4).unwrap_or(0);
        entries.push(IfdEntry {
            tag,
            field_type,
            count,
            pos,
        });
    }

    let next_link_pos = entries_start + entry_count * 12;
    let next_offset = order
        .read_u32(tiff, next_link_pos)
        .ok_or(ExifError::Corrupt("truncated IFD link"))? as usize;

    Ok(Ifd {
        entries,
        next_link_pos,
        next_offset,
    })
}

/// A location inside the TIFF blob that stores an absolute offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetSlot {
    /// Position of the stored u32.
    pub pos: usize,
    /// The offset value currently stored there.
    pub value: u32,
}

/// Census of every stored absolute offset in the IFD tree: the header's IFD0
/// pointer, out-of-line value offsets, Exif/GPS/Interop sub-IFD pointers,
/// and next-IFD links.
///
/// A splice that changes the length of a byte range must shift every slot
/// whose value points past that range; this list is what it walks.
pub fn collect_offset_slots(tiff: &[u8], header: &TiffHeader) -> Result<Vec<OffsetSlot>, ExifError> {
    let order = header.byte_order;
    let mut slots = vec![OffsetSlot {
        pos: 4,
        value: header.ifd0_offset as u32,
    }];

    let mut pending = vec![header.ifd0_offset];
    let mut visited: Vec<usize> = Vec::new();

    while let Some(offset) = pending.pop() {
        if visited.contains(&offset) {
            continue;
        }
        if visited.len() >= 32 {
            return Err(ExifError::Corrupt("IFD chain too long"));
        }
        visited.push(offset);

        let ifd = parse_ifd(tiff, order, offset)?;
        for entry in &ifd.entries {
            let is_sub_ifd = matches!(entry.tag, TAG_EXIF_IFD | TAG_GPS_IFD | TAG_INTEROP_IFD)
                && matches!(entry.field_type, TYPE_LONG | TYPE_IFD)
                && entry.count == 1;

            if is_sub_ifd {
                let value = order
                    .read_u32(tiff, entry.value_pos())
                    .ok_or(ExifError::Corrupt("truncated sub-IFD pointer"))?;
                // Some writers leave a zeroed pointer; there is no IFD there.
                if value != 0 {
                    slots.push(OffsetSlot {
                        pos: entry.value_pos(),
                        value,
                    });
                    pending.push(value as usize);
                }
            } else if !entry.is_inline() {
                let value = order
                    .read_u32(tiff, entry.value_pos())
                    .ok_or(ExifError::Corrupt("truncated IFD entry value"))?;
                slots.push(OffsetSlot {
                    pos: entry.value_pos(),
                    value,
                });
            }
        }

        if ifd.next_offset != 0 {
            slots.push(OffsetSlot {
                pos: ifd.next_link_pos,
                value: ifd.next_offset as u32,
            });
            pending.push(ifd.next_offset);
        }
    }

    Ok(slots)
}
