use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::Error;
use super::tags::TagId;
use super::value::unit_size;

// TIFF header magic.
const TIFF_LE: [u8; 2] = *b"II";
const TIFF_BE: [u8; 2] = *b"MM";
const TIFF_FORTY_TWO: u16 = 42;

/// Size of one IFD entry: tag(2) + type(2) + count(4) + value/offset(4).
pub(crate) const ENTRY_LEN: usize = 12;
/// Header length of a TIFF structure: byte order(2) + 42(2) + IFD0 offset(4).
pub(crate) const HEADER_LEN: usize = 8;

/// Byte order of a TIFF structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    pub fn read_u16(self, data: &[u8], offset: usize) -> u16 {
        let b = [data[offset], data[offset + 1]];
        match self {
            ByteOrder::Little => u16::from_le_bytes(b),
            ByteOrder::Big => u16::from_be_bytes(b),
        }
    }

    pub fn read_u32(self, data: &[u8], offset: usize) -> u32 {
        let b = [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]];
        match self {
            ByteOrder::Little => u32::from_le_bytes(b),
            ByteOrder::Big => u32::from_be_bytes(b),
        }
    }

    pub fn encode_u16(self, val: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => val.to_le_bytes(),
            ByteOrder::Big => val.to_be_bytes(),
        }
    }

    pub fn encode_u32(self, val: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => val.to_le_bytes(),
            ByteOrder::Big => val.to_be_bytes(),
        }
    }

    fn mark(self) -> [u8; 2] {
        match self {
            ByteOrder::Little => TIFF_LE,
            ByteOrder::Big => TIFF_BE,
        }
    }
}

/// Check whether a buffer starts with a TIFF header.
pub fn is_tiff(data: &[u8]) -> bool {
    data.starts_with(b"II*\0") || data.starts_with(b"MM\0*")
}

/// One IFD entry as stored, with its value bytes resolved.
///
/// For type codes with a known unit size, `data` holds exactly
/// `count * unit` bytes, whether they were inline or out of line.
/// For unknown type codes the size cannot be computed, so `data` is the
/// four raw value/offset bytes of the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub field_type: u16,
    pub count: u32,
    pub data: Vec<u8>,
}

/// The primary image directory (IFD0) of a TIFF structure.
#[derive(Debug)]
pub(crate) struct Ifd0 {
    pub order: ByteOrder,
    /// Entries keyed by tag; a tag seen twice keeps the last occurrence.
    pub fields: BTreeMap<TagId, RawField>,
    /// Offset of the following IFD (IFD1, the thumbnail), 0 if none.
    pub next_ifd: u32,
    /// Bytes that hold nothing but this IFD: the entry table and the
    /// out-of-line values packed right behind it.
    pub region: Range<usize>,
}

/// Parse the TIFF header and IFD0 of `data`.
pub(crate) fn parse_ifd0(data: &[u8]) -> Result<Ifd0, Error> {
    if data.len() < HEADER_LEN {
        return Err(Error::Corrupt("truncated TIFF header".into()));
    }
    let order = match [data[0], data[1]] {
        TIFF_LE => ByteOrder::Little,
        TIFF_BE => ByteOrder::Big,
        _ => return Err(Error::Corrupt("invalid TIFF byte order".into())),
    };
    if order.read_u16(data, 2) != TIFF_FORTY_TWO {
        return Err(Error::Corrupt("invalid TIFF magic number".into()));
    }
    let offset = order.read_u32(data, 4) as usize;

    if data.len() < offset || data.len() - offset < 2 {
        return Err(Error::Corrupt("truncated IFD0 count".into()));
    }
    let count = order.read_u16(data, offset) as usize;
    let entries_start = offset + 2;
    // count * 12 never overflows
    if data.len() - entries_start < count * ENTRY_LEN + 4 {
        return Err(Error::Corrupt("IFD0 entries extend beyond TIFF data".into()));
    }

    let mut fields = BTreeMap::new();
    let mut spans = Vec::new();
    for i in 0..count {
        let eo = entries_start + i * ENTRY_LEN;
        let tag = TagId(order.read_u16(data, eo));
        let field_type = order.read_u16(data, eo + 2);
        let cnt = order.read_u32(data, eo + 4);
        let value_at = eo + 8;

        let unit = unit_size(field_type);
        let value = if unit == 0 {
            data[value_at..value_at + 4].to_vec()
        } else {
            let len = unit
                .checked_mul(cnt as usize)
                .ok_or_else(|| Error::Corrupt(format!("invalid entry count for tag {tag}")))?;
            if len <= 4 {
                data[value_at..value_at + len].to_vec()
            } else {
                let ofs = order.read_u32(data, value_at) as usize;
                if data.len() < ofs || data.len() - ofs < len {
                    return Err(Error::Corrupt(format!("value of tag {tag} is out of bounds")));
                }
                spans.push(ofs..ofs + len);
                data[ofs..ofs + len].to_vec()
            }
        };

        let field = RawField { field_type, count: cnt, data: value };
        if fields.insert(tag, field).is_some() {
            log::debug!("Duplicate IFD0 entry for tag {tag}, keeping the last one");
        }
    }

    let table_end = entries_start + count * ENTRY_LEN + 4;
    let next_ifd = order.read_u32(data, table_end - 4);
    let region = ifd_region(offset..table_end, spans, data.len());
    Ok(Ifd0 { order, fields, next_ifd, region })
}

/// Grow `table` over the value spans that follow it without a gap (a single
/// padding byte is allowed between them).
fn ifd_region(table: Range<usize>, mut spans: Vec<Range<usize>>, data_len: usize) -> Range<usize> {
    spans.sort_by_key(|s| s.start);
    let mut end = table.end;
    for span in spans.into_iter().filter(|s| s.start >= table.start) {
        if span.start > end + 1 {
            break;
        }
        end = end.max(span.end);
    }
    // A lone padding byte at the very end belongs to the last value.
    if end + 1 == data_len {
        end = data_len;
    }
    table.start..end
}

/// Append an IFD holding `fields` to `out` and return its offset.
///
/// The IFD starts on a word boundary; out-of-line values follow the
/// entry table, each padded to an even length.
pub(crate) fn append_ifd(
    out: &mut Vec<u8>,
    order: ByteOrder,
    fields: &BTreeMap<TagId, RawField>,
    next_ifd: u32,
) -> Result<u32, Error> {
    let count = u16::try_from(fields.len())
        .map_err(|_| Error::Encode(format!("too many entries ({}) for one IFD", fields.len())))?;

    if out.len() % 2 != 0 {
        out.push(0);
    }
    let start = out.len();

    out.extend_from_slice(&order.encode_u16(count));
    let entries_base = out.len();
    out.resize(entries_base + fields.len() * ENTRY_LEN, 0);
    out.extend_from_slice(&order.encode_u32(next_ifd));

    for (i, (tag, field)) in fields.iter().enumerate() {
        let mut entry = [0u8; ENTRY_LEN];
        entry[0..2].copy_from_slice(&order.encode_u16(tag.0));
        entry[2..4].copy_from_slice(&order.encode_u16(field.field_type));
        entry[4..8].copy_from_slice(&order.encode_u32(field.count));
        if field.data.len() <= 4 {
            entry[8..8 + field.data.len()].copy_from_slice(&field.data);
        } else {
            let data_off = offset_u32(out.len())?;
            entry[8..12].copy_from_slice(&order.encode_u32(data_off));
            out.extend_from_slice(&field.data);
            if out.len() % 2 != 0 {
                out.push(0);
            }
        }
        let eo = entries_base + i * ENTRY_LEN;
        out[eo..eo + ENTRY_LEN].copy_from_slice(&entry);
    }

    offset_u32(out.len())?;
    offset_u32(start)
}

/// Build a fresh TIFF structure whose IFD0 holds `fields`.
pub(crate) fn build_tiff(order: ByteOrder, fields: &BTreeMap<TagId, RawField>) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(HEADER_LEN + 2 + fields.len() * ENTRY_LEN + 4);
    out.extend_from_slice(&order.mark());
    out.extend_from_slice(&order.encode_u16(TIFF_FORTY_TWO));
    out.extend_from_slice(&order.encode_u32(HEADER_LEN as u32));
    let ifd0 = append_ifd(&mut out, order, fields, 0)?;
    debug_assert_eq!(ifd0 as usize, HEADER_LEN);
    Ok(out)
}

/// Point the header of `tiff` at a new IFD0.
pub(crate) fn set_ifd0_offset(tiff: &mut [u8], order: ByteOrder, offset: u32) {
    tiff[4..8].copy_from_slice(&order.encode_u32(offset));
}

fn offset_u32(offset: usize) -> Result<u32, Error> {
    u32::try_from(offset).map_err(|_| Error::Encode("TIFF data exceeds 4 GiB".into()))
}
