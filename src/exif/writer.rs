use std::collections::BTreeMap;

use crate::error::Error;
use super::container::Container;
use super::directory::Directory;
use super::reader::directory_from_ifd0;
use super::tags::TagId;
use super::tiff::{append_ifd, build_tiff, parse_ifd0, set_ifd0_offset, Ifd0, RawField, HEADER_LEN};
use super::value::{unit_size, TagValue, TYPE_ASCII, TYPE_BYTE, TYPE_UNDEFINED, TYPE_UTF8};

/// Write `dir` into a copy of `original`, returning the new container bytes.
///
/// Only the tag directory changes. With an existing EXIF block, everything
/// outside the old IFD0 keeps its offset, so sub-IFDs, thumbnail and strips
/// stay valid; see [`place_ifd0`]. Entries whose value did not change are
/// written with their original type, count and bytes. `original` itself is
/// never modified.
pub fn encode(original: &[u8], dir: &Directory) -> Result<Vec<u8>, Error> {
    let mut container = Container::parse(original)?;

    let tiff = match container.tiff_block() {
        Some(tiff) => {
            let ifd0 = parse_ifd0(&tiff)?;
            if directory_from_ifd0(&ifd0) == *dir {
                log::debug!("Directory unchanged, keeping original bytes");
                return Ok(original.to_vec());
            }
            let fields = encode_fields(dir, &ifd0.fields)?;
            place_ifd0(tiff, &ifd0, &fields)?
        }
        None if dir.is_empty() => return Ok(original.to_vec()),
        None => {
            let fields = encode_fields(dir, &BTreeMap::new())?;
            log::debug!("Building new EXIF block with {} entries", fields.len());
            build_tiff(dir.byte_order(), &fields)?
        }
    };

    container.set_tiff_block(tiff)?;
    Ok(container.into_bytes())
}

/// Lay out the new IFD0 inside `tiff`.
///
/// When the old IFD0 region ends the block, the block is cut there and the
/// new IFD0 written in its place. When the new IFD0 fits in the old region,
/// it overwrites it and the rest of the region is zeroed. Otherwise it is
/// appended and the old region is left unreferenced.
fn place_ifd0(
    mut tiff: Vec<u8>,
    ifd0: &Ifd0,
    fields: &BTreeMap<TagId, RawField>,
) -> Result<Vec<u8>, Error> {
    let order = ifd0.order;
    let region = ifd0.region.clone();

    if region.start >= HEADER_LEN {
        let mut rebuilt = tiff[..region.start].to_vec();
        let start = append_ifd(&mut rebuilt, order, fields, ifd0.next_ifd)?;

        if region.end >= tiff.len() {
            set_ifd0_offset(&mut rebuilt, order, start);
            log::debug!("Rewrote trailing IFD0 with {} entries at offset {start}", fields.len());
            return Ok(rebuilt);
        }
        if rebuilt.len() <= region.end {
            let end = rebuilt.len();
            tiff[region.start..end].copy_from_slice(&rebuilt[region.start..]);
            tiff[end..region.end].fill(0);
            set_ifd0_offset(&mut tiff, order, start);
            log::debug!("Rewrote IFD0 with {} entries in place at offset {start}", fields.len());
            return Ok(tiff);
        }
    }

    let start = append_ifd(&mut tiff, order, fields, ifd0.next_ifd)?;
    set_ifd0_offset(&mut tiff, order, start);
    log::debug!("Appended new IFD0 with {} entries at offset {start}", fields.len());
    Ok(tiff)
}

/// Turn every directory entry into a stored field.
fn encode_fields(
    dir: &Directory,
    originals: &BTreeMap<TagId, RawField>,
) -> Result<BTreeMap<TagId, RawField>, Error> {
    let mut fields = BTreeMap::new();
    for (tag, value) in dir.iter() {
        let original = originals.get(&tag);
        let field = match original {
            Some(orig) if TagValue::from_field(orig) == *value => orig.clone(),
            _ => encode_value(tag, value, original.map(|f| f.field_type))?,
        };
        fields.insert(tag, field);
    }
    Ok(fields)
}

/// Encode a changed or new value. Text and byte values keep the type code
/// of the field they replace when it is of the same kind.
fn encode_value(tag: TagId, value: &TagValue, prev_type: Option<u16>) -> Result<RawField, Error> {
    match value {
        TagValue::Text(text) => {
            if text.contains('\0') {
                return Err(Error::Encode(format!("text of tag {tag} contains a NUL character")));
            }
            let field_type = match prev_type {
                Some(TYPE_UTF8) => TYPE_UTF8,
                _ => TYPE_ASCII,
            };
            let mut data = Vec::with_capacity(text.len() + 1);
            data.extend_from_slice(text.as_bytes());
            data.push(0);
            Ok(RawField { field_type, count: count_of(tag, data.len())?, data })
        }
        TagValue::RawBytes(bytes) => {
            let field_type = match prev_type {
                Some(TYPE_BYTE) => TYPE_BYTE,
                _ => TYPE_UNDEFINED,
            };
            Ok(RawField { field_type, count: count_of(tag, bytes.len())?, data: bytes.clone() })
        }
        TagValue::Other(raw) => {
            let unit = unit_size(raw.field_type);
            let expected = if unit == 0 { Some(4) } else { unit.checked_mul(raw.count as usize) };
            if expected != Some(raw.data.len()) {
                return Err(Error::Encode(format!(
                    "tag {tag}: {} bytes do not match {} element(s) of type {}",
                    raw.data.len(),
                    raw.count,
                    raw.field_type
                )));
            }
            Ok(RawField { field_type: raw.field_type, count: raw.count, data: raw.data.clone() })
        }
    }
}

fn count_of(tag: TagId, len: usize) -> Result<u32, Error> {
    u32::try_from(len).map_err(|_| Error::Encode(format!("value of tag {tag} is too large")))
}
