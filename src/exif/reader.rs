use crate::error::Error;
use super::container::Container;
use super::directory::Directory;
use super::tiff::{parse_ifd0, Ifd0};
use super::value::TagValue;

/// Decode the tag directory (IFD0) embedded in an image container.
///
/// Returns [`Error::Format`] when the container is not recognized or has
/// no EXIF block, and [`Error::Corrupt`] when the block is malformed.
/// If a tag occurs twice in IFD0, the last occurrence wins.
pub fn decode(container_bytes: &[u8]) -> Result<Directory, Error> {
    let container = Container::parse(container_bytes)?;
    let tiff = container
        .tiff_block()
        .ok_or(Error::Format("image has no EXIF block"))?;
    let ifd0 = parse_ifd0(&tiff)?;
    log::debug!("Decoded {} IFD0 entries ({:?} endian)", ifd0.fields.len(), ifd0.order);
    Ok(directory_from_ifd0(&ifd0))
}

/// Decode, treating a missing directory as an empty one.
pub fn decode_or_empty(container_bytes: &[u8]) -> Result<Directory, Error> {
    match decode(container_bytes) {
        Err(Error::Format(reason)) => {
            log::debug!("No EXIF directory ({reason}), using an empty one");
            Ok(Directory::new())
        }
        other => other,
    }
}

pub(crate) fn directory_from_ifd0(ifd0: &Ifd0) -> Directory {
    let mut dir = Directory::with_byte_order(ifd0.order);
    for (tag, field) in &ifd0.fields {
        dir.insert(*tag, TagValue::from_field(field));
    }
    dir
}
