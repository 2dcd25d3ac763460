//! EXIF tag directory codec.
//!
//! - [`decode`]: Parse IFD0 of the EXIF block embedded in a container
//! - [`encode`]: Write a (possibly edited) directory back into a copy of the container
//!
//! Supported containers are bare TIFF, JPEG (APP1), PNG (`eXIf`) and WebP
//! (`EXIF`). Values are typed as [`TagValue::Text`], [`TagValue::RawBytes`]
//! or the untouched passthrough [`TagValue::Other`].

mod container;
mod directory;
mod reader;
pub mod tags;
mod tiff;
mod value;
mod writer;

#[cfg(test)]
pub(crate) mod testdata;

pub use crate::error::Error;
pub use directory::Directory;
pub use reader::{decode, decode_or_empty};
pub use tags::{id_of, name_of, TagId};
pub use tiff::{is_tiff, ByteOrder};
pub use value::{RawValue, TagValue};
pub use writer::encode;
