use std::fmt::Write;

use super::tiff::{ByteOrder, RawField};

// TIFF field type codes [EXIF23 4.6.2], plus UTF-8 from Exif 3.0.
pub const TYPE_BYTE: u16 = 1;
pub const TYPE_ASCII: u16 = 2;
pub const TYPE_SHORT: u16 = 3;
pub const TYPE_LONG: u16 = 4;
pub const TYPE_RATIONAL: u16 = 5;
pub const TYPE_SBYTE: u16 = 6;
pub const TYPE_UNDEFINED: u16 = 7;
pub const TYPE_SSHORT: u16 = 8;
pub const TYPE_SLONG: u16 = 9;
pub const TYPE_SRATIONAL: u16 = 10;
pub const TYPE_FLOAT: u16 = 11;
pub const TYPE_DOUBLE: u16 = 12;
pub const TYPE_IFD: u16 = 13;
pub const TYPE_UTF8: u16 = 129;

/// Byte length of one element of a field type, or 0 if the type is unknown.
pub fn unit_size(field_type: u16) -> usize {
    match field_type {
        TYPE_BYTE | TYPE_ASCII | TYPE_SBYTE | TYPE_UNDEFINED | TYPE_UTF8 => 1,
        TYPE_SHORT | TYPE_SSHORT => 2,
        TYPE_LONG | TYPE_SLONG | TYPE_FLOAT | TYPE_IFD => 4,
        TYPE_RATIONAL | TYPE_SRATIONAL | TYPE_DOUBLE => 8,
        _ => 0,
    }
}

/// The value of one directory entry.
///
/// Only `Text` and `RawBytes` can be edited. Everything else is carried
/// as `Other` and written back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// ASCII or UTF-8 typed field, without its NUL terminator.
    Text(String),
    /// BYTE or UNDEFINED typed field.
    RawBytes(Vec<u8>),
    /// Any other field type, kept verbatim.
    Other(RawValue),
}

/// A field value that is passed through untouched.
///
/// `data` is in the byte order of the directory it came from. For unknown
/// type codes it holds the four value/offset bytes of the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub field_type: u16,
    pub count: u32,
    pub data: Vec<u8>,
}

impl TagValue {
    /// Classify a stored field by its type code.
    pub(crate) fn from_field(field: &RawField) -> Self {
        match field.field_type {
            TYPE_ASCII | TYPE_UTF8 => TagValue::Text(decode_text(&field.data)),
            TYPE_BYTE | TYPE_UNDEFINED => TagValue::RawBytes(field.data.clone()),
            _ => TagValue::Other(RawValue {
                field_type: field.field_type,
                count: field.count,
                data: field.data.clone(),
            }),
        }
    }

    /// Human-readable rendering for display.
    pub fn display(&self, order: ByteOrder) -> String {
        match self {
            TagValue::Text(s) => s.clone(),
            TagValue::RawBytes(b) => String::from_utf8_lossy(b).into_owned(),
            TagValue::Other(raw) => raw.display(order),
        }
    }
}

/// Decode the bytes of a text field.
///
/// Trailing NULs are dropped. Valid UTF-8 is taken as is; anything else is
/// read as Latin-1 so that no byte is lost.
pub(crate) fn decode_text(data: &[u8]) -> String {
    let end = data.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    let data = &data[..end];
    match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => data.iter().map(|&b| b as char).collect(),
    }
}

impl RawValue {
    /// Render the elements, comma separated. Rationals print as `n/d`.
    pub fn display(&self, order: ByteOrder) -> String {
        let unit = unit_size(self.field_type);
        if unit == 0 || self.data.len() != unit * self.count as usize {
            return format!("<type {} x{}>", self.field_type, self.count);
        }

        let d = &self.data;
        let mut out = String::new();
        for i in 0..self.count as usize {
            if i > 0 {
                out.push_str(", ");
            }
            let at = i * unit;
            let _ = match self.field_type {
                TYPE_SHORT => write!(out, "{}", order.read_u16(d, at)),
                TYPE_SSHORT => write!(out, "{}", order.read_u16(d, at) as i16),
                TYPE_LONG | TYPE_IFD => write!(out, "{}", order.read_u32(d, at)),
                TYPE_SLONG => write!(out, "{}", order.read_u32(d, at) as i32),
                TYPE_RATIONAL => {
                    write!(out, "{}/{}", order.read_u32(d, at), order.read_u32(d, at + 4))
                }
                TYPE_SRATIONAL => write!(
                    out,
                    "{}/{}",
                    order.read_u32(d, at) as i32,
                    order.read_u32(d, at + 4) as i32
                ),
                TYPE_SBYTE => write!(out, "{}", d[at] as i8),
                TYPE_FLOAT => write!(out, "{}", f32::from_bits(order.read_u32(d, at))),
                TYPE_DOUBLE => {
                    let first = order.read_u32(d, at) as u64;
                    let second = order.read_u32(d, at + 4) as u64;
                    let bits = match order {
                        ByteOrder::Little => second << 32 | first,
                        ByteOrder::Big => first << 32 | second,
                    };
                    write!(out, "{}", f64::from_bits(bits))
                }
                _ => write!(out, "{:#04x}", d[at]),
            };
        }
        out
    }
}
