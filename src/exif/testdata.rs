//! Fixtures assembled in code for the codec, editor and session tests.

use super::tiff::{ByteOrder, ENTRY_LEN, HEADER_LEN};

/// Builds a TIFF structure entry by entry, in the given order, without
/// sorting or de-duplicating tags.
pub(crate) struct TiffBuilder {
    order: ByteOrder,
    entries: Vec<(u16, u16, u32, Vec<u8>)>,
    next_ifd: u32,
    trailer: Vec<u8>,
}

impl TiffBuilder {
    pub fn new(order: ByteOrder) -> Self {
        Self { order, entries: Vec::new(), next_ifd: 0, trailer: Vec::new() }
    }

    pub fn ascii(self, tag: u16, text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        let count = data.len() as u32;
        self.raw(tag, 2, count, &data)
    }

    pub fn undefined(self, tag: u16, bytes: &[u8]) -> Self {
        self.raw(tag, 7, bytes.len() as u32, bytes)
    }

    pub fn byte(self, tag: u16, bytes: &[u8]) -> Self {
        self.raw(tag, 1, bytes.len() as u32, bytes)
    }

    pub fn short(self, tag: u16, values: &[u16]) -> Self {
        let order = self.order;
        let data: Vec<u8> = values.iter().flat_map(|v| order.encode_u16(*v)).collect();
        self.raw(tag, 3, values.len() as u32, &data)
    }

    pub fn long(self, tag: u16, values: &[u32]) -> Self {
        let order = self.order;
        let data: Vec<u8> = values.iter().flat_map(|v| order.encode_u32(*v)).collect();
        self.raw(tag, 4, values.len() as u32, &data)
    }

    pub fn rational(self, tag: u16, values: &[(u32, u32)]) -> Self {
        let order = self.order;
        let data: Vec<u8> = values
            .iter()
            .flat_map(|(n, d)| order.encode_u32(*n).into_iter().chain(order.encode_u32(*d)))
            .collect();
        self.raw(tag, 5, values.len() as u32, &data)
    }

    /// Entry with explicit type and count. `data` longer than four bytes
    /// is stored out of line.
    pub fn raw(mut self, tag: u16, field_type: u16, count: u32, data: &[u8]) -> Self {
        self.entries.push((tag, field_type, count, data.to_vec()));
        self
    }

    pub fn next_ifd(mut self, offset: u32) -> Self {
        self.next_ifd = offset;
        self
    }

    /// Opaque bytes placed after the IFD0 values (strip data, sub-IFDs).
    pub fn trailer(mut self, bytes: &[u8]) -> Self {
        self.trailer = bytes.to_vec();
        self
    }

    /// Offset at which the trailer will start in the built structure.
    pub fn trailer_offset(&self) -> u32 {
        let values: usize = self
            .entries
            .iter()
            .filter(|e| e.3.len() > 4)
            .map(|e| e.3.len() + e.3.len() % 2)
            .sum();
        (HEADER_LEN + 2 + self.entries.len() * ENTRY_LEN + 4 + values) as u32
    }

    pub fn build(self) -> Vec<u8> {
        let order = self.order;
        let mut out = Vec::new();
        out.extend_from_slice(match order {
            ByteOrder::Little => b"II",
            ByteOrder::Big => b"MM",
        });
        out.extend_from_slice(&order.encode_u16(42));
        out.extend_from_slice(&order.encode_u32(HEADER_LEN as u32));
        out.extend_from_slice(&order.encode_u16(self.entries.len() as u16));

        let mut value_off = HEADER_LEN + 2 + self.entries.len() * ENTRY_LEN + 4;
        let mut values = Vec::new();
        for (tag, field_type, count, data) in &self.entries {
            out.extend_from_slice(&order.encode_u16(*tag));
            out.extend_from_slice(&order.encode_u16(*field_type));
            out.extend_from_slice(&order.encode_u32(*count));
            if data.len() <= 4 {
                let mut inline = [0u8; 4];
                inline[..data.len()].copy_from_slice(data);
                out.extend_from_slice(&inline);
            } else {
                out.extend_from_slice(&order.encode_u32(value_off as u32));
                values.extend_from_slice(data);
                if data.len() % 2 != 0 {
                    values.push(0);
                }
                value_off += data.len() + data.len() % 2;
            }
        }
        out.extend_from_slice(&order.encode_u32(self.next_ifd));
        out.extend_from_slice(&values);
        out.extend_from_slice(&self.trailer);
        out
    }
}

/// A baseline JPEG skeleton: SOI, APP0 (JFIF), an optional APP1 Exif
/// segment, a COM segment, SOS with a few bytes of scan data, EOI.
pub(crate) fn jpeg_with_exif(tiff: Option<&[u8]>) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    out.extend_from_slice(&[
        0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
        0x00, 0x01, 0x00, 0x00,
    ]);
    if let Some(tiff) = tiff {
        let len = (2 + 6 + tiff.len()) as u16;
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend_from_slice(tiff);
    }
    out.extend_from_slice(&[0xFF, 0xFE, 0x00, 0x07, b'h', b'e', b'l', b'l', b'o']);
    out.extend_from_slice(&[
        0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0x12, 0x34, 0x56,
    ]);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// The JPEG segments that are not the Exif APP1, as (marker, contents).
pub(crate) fn non_exif_segments(jpeg: &[u8]) -> Vec<(u8, Vec<u8>)> {
    use img_parts::jpeg::Jpeg;
    use img_parts::Bytes;

    let jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(jpeg)).unwrap();
    jpeg.segments()
        .iter()
        .filter(|s| !(s.marker() == 0xE1 && s.contents().starts_with(b"Exif\0\0")))
        .map(|s| (s.marker(), s.contents().to_vec()))
        .collect()
}

/// A 1x1 grayscale PNG: IHDR, an optional `eXIf` chunk holding `tiff`, a
/// `tEXt` chunk, IDAT, IEND. Chunk CRCs are computed by img-parts.
pub(crate) fn png_with_exif(tiff: Option<&[u8]>) -> Vec<u8> {
    use img_parts::png::PngChunk;
    use img_parts::Bytes;

    let mut chunks: Vec<([u8; 4], Vec<u8>)> = vec![(*b"IHDR", vec![0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0])];
    if let Some(tiff) = tiff {
        chunks.push((*b"eXIf", tiff.to_vec()));
    }
    chunks.push((*b"tEXt", b"Comment\0hello".to_vec()));
    chunks.push((*b"IDAT", vec![0x78, 0x9C, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01]));
    chunks.push((*b"IEND", Vec::new()));

    let mut out = b"\x89PNG\r\n\x1a\n".to_vec();
    for (kind, contents) in chunks {
        out.extend_from_slice(&PngChunk::new(kind, Bytes::from(contents)).encoder().bytes());
    }
    out
}

/// The PNG chunks other than `eXIf`, as (type, contents), in file order.
pub(crate) fn non_exif_png_chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    use img_parts::png::Png;
    use img_parts::Bytes;

    let png = Png::from_bytes(Bytes::copy_from_slice(png)).unwrap();
    png.chunks()
        .iter()
        .filter(|c| &c.kind() != b"eXIf")
        .map(|c| (c.kind(), c.contents().to_vec()))
        .collect()
}

/// A 1x1 lossless WebP. With `exif_chunk`, the file uses the extended
/// format (VP8X with the EXIF flag set) and carries an `EXIF` chunk with
/// exactly those bytes.
pub(crate) fn webp_with_exif(exif_chunk: Option<&[u8]>) -> Vec<u8> {
    fn chunk(out: &mut Vec<u8>, id: &[u8; 4], data: &[u8]) {
        out.extend_from_slice(id);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        if data.len() % 2 != 0 {
            out.push(0);
        }
    }

    let mut body = b"WEBP".to_vec();
    if exif_chunk.is_some() {
        chunk(&mut body, b"VP8X", &[0b0000_1000, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }
    chunk(&mut body, b"VP8L", &[0x2F, 0x00, 0x00, 0x00, 0x00, 0x88, 0x88, 0x08, 0x00]);
    if let Some(data) = exif_chunk {
        chunk(&mut body, b"EXIF", data);
    }

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

/// The WebP chunks as (id, data), in file order.
pub(crate) fn webp_chunks(webp: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    use img_parts::webp::WebP;
    use img_parts::Bytes;

    let webp = WebP::from_bytes(Bytes::copy_from_slice(webp)).unwrap();
    webp.chunks()
        .iter()
        .map(|c| (c.id(), c.content().data().map(|d| d.to_vec()).unwrap_or_default()))
        .collect()
}
