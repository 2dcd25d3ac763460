use img_parts::jpeg::Jpeg;
use img_parts::png::{Png, PngChunk};
use img_parts::riff::{RiffChunk, RiffContent};
use img_parts::webp::{WebP, CHUNK_EXIF, CHUNK_VP8X};
use img_parts::{Bytes, DynImage, ImageEXIF};

use crate::error::Error;
use super::tiff::is_tiff;

const EXIF_PREFIX: &[u8] = b"Exif\0\0";
const APP1: u8 = 0xE1;
const PNG_EXIF: [u8; 4] = *b"eXIf";
const PNG_IDAT: [u8; 4] = *b"IDAT";
// VP8X flag bit announcing an EXIF chunk.
const VP8X_EXIF_FLAG: u8 = 0b0000_1000;

// A JPEG segment is limited to 65535 bytes including its 2-byte length;
// img-parts adds the Exif\0\0 prefix in front of the TIFF data.
const JPEG_MAX_TIFF_LEN: usize = 65535 - 2 - EXIF_PREFIX.len();

/// An image file split into its EXIF block and everything else.
pub(crate) enum Container {
    /// A bare TIFF file. The whole file is the TIFF structure.
    Tiff(Vec<u8>),
    /// JPEG, PNG or WebP, with segments handled by img-parts.
    Image(DynImage),
}

impl Container {
    /// Recognize the container format of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if is_tiff(bytes) {
            return Ok(Container::Tiff(bytes.to_vec()));
        }
        match DynImage::from_bytes(Bytes::copy_from_slice(bytes)) {
            Ok(Some(image)) => Ok(Container::Image(image)),
            Ok(None) => Err(Error::Format("unrecognized image container")),
            Err(e) => Err(Error::Corrupt(format!("malformed image container: {e}"))),
        }
    }

    /// The TIFF structure holding the tag directory, if any.
    pub fn tiff_block(&self) -> Option<Vec<u8>> {
        match self {
            Container::Tiff(bytes) => Some(bytes.clone()),
            // The WebP EXIF chunk may hold bare TIFF data, which
            // `ImageEXIF::exif` does not report.
            Container::Image(DynImage::WebP(webp)) => {
                let data = webp.chunk_by_id(CHUNK_EXIF)?.content().data()?;
                Some(data.strip_prefix(EXIF_PREFIX).unwrap_or(&data[..]).to_vec())
            }
            Container::Image(image) => {
                let exif = image.exif()?;
                let tiff = exif.strip_prefix(EXIF_PREFIX).unwrap_or(&exif[..]);
                Some(tiff.to_vec())
            }
        }
    }

    /// Replace the TIFF structure. All other segments are kept as they were.
    pub fn set_tiff_block(&mut self, tiff: Vec<u8>) -> Result<(), Error> {
        match self {
            Container::Tiff(bytes) => *bytes = tiff,
            Container::Image(DynImage::Jpeg(jpeg)) => {
                if tiff.len() > JPEG_MAX_TIFF_LEN {
                    return Err(Error::Encode(format!(
                        "EXIF block of {} bytes exceeds the {JPEG_MAX_TIFF_LEN} bytes a JPEG APP1 segment can hold",
                        tiff.len()
                    )));
                }
                set_jpeg_exif(jpeg, tiff);
            }
            Container::Image(DynImage::Png(png)) => set_png_exif(png, tiff),
            Container::Image(DynImage::WebP(webp)) => set_webp_exif(webp, tiff),
        }
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Container::Tiff(bytes) => bytes,
            Container::Image(image) => image.encoder().bytes().to_vec(),
        }
    }
}

/// Write the EXIF block of a JPEG, keeping the segment where it was.
fn set_jpeg_exif(jpeg: &mut Jpeg, tiff: Vec<u8>) {
    let orig_pos = find_exif_segment_pos(jpeg);
    jpeg.set_exif(Some(Bytes::from(tiff)));

    // set_exif() removes the old segment and inserts the new one at a fixed
    // position; move it back so EXIF keeps its place relative to XMP etc.
    // A new segment goes right after APP0.
    if let Some(new_pos) = find_exif_segment_pos(jpeg) {
        let target_pos = orig_pos.unwrap_or(1).min(jpeg.segments().len() - 1);
        if new_pos != target_pos {
            let segments = jpeg.segments_mut();
            let seg = segments.remove(new_pos);
            segments.insert(target_pos, seg);
        }
    }
}

/// Write the `eXIf` chunk of a PNG. An existing chunk is replaced where it
/// stands; a new one goes before the image data.
fn set_png_exif(png: &mut Png, tiff: Vec<u8>) {
    let chunks = png.chunks_mut();
    let pos = chunks.iter().position(|c| c.kind() == PNG_EXIF);
    chunks.retain(|c| c.kind() != PNG_EXIF);
    let pos = pos
        .or_else(|| chunks.iter().position(|c| c.kind() == PNG_IDAT))
        .unwrap_or(chunks.len().saturating_sub(1));
    chunks.insert(pos, PngChunk::new(PNG_EXIF, Bytes::from(tiff)));
}

/// Write the `EXIF` chunk of a WebP.
///
/// An existing chunk keeps its position and its `Exif\0\0` prefix, if it
/// had one. A new chunk holds bare TIFF data and turns a simple WebP into
/// the extended (VP8X) format.
fn set_webp_exif(webp: &mut WebP, tiff: Vec<u8>) {
    let existing = webp.chunks().iter().position(|c| c.id() == CHUNK_EXIF);
    match existing {
        Some(pos) => {
            let prefixed = webp.chunks()[pos]
                .content()
                .data()
                .is_some_and(|d| d.starts_with(EXIF_PREFIX));
            let data = if prefixed { [EXIF_PREFIX, tiff.as_slice()].concat() } else { tiff };
            webp.chunks_mut()[pos] = RiffChunk::new(CHUNK_EXIF, RiffContent::Data(Bytes::from(data)));
        }
        None => {
            webp.set_exif(Some(Bytes::from(tiff.clone())));
            if let Some(chunk) = webp.chunks_mut().iter_mut().find(|c| c.id() == CHUNK_EXIF) {
                *chunk = RiffChunk::new(CHUNK_EXIF, RiffContent::Data(Bytes::from(tiff)));
            }
        }
    }

    if let Some(vp8x) = webp.chunks_mut().iter_mut().find(|c| c.id() == CHUNK_VP8X) {
        if let Some(data) = vp8x.content().data() {
            if data.first().is_some_and(|flags| flags & VP8X_EXIF_FLAG == 0) {
                let mut flagged = data.to_vec();
                flagged[0] |= VP8X_EXIF_FLAG;
                *vp8x.content_mut() = RiffContent::Data(Bytes::from(flagged));
            }
        }
    }
}

/// Find the position of the EXIF APP1 segment in a JPEG.
fn find_exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    jpeg.segments()
        .iter()
        .position(|s| s.marker() == APP1 && s.contents().starts_with(EXIF_PREFIX))
}
