use std::borrow::Cow;
use std::fmt;

/// Numeric key of a directory entry (a TIFF tag number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagId(pub u16);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for TagId {
    fn from(id: u16) -> Self {
        TagId(id)
    }
}

// Well-known tag ids used by the editor defaults.
pub const IMAGE_DESCRIPTION: TagId = TagId(0x010E);
pub const SOFTWARE: TagId = TagId(0x0131);
pub const ARTIST: TagId = TagId(0x013B);
pub const COPYRIGHT: TagId = TagId(0x8298);

// Sorted by id; names follow the TIFF 6.0 / Exif 2.3 tables.
static TAG_NAMES: &[(u16, &str)] = &[
    (0x000B, "ProcessingSoftware"),
    (0x00FE, "NewSubfileType"),
    (0x00FF, "SubfileType"),
    (0x0100, "ImageWidth"),
    (0x0101, "ImageLength"),
    (0x0102, "BitsPerSample"),
    (0x0103, "Compression"),
    (0x0106, "PhotometricInterpretation"),
    (0x0107, "Thresholding"),
    (0x0108, "CellWidth"),
    (0x0109, "CellLength"),
    (0x010A, "FillOrder"),
    (0x010D, "DocumentName"),
    (0x010E, "ImageDescription"),
    (0x010F, "Make"),
    (0x0110, "Model"),
    (0x0111, "StripOffsets"),
    (0x0112, "Orientation"),
    (0x0115, "SamplesPerPixel"),
    (0x0116, "RowsPerStrip"),
    (0x0117, "StripByteCounts"),
    (0x0118, "MinSampleValue"),
    (0x0119, "MaxSampleValue"),
    (0x011A, "XResolution"),
    (0x011B, "YResolution"),
    (0x011C, "PlanarConfiguration"),
    (0x011D, "PageName"),
    (0x0122, "GrayResponseUnit"),
    (0x0123, "GrayResponseCurve"),
    (0x0128, "ResolutionUnit"),
    (0x0129, "PageNumber"),
    (0x012D, "TransferFunction"),
    (0x0131, "Software"),
    (0x0132, "DateTime"),
    (0x013B, "Artist"),
    (0x013C, "HostComputer"),
    (0x013D, "Predictor"),
    (0x013E, "WhitePoint"),
    (0x013F, "PrimaryChromaticities"),
    (0x0140, "ColorMap"),
    (0x0141, "HalftoneHints"),
    (0x0142, "TileWidth"),
    (0x0143, "TileLength"),
    (0x0144, "TileOffsets"),
    (0x0145, "TileByteCounts"),
    (0x014A, "SubIFDs"),
    (0x0152, "ExtraSamples"),
    (0x0153, "SampleFormat"),
    (0x0201, "JpegIFOffset"),
    (0x0202, "JpegIFByteCount"),
    (0x0211, "YCbCrCoefficients"),
    (0x0212, "YCbCrSubSampling"),
    (0x0213, "YCbCrPositioning"),
    (0x0214, "ReferenceBlackWhite"),
    (0x02BC, "XMLPacket"),
    (0x4746, "Rating"),
    (0x4749, "RatingPercent"),
    (0x8298, "Copyright"),
    (0x829A, "ExposureTime"),
    (0x829D, "FNumber"),
    (0x83BB, "IPTCNAA"),
    (0x8649, "ImageResources"),
    (0x8769, "ExifOffset"),
    (0x8773, "InterColorProfile"),
    (0x8822, "ExposureProgram"),
    (0x8825, "GPSInfo"),
    (0x8827, "ISOSpeedRatings"),
    (0x9000, "ExifVersion"),
    (0x9003, "DateTimeOriginal"),
    (0x9004, "DateTimeDigitized"),
    (0x9010, "OffsetTime"),
    (0x9286, "UserComment"),
    (0x9C9B, "XPTitle"),
    (0x9C9C, "XPComment"),
    (0x9C9D, "XPAuthor"),
    (0x9C9E, "XPKeywords"),
    (0x9C9F, "XPSubject"),
    (0xA005, "ExifInteroperabilityOffset"),
    (0xA420, "ImageUniqueID"),
    (0xA430, "CameraOwnerName"),
    (0xA431, "BodySerialNumber"),
    (0xA433, "LensMake"),
    (0xA434, "LensModel"),
    (0xC4A5, "PrintImageMatching"),
    (0xC612, "DNGVersion"),
    (0xC614, "UniqueCameraModel"),
    (0xEA1C, "Padding"),
];

/// Human-readable name of a tag, or its decimal id if none is registered.
pub fn name_of(tag: TagId) -> Cow<'static, str> {
    match TAG_NAMES.binary_search_by_key(&tag.0, |&(id, _)| id) {
        Ok(i) => Cow::Borrowed(TAG_NAMES[i].1),
        Err(_) => Cow::Owned(tag.to_string()),
    }
}

/// Resolve a registered name (case-insensitive) or a decimal / `0x` hex id.
pub fn id_of(name: &str) -> Option<TagId> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix("0x").or_else(|| name.strip_prefix("0X")) {
        return u16::from_str_radix(hex, 16).ok().map(TagId);
    }
    if let Ok(id) = name.parse::<u16>() {
        return Some(TagId(id));
    }
    TAG_NAMES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|&(id, _)| TagId(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(TAG_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_names() {
        assert_eq!(name_of(TagId(270)), "ImageDescription");
        assert_eq!(name_of(TagId(315)), "Artist");
        assert_eq!(name_of(COPYRIGHT), "Copyright");
        assert_eq!(name_of(TagId(0x8769)), "ExifOffset");
    }

    #[test]
    fn unknown_name_is_decimal_id() {
        assert_eq!(name_of(TagId(999)), "999");
        assert_eq!(name_of(TagId(0)), "0");
        assert_eq!(name_of(TagId(u16::MAX)), "65535");
    }

    #[test]
    fn reverse_lookup() {
        assert_eq!(id_of("Artist"), Some(ARTIST));
        assert_eq!(id_of("imagedescription"), Some(IMAGE_DESCRIPTION));
        assert_eq!(id_of("315"), Some(ARTIST));
        assert_eq!(id_of("0x013b"), Some(ARTIST));
        assert_eq!(id_of(" 999 "), Some(TagId(999)));
        assert_eq!(id_of("NoSuchTag"), None);
        assert_eq!(id_of("70000"), None);
    }
}
