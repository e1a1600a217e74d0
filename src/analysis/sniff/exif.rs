//! Just enough TIFF/EXIF walking to pull `DateTimeOriginal` out of a file head.

use chrono::NaiveDateTime;

const EXIF_IFD_POINTER: u16 = 0x8769;
const DATE_TIME_ORIGINAL: u16 = 0x9003;
const ASCII: u16 = 2;
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

struct Tiff<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> Tiff<'a> {
    fn parse(data: &'a [u8]) -> Option<Self> {
        let order = match data.get(0..2)? {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            _ => return None,
        };
        let tiff = Self { data, order };
        (tiff.u16_at(2)? == 42).then_some(tiff)
    }

    fn u16_at(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset + 2)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset + 4)?.try_into().ok()?;
        Some(match self.order {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    /// Returns (type, count, value-or-offset field position) for `tag`.
    fn find_entry(&self, ifd_offset: usize, tag: u16) -> Option<(u16, usize, usize)> {
        let count = self.u16_at(ifd_offset)? as usize;
        (0..count).find_map(|i| {
            let entry = ifd_offset + 2 + i * 12;
            if self.u16_at(entry)? != tag {
                return None;
            }
            let kind = self.u16_at(entry + 2)?;
            let n = self.u32_at(entry + 4)? as usize;
            Some((kind, n, entry + 8))
        })
    }

    fn ascii(&self, ifd_offset: usize, tag: u16) -> Option<&'a str> {
        let (kind, count, field) = self.find_entry(ifd_offset, tag)?;
        if kind != ASCII || count == 0 {
            return None;
        }
        let start = if count <= 4 {
            field
        } else {
            self.u32_at(field)? as usize
        };
        let raw = self.data.get(start..start.checked_add(count)?)?;
        let raw = raw.split(|b| *b == 0).next()?;
        std::str::from_utf8(raw).ok()
    }
}

/// Finds the TIFF block inside a JPEG APP1 segment, a HEIC `Exif` item or a
/// PNG `eXIf` chunk.
fn locate_tiff(head: &[u8]) -> Option<&[u8]> {
    if let Some(pos) = find(head, b"Exif\0\0") {
        return head.get(pos + 6..);
    }
    find(head, b"eXIf").and_then(|pos| head.get(pos + 4..))
}

pub fn capture_time(head: &[u8]) -> Option<NaiveDateTime> {
    let tiff = Tiff::parse(locate_tiff(head)?)?;
    let ifd0 = tiff.u32_at(4)? as usize;
    let (_, _, field) = tiff.find_entry(ifd0, EXIF_IFD_POINTER)?;
    let exif_ifd = tiff.u32_at(field)? as usize;
    let text = tiff.ascii(exif_ifd, DATE_TIME_ORIGINAL)?;
    NaiveDateTime::parse_from_str(text.trim(), EXIF_DATE_FORMAT).ok()
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Builds a little-endian JPEG head with one APP1 EXIF segment carrying
    /// `DateTimeOriginal = date`.
    pub(crate) fn jpeg_with_capture_time(date: &str) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II");
        tiff.extend_from_slice(&42u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());
        // IFD0 at 8: one entry pointing at the EXIF IFD.
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&EXIF_IFD_POINTER.to_le_bytes());
        tiff.extend_from_slice(&4u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&26u32.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        // EXIF IFD at 26: DateTimeOriginal stored at 44.
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&DATE_TIME_ORIGINAL.to_le_bytes());
        tiff.extend_from_slice(&ASCII.to_le_bytes());
        tiff.extend_from_slice(&20u32.to_le_bytes());
        tiff.extend_from_slice(&44u32.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(date.as_bytes());
        tiff.push(0);

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        jpeg.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
        jpeg.extend_from_slice(b"Exif\0\0");
        jpeg.extend_from_slice(&tiff);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn test_capture_time_from_jpeg_app1() {
        let head = jpeg_with_capture_time("2023:01:01 12:00:00");
        let expected = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(capture_time(&head), Some(expected));
    }

    #[test]
    fn test_zeroed_capture_time_is_ignored() {
        let head = jpeg_with_capture_time("0000:00:00 00:00:00");
        assert_eq!(capture_time(&head), None);
    }

    #[test]
    fn test_no_exif_block() {
        assert_eq!(capture_time(b"\x89PNG\r\n\x1a\nIHDR"), None);
        assert_eq!(capture_time(b"Exif\0\0garbage"), None);
    }
}
