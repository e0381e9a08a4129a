//! Minimal IPTC-IIM parser for JPEG files.
//!
//! Extracts three fields from IPTC Record 2:
//! - ObjectName (2:05): title
//! - DateCreated (2:55): creation date, `CCYYMMDD`
//! - Caption-Abstract (2:120): caption
//!
//! The IIM block lives in the APP13 marker as Photoshop 8BIM resource 0x0404.

use super::backend::BackendError;

/// IPTC metadata extracted from an image file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IptcData {
    pub object_name: Option<String>,
    pub date_created: Option<String>,
    pub caption: Option<String>,
}

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Parse IPTC metadata out of JPEG bytes.
///
/// Errors only when the bytes are not a JPEG container at all. A JPEG with no
/// APP13 segment, or a malformed one, yields empty metadata.
pub fn read_iptc_from_jpeg(data: &[u8]) -> Result<IptcData, BackendError> {
    if !data.starts_with(&JPEG_SOI) {
        return Err(BackendError::NotJpeg(
            "missing start-of-image marker".to_string(),
        ));
    }
    Ok(find_jpeg_app13_iptc(data)
        .map(parse_iptc_iim)
        .unwrap_or_default())
}

// ---------------------------------------------------------------------------
// IPTC-IIM record parsing
// ---------------------------------------------------------------------------

/// Parse raw IPTC-IIM bytes into structured metadata.
///
/// IIM record format (each dataset):
///   Byte 0:    0x1C (tag marker)
///   Byte 1:    Record number (we want 0x02)
///   Byte 2:    Dataset number (0x05=ObjectName, 0x37=DateCreated, 0x78=Caption)
///   Bytes 3-4: Data length (big-endian u16)
///   Bytes 5+:  Data (UTF-8/ASCII string)
fn parse_iptc_iim(data: &[u8]) -> IptcData {
    let mut result = IptcData::default();
    let mut pos = 0;

    while pos + 5 <= data.len() {
        if data[pos] != 0x1C {
            pos += 1;
            continue;
        }

        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let length = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        pos += 5;

        if pos + length > data.len() {
            break;
        }

        if record == 2 {
            let value = String::from_utf8_lossy(&data[pos..pos + length])
                .trim()
                .to_string();

            if !value.is_empty() {
                match dataset {
                    5 => result.object_name = Some(value),
                    55 => result.date_created = Some(format_iptc_date(&value)),
                    120 => result.caption = Some(value),
                    _ => {}
                }
            }
        }

        pos += length;
    }

    result
}

/// Present an IIM `CCYYMMDD` date as `CCYY-MM-DD`; anything else is kept as-is.
fn format_iptc_date(raw: &str) -> String {
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[0..4], &raw[4..6], &raw[6..8])
    } else {
        raw.to_string()
    }
}

// ---------------------------------------------------------------------------
// JPEG: extract IPTC from APP13 / Photoshop 8BIM
// ---------------------------------------------------------------------------

const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

/// Find the raw IPTC-IIM bytes inside a JPEG's APP13 segment.
fn find_jpeg_app13_iptc(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 0;
    while pos + 4 < data.len() {
        if data[pos] == 0xFF && data[pos + 1] == 0xED {
            let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            let seg_start = pos + 4;
            let seg_end = (pos + 2 + seg_len).min(data.len());
            if seg_start <= seg_end {
                if let Some(iptc) = extract_iptc_from_8bim(&data[seg_start..seg_end]) {
                    return Some(iptc);
                }
            }
        }

        if data[pos] == 0xFF && pos + 3 < data.len() && data[pos + 1] != 0x00 {
            let marker = data[pos + 1];
            // SOS: entropy-coded data follows, no more metadata segments
            if marker == 0xDA {
                break;
            }
            if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
                pos += 2;
            } else {
                let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                pos += 2 + len;
            }
        } else {
            pos += 1;
        }
    }
    None
}

/// Extract IPTC-IIM bytes from a Photoshop 8BIM resource block.
///
/// Input: segment data after the JPEG marker header, starting with
/// "Photoshop 3.0\0" or directly with "8BIM" entries.
fn extract_iptc_from_8bim(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        // "8BIM" (4) + resource_id (2) + pascal_string + data_len (4) + data
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;

        let resource_id = u16::from_be_bytes([data[pos], data[pos + 1]]);
        pos += 2;

        // Pascal string padded to an even total length
        let pascal_len = data[pos] as usize;
        pos += 1 + pascal_len + ((1 + pascal_len) % 2);

        if pos + 4 > data.len() {
            break;
        }
        let res_len =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;

        if pos + res_len > data.len() {
            break;
        }

        if resource_id == IPTC_RESOURCE_ID {
            return Some(&data[pos..pos + res_len]);
        }

        pos += res_len + (res_len % 2);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{IptcFields, app13_segment};

    #[test]
    fn parse_empty_returns_default() {
        assert_eq!(parse_iptc_iim(&[]), IptcData::default());
    }

    #[test]
    fn parse_single_object_name() {
        let data = [0x1C, 0x02, 0x05, 0x00, 0x05, b'H', b'e', b'l', b'l', b'o'];
        let result = parse_iptc_iim(&data);
        assert_eq!(result.object_name, Some("Hello".to_string()));
        assert_eq!(result.caption, None);
        assert_eq!(result.date_created, None);
    }

    #[test]
    fn parse_caption() {
        let data = [0x1C, 0x02, 0x78, 0x00, 0x04, b't', b'e', b's', b't'];
        let result = parse_iptc_iim(&data);
        assert_eq!(result.caption, Some("test".to_string()));
    }

    #[test]
    fn parse_date_created_is_formatted() {
        let mut data = vec![0x1C, 0x02, 0x37, 0x00, 0x08];
        data.extend_from_slice(b"20210304");
        let result = parse_iptc_iim(&data);
        assert_eq!(result.date_created, Some("2021-03-04".to_string()));
    }

    #[test]
    fn parse_irregular_date_kept_verbatim() {
        let mut data = vec![0x1C, 0x02, 0x37, 0x00, 0x06];
        data.extend_from_slice(b"spring");
        let result = parse_iptc_iim(&data);
        assert_eq!(result.date_created, Some("spring".to_string()));
    }

    #[test]
    fn parse_all_fields_together() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0x1C, 0x02, 0x05, 0x00, 0x05]);
        data.extend_from_slice(b"Title");
        data.extend_from_slice(&[0x1C, 0x02, 0x19, 0x00, 0x03]);
        data.extend_from_slice(b"art");
        data.extend_from_slice(&[0x1C, 0x02, 0x78, 0x00, 0x09]);
        data.extend_from_slice(b"A caption");

        let result = parse_iptc_iim(&data);
        assert_eq!(result.object_name, Some("Title".to_string()));
        assert_eq!(result.caption, Some("A caption".to_string()));
    }

    #[test]
    fn skips_non_record2() {
        let data = [0x1C, 0x01, 0x05, 0x00, 0x03, b'f', b'o', b'o'];
        assert_eq!(parse_iptc_iim(&data), IptcData::default());
    }

    #[test]
    fn truncated_dataset_stops_parsing() {
        // Declares 16 bytes but only 3 follow
        let data = [0x1C, 0x02, 0x05, 0x00, 0x10, b'a', b'b', b'c'];
        assert_eq!(parse_iptc_iim(&data), IptcData::default());
    }

    #[test]
    fn rejects_non_jpeg_bytes() {
        let result = read_iptc_from_jpeg(b"\x89PNG\r\n\x1a\n");
        assert!(matches!(result, Err(BackendError::NotJpeg(_))));
    }

    #[test]
    fn rejects_empty_file() {
        assert!(read_iptc_from_jpeg(&[]).is_err());
    }

    #[test]
    fn jpeg_without_app13_has_no_tags() {
        let data = [0xFF, 0xD8, 0xFF, 0xD9];
        assert_eq!(read_iptc_from_jpeg(&data).unwrap(), IptcData::default());
    }

    #[test]
    fn reads_tags_from_app13_segment() {
        let mut data = vec![0xFF, 0xD8];
        data.extend(app13_segment(&IptcFields {
            title: Some("Cat Nap"),
            caption: Some("Sleeping on the sill"),
            date_created: Some("20200115"),
        }));
        data.extend_from_slice(&[0xFF, 0xD9]);

        let result = read_iptc_from_jpeg(&data).unwrap();
        assert_eq!(result.object_name.as_deref(), Some("Cat Nap"));
        assert_eq!(result.caption.as_deref(), Some("Sleeping on the sill"));
        assert_eq!(result.date_created.as_deref(), Some("2020-01-15"));
    }

    #[test]
    fn extract_skips_other_8bim_resources() {
        let mut segment = Vec::new();
        // Resource 0x0425 (digest) with 4 bytes of payload
        segment.extend_from_slice(b"8BIM");
        segment.extend_from_slice(&[0x04, 0x25, 0x00, 0x00]);
        segment.extend_from_slice(&4u32.to_be_bytes());
        segment.extend_from_slice(&[1, 2, 3, 4]);
        // Resource 0x0404 with the IIM block
        let iim = [0x1C, 0x02, 0x05, 0x00, 0x02, b'h', b'i'];
        segment.extend_from_slice(b"8BIM");
        segment.extend_from_slice(&[0x04, 0x04, 0x00, 0x00]);
        segment.extend_from_slice(&(iim.len() as u32).to_be_bytes());
        segment.extend_from_slice(&iim);

        assert_eq!(extract_iptc_from_8bim(&segment), Some(&iim[..]));
    }
}
