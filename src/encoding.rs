//! Character encoding detection for uploaded text files.
//!
//! Detection priority: BOM sniffing, strict UTF-8 validation, then
//! chardetng statistical detection for legacy encodings.

use chardetng::EncodingDetector;
use encoding_rs::{UTF_8, UTF_16BE, UTF_16LE};

/// UTF-8 BOM: EF BB BF
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
/// UTF-16 LE BOM: FF FE
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
/// UTF-16 BE BOM: FE FF
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decode a byte buffer to a UTF-8 string.
///
/// Malformed sequences in the detected encoding are replaced rather than
/// rejected; a file that decodes to nothing is discarded later by the
/// empty-content check in ingestion.
pub fn decode_text(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    if bytes.starts_with(UTF8_BOM) {
        let (text, _, _) = UTF_8.decode(&bytes[UTF8_BOM.len()..]);
        return text.into_owned();
    }
    // UTF-16 BOMs must be checked before the UTF-8 validity test: a
    // UTF-16 file is rarely valid UTF-8, but the BOM is authoritative.
    if bytes.starts_with(UTF16_LE_BOM) {
        let (text, _, _) = UTF_16LE.decode(bytes);
        return text.into_owned();
    }
    if bytes.starts_with(UTF16_BE_BOM) {
        let (text, _, _) = UTF_16BE.decode(bytes);
        return text.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8_passes_through() {
        assert_eq!(decode_text("héllo wörld".as_bytes()), "héllo wörld");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"hello");
        assert_eq!(decode_text(&bytes), "hello");
    }

    #[test]
    fn utf16_le_with_bom_decodes() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_text(&bytes), "hi");
    }

    #[test]
    fn latin1_is_detected() {
        // "café" in ISO-8859-1: the é is a lone 0xE9 byte, invalid UTF-8.
        let bytes = [b'c', b'a', b'f', 0xE9, b' ', b'a', b'u', b' ', b'l', b'a', b'i', b't'];
        assert_eq!(decode_text(&bytes), "café au lait");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(decode_text(&[]), "");
    }
}
