//! Text helpers shared by the outline and header models.

use std::borrow::Cow;

/// Collapse every run of whitespace to a single space and trim both ends.
///
/// ```
/// use fb2outline::util::simplified;
///
/// assert_eq!(simplified("  Part\n\tOne  "), "Part One");
/// ```
pub fn simplified(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Decode document bytes to a string.
///
/// 1. UTF-8 (a BOM is handled by encoding_rs)
/// 2. The hint encoding, usually from an `<?xml encoding="..."?>` declaration
/// 3. Windows-1252, common in old FictionBook files
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding name from an XML declaration in the first 100 bytes.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = after_enc[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&after_enc[1..value_end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplified() {
        assert_eq!(simplified(""), "");
        assert_eq!(simplified(" \n "), "");
        assert_eq!(simplified("a  b\u{a0}c"), "a b c");
    }

    #[test]
    fn test_decode_text_fallbacks() {
        assert_eq!(decode_text("Привет".as_bytes(), None), "Привет");
        // "Привет" in windows-1251
        let cp1251 = [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        assert_eq!(decode_text(&cp1251, Some("windows-1251")), "Привет");
        assert_eq!(decode_text(&[0x93, 0x94], None), "\u{201c}\u{201d}");
    }

    #[test]
    fn test_extract_xml_encoding() {
        let bytes = br#"<?xml version="1.0" encoding="windows-1251"?><FictionBook/>"#;
        assert_eq!(extract_xml_encoding(bytes), Some("windows-1251"));
        assert_eq!(extract_xml_encoding(b"<html></html>"), None);
        assert_eq!(extract_xml_encoding(b"<?xml version='1.0' encoding='utf-8'?>"), Some("utf-8"));
    }
}
