//! Format-specific text escaping.
//!
//! Both formats store text inside XML, so `&`, `<`, `>` and quotes are always
//! entity-escaped. On top of that each format has its own rule for characters
//! that XML 1.0 cannot carry:
//! - ODS replaces them with U+FFFD
//! - XLSX encodes them as `_xHHHH_` sequences (`_x000d_` = CR, `_x005f_` = `_`)
//!
//! Entity decoding happens in the XML layer, so `unescape` only deals with the
//! format-specific part.

use std::borrow::Cow;

/// Escape/unescape pair for one format
pub trait Escaper {
    /// Escape text so it can be written inside an XML text node or attribute
    fn escape(&self, text: &str) -> String;

    /// Undo the format-specific escaping of text already entity-decoded by the XML layer
    fn unescape<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// Escaper for OpenDocument files
#[derive(Debug, Clone, Copy, Default)]
pub struct OdsEscaper;

impl Escaper for OdsEscaper {
    fn escape(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        for c in text.chars() {
            if !push_entity(&mut result, c) {
                if is_xml_char(c) {
                    result.push(c);
                } else {
                    result.push(char::REPLACEMENT_CHARACTER);
                }
            }
        }
        result
    }

    fn unescape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }
}

/// Escaper for Office Open XML files
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxEscaper;

impl Escaper for XlsxEscaper {
    fn escape(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let bytes = text.as_bytes();
        for (i, c) in text.char_indices() {
            // A literal "_xHHHH_" must survive a round trip: escape its underscore
            if c == '_' && is_escape_sequence(&bytes[i..]) {
                result.push_str("_x005F");
                continue;
            }
            if push_entity(&mut result, c) {
                continue;
            }
            if c.is_control() && !matches!(c, '\t' | '\n' | '\r') && (c as u32) < 0x20 {
                result.push_str(&format!("_x{:04X}_", c as u32));
            } else {
                result.push(c);
            }
        }
        result
    }

    fn unescape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.contains("_x") {
            Cow::Owned(decode_excel_escapes(text))
        } else {
            Cow::Borrowed(text)
        }
    }
}

/// Push the entity for an XML special character, returning false for any other character
fn push_entity(out: &mut String, c: char) -> bool {
    let entity = match c {
        '&' => "&amp;",
        '<' => "&lt;",
        '>' => "&gt;",
        '"' => "&quot;",
        '\'' => "&#039;",
        _ => return false,
    };
    out.push_str(entity);
    true
}

/// Characters allowed in an XML 1.0 document
fn is_xml_char(c: char) -> bool {
    matches!(c as u32,
        0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF)
}

/// Check for `_xHHHH_` at the start of `bytes`
fn is_escape_sequence(bytes: &[u8]) -> bool {
    bytes.len() >= 7
        && bytes[0] == b'_'
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
pub fn decode_excel_escapes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut result = String::with_capacity(s.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(offset) = s[pos..].find("_x") {
        let at = pos + offset;
        // Sequences naming no valid character (lone surrogates) stay verbatim
        let decoded = if is_escape_sequence(&bytes[at..]) {
            u32::from_str_radix(&s[at + 2..at + 6], 16)
                .ok()
                .and_then(char::from_u32)
        } else {
            None
        };
        match decoded {
            Some(c) => {
                result.push_str(&s[copied..at]);
                result.push(c);
                pos = at + 7;
                copied = pos;
            }
            None => pos = at + 1,
        }
    }

    result.push_str(&s[copied..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ods_escape() {
        let escaper = OdsEscaper;
        assert_eq!(escaper.escape("test"), "test");
        assert_eq!(
            escaper.escape("carl's \"pokemon\""),
            "carl&#039;s &quot;pokemon&quot;"
        );
        assert_eq!(escaper.escape("\n"), "\n");
        assert_eq!(escaper.escape("\r"), "\r");
        assert_eq!(escaper.escape("\t"), "\t");
        assert_eq!(escaper.escape("\u{0B}"), "\u{FFFD}");
        assert_eq!(escaper.escape("\u{0C}"), "\u{FFFD}");
    }

    #[test]
    fn test_ods_unescape_is_identity() {
        let escaper = OdsEscaper;
        assert_eq!(escaper.unescape("a &amp; b"), "a &amp; b");
        assert!(matches!(escaper.unescape("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_xlsx_escape_control_characters() {
        let escaper = XlsxEscaper;
        assert_eq!(escaper.escape("a\u{0B}b"), "a_x000B_b");
        assert_eq!(escaper.escape("tab\there"), "tab\there");
        assert_eq!(escaper.escape("<b>"), "&lt;b&gt;");
        assert_eq!(escaper.escape("_x0041_"), "_x005F_x0041_");
    }

    #[test]
    fn test_xlsx_unescape_round_trip() {
        let escaper = XlsxEscaper;
        for original in ["a\u{0B}b", "_x0041_", "plain text", "under_score"] {
            let escaped = escaper.escape(original);
            // Entity decoding is the XML layer's job
            let entity_decoded = escaped.replace("&#039;", "'");
            assert_eq!(escaper.unescape(&entity_decoded), original);
        }
    }

    #[test]
    fn test_decode_excel_escapes_carriage_return() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
    }

    #[test]
    fn test_decode_excel_escapes_multiple() {
        assert_eq!(
            decode_excel_escapes("line1_x000d__x000a_line2"),
            "line1\r\nline2"
        );
    }

    #[test]
    fn test_decode_excel_escapes_underscore() {
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        // Incomplete sequences should be left as-is
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000"), "_x000");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("_y"), "_y");
        assert_eq!(decode_excel_escapes("_xg000_"), "_xg000_");
        assert_eq!(decode_excel_escapes("a__x0041_"), "a_A");
    }

    #[test]
    fn test_decode_excel_escapes_keeps_surrogates() {
        assert_eq!(decode_excel_escapes("_xD800_ok_x0041_"), "_xD800_okA");
    }

    #[test]
    fn test_decode_excel_escapes_uppercase() {
        assert_eq!(decode_excel_escapes("_x000D_"), "\r");
        assert_eq!(decode_excel_escapes("_x000A_"), "\n");
    }
}
