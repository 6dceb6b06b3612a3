//! Cell value decoding for `table:table-cell` elements

use stream_sheets_core::datetime::{parse_iso_datetime, parse_iso_duration};
use stream_sheets_core::{
    CellValue, Escaper, InvalidValueError, Number, OdsEscaper, XmlElement, XmlNode,
};

/// Definition of all possible cell types
const CELL_TYPE_STRING: &str = "string";
const CELL_TYPE_FLOAT: &str = "float";
const CELL_TYPE_BOOLEAN: &str = "boolean";
const CELL_TYPE_DATE: &str = "date";
const CELL_TYPE_TIME: &str = "time";
const CELL_TYPE_CURRENCY: &str = "currency";
const CELL_TYPE_PERCENTAGE: &str = "percentage";

/// Definition of XML nodes names used to parse data
const XML_NODE_P: &str = "text:p";
const XML_NODE_S: &str = "text:s";
const XML_NODE_A: &str = "text:a";
const XML_NODE_SPAN: &str = "text:span";
const XML_NODE_TAB: &str = "text:tab";
const XML_NODE_LINE_BREAK: &str = "text:line-break";

/// Definition of XML attributes used to parse data
const XML_ATTRIBUTE_TYPE: &str = "office:value-type";
const XML_ATTRIBUTE_VALUE: &str = "office:value";
const XML_ATTRIBUTE_BOOLEAN_VALUE: &str = "office:boolean-value";
const XML_ATTRIBUTE_DATE_VALUE: &str = "office:date-value";
const XML_ATTRIBUTE_TIME_VALUE: &str = "office:time-value";
const XML_ATTRIBUTE_CURRENCY: &str = "office:currency";
const XML_ATTRIBUTE_C: &str = "text:c";

/// Longest run of spaces a single `text:s` expands to (the cell text limit)
const MAX_SPACES: usize = 32_767;

/// Turns one materialized ODS cell into a [`CellValue`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CellValueDecoder {
    format_dates: bool,
    escaper: OdsEscaper,
}

impl CellValueDecoder {
    /// Create a decoder.
    ///
    /// With `format_dates`, date and time cells yield the text LibreOffice
    /// displays instead of typed values.
    pub fn new(format_dates: bool) -> Self {
        Self {
            format_dates,
            escaper: OdsEscaper,
        }
    }

    /// Decode the value of a cell, dispatching on its declared value type
    pub fn decode(&self, node: &XmlElement) -> Result<CellValue, InvalidValueError> {
        match node.attribute(XML_ATTRIBUTE_TYPE).unwrap_or_default() {
            CELL_TYPE_STRING => Ok(self.decode_string(node)),
            CELL_TYPE_FLOAT => decode_number(node, "float").map(CellValue::Number),
            CELL_TYPE_BOOLEAN => Ok(decode_boolean(node)),
            CELL_TYPE_DATE => self.decode_date(node),
            CELL_TYPE_TIME => self.decode_time(node),
            CELL_TYPE_CURRENCY => Ok(decode_currency(node)),
            CELL_TYPE_PERCENTAGE => {
                decode_number(node, "percentage").map(CellValue::PercentageNumber)
            }
            _ => Ok(CellValue::Empty),
        }
    }

    fn decode_string(&self, node: &XmlElement) -> CellValue {
        let paragraphs: Vec<String> = node
            .children_named(XML_NODE_P)
            .map(|p| {
                let mut text = String::new();
                extract_text(p, &mut text);
                text
            })
            .collect();
        let joined = paragraphs.join("\n");
        CellValue::Text(self.escaper.unescape(&joined).into_owned())
    }

    fn decode_date(&self, node: &XmlElement) -> Result<CellValue, InvalidValueError> {
        if self.format_dates {
            return Ok(displayed_text(node));
        }
        let raw = node.attribute(XML_ATTRIBUTE_DATE_VALUE).unwrap_or_default();
        parse_iso_datetime(raw)
            .map(CellValue::Date)
            .ok_or_else(|| InvalidValueError::new(raw, "date"))
    }

    fn decode_time(&self, node: &XmlElement) -> Result<CellValue, InvalidValueError> {
        if self.format_dates {
            return Ok(displayed_text(node));
        }
        let raw = node.attribute(XML_ATTRIBUTE_TIME_VALUE).unwrap_or_default();
        parse_iso_duration(raw)
            .map(CellValue::Duration)
            .ok_or_else(|| InvalidValueError::new(raw, "time"))
    }
}

fn decode_number(node: &XmlElement, expected: &'static str) -> Result<Number, InvalidValueError> {
    let raw = node.attribute(XML_ATTRIBUTE_VALUE).unwrap_or_default();
    Number::parse(raw).ok_or_else(|| InvalidValueError::new(raw, expected))
}

fn decode_boolean(node: &XmlElement) -> CellValue {
    CellValue::Boolean(node.attribute(XML_ATTRIBUTE_BOOLEAN_VALUE) == Some("true"))
}

fn decode_currency(node: &XmlElement) -> CellValue {
    let value = node.attribute(XML_ATTRIBUTE_VALUE).unwrap_or_default();
    let currency = node.attribute(XML_ATTRIBUTE_CURRENCY).unwrap_or_default();
    CellValue::CurrencyText(format!("{} {}", value, currency))
}

/// Text of the first paragraph, as displayed
fn displayed_text(node: &XmlElement) -> CellValue {
    match node.first_child(XML_NODE_P) {
        Some(p) => CellValue::Text(p.text_content()),
        None => CellValue::Empty,
    }
}

/// Append the text of a paragraph, expanding whitespace markers and
/// descending into links and spans
fn extract_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Text(text) => out.push_str(text),
            XmlNode::Element(e) if e.is(XML_NODE_S) => {
                let count = e
                    .attribute(XML_ATTRIBUTE_C)
                    .and_then(|c| c.trim().parse::<usize>().ok())
                    .unwrap_or(1)
                    .min(MAX_SPACES);
                out.extend(std::iter::repeat(' ').take(count));
            }
            XmlNode::Element(e) if e.is(XML_NODE_TAB) => out.push('\t'),
            XmlNode::Element(e) if e.is(XML_NODE_LINE_BREAK) => out.push('\n'),
            XmlNode::Element(e) if e.is(XML_NODE_A) || e.is(XML_NODE_SPAN) => {
                extract_text(e, out)
            }
            XmlNode::Element(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn cell(attributes: &[(&str, &str)], children: Vec<XmlNode>) -> XmlElement {
        XmlElement {
            name: "table:table-cell".into(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        }
    }

    fn element(name: &str, attributes: &[(&str, &str)], children: Vec<XmlNode>) -> XmlNode {
        XmlNode::Element(XmlElement {
            name: name.into(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        })
    }

    fn text(s: &str) -> XmlNode {
        XmlNode::Text(s.into())
    }

    fn decode(node: &XmlElement) -> Result<CellValue, InvalidValueError> {
        CellValueDecoder::new(false).decode(node)
    }

    #[test]
    fn test_string_with_whitespace_markers() {
        let node = cell(
            &[("office:value-type", "string")],
            vec![element(
                "text:p",
                &[],
                vec![
                    text("a"),
                    element("text:s", &[("text:c", "5")], vec![]),
                    text("b"),
                    element("text:tab", &[], vec![]),
                    text("c"),
                    element("text:s", &[], vec![]),
                    text("d"),
                    element("text:line-break", &[], vec![]),
                    text("e"),
                ],
            )],
        );
        assert_eq!(decode(&node).unwrap(), CellValue::text("a     b\tc d\ne"));
    }

    #[test]
    fn test_huge_space_count_is_capped() {
        let node = cell(
            &[("office:value-type", "string")],
            vec![element(
                "text:p",
                &[],
                vec![
                    text("a"),
                    element("text:s", &[("text:c", "4000000000000")], vec![]),
                    text("b"),
                ],
            )],
        );
        let value = decode(&node).unwrap();
        let text = match value {
            CellValue::Text(text) => text,
            other => panic!("expected text, got {:?}", other),
        };
        assert_eq!(text.len(), MAX_SPACES + 2);
        assert!(text.starts_with("a ") && text.ends_with(" b"));
    }

    #[test]
    fn test_string_recurses_into_links_and_spans() {
        let node = cell(
            &[("office:value-type", "string")],
            vec![
                element(
                    "text:p",
                    &[],
                    vec![
                        text("see "),
                        element(
                            "text:a",
                            &[("xlink:href", "http://example.com")],
                            vec![element("text:span", &[], vec![text("here")])],
                        ),
                        element("text:bookmark", &[], vec![text("ignored")]),
                    ],
                ),
                element("text:p", &[], vec![text("second")]),
                element(
                    "office:annotation",
                    &[],
                    vec![element("text:p", &[], vec![text("comment")])],
                ),
            ],
        );
        assert_eq!(decode(&node).unwrap(), CellValue::text("see here\nsecond"));
    }

    #[test]
    fn test_float() {
        let int = cell(&[("office:value-type", "float"), ("office:value", "42")], vec![]);
        assert_eq!(decode(&int).unwrap(), CellValue::Number(Number::Int(42)));

        let float = cell(&[("office:value-type", "float"), ("office:value", "1.25")], vec![]);
        assert_eq!(decode(&float).unwrap(), CellValue::Number(Number::Float(1.25)));

        let bad = cell(&[("office:value-type", "float"), ("office:value", "abc")], vec![]);
        let err = decode(&bad).unwrap_err();
        assert_eq!(err.invalid_value(), "abc");
    }

    #[test]
    fn test_boolean() {
        let yes = cell(
            &[("office:value-type", "boolean"), ("office:boolean-value", "true")],
            vec![],
        );
        let no = cell(
            &[("office:value-type", "boolean"), ("office:boolean-value", "false")],
            vec![],
        );
        let missing = cell(&[("office:value-type", "boolean")], vec![]);
        assert_eq!(decode(&yes).unwrap(), CellValue::Boolean(true));
        assert_eq!(decode(&no).unwrap(), CellValue::Boolean(false));
        assert_eq!(decode(&missing).unwrap(), CellValue::Boolean(false));
    }

    #[test]
    fn test_date() {
        let node = cell(
            &[
                ("office:value-type", "date"),
                ("office:date-value", "2016-05-19T16:39:00"),
            ],
            vec![element("text:p", &[], vec![text("05/19/2016 16:39")])],
        );
        let expected = NaiveDate::from_ymd_opt(2016, 5, 19)
            .unwrap()
            .and_hms_opt(16, 39, 0)
            .unwrap();
        assert_eq!(decode(&node).unwrap(), CellValue::Date(expected));
        assert_eq!(
            CellValueDecoder::new(true).decode(&node).unwrap(),
            CellValue::text("05/19/2016 16:39")
        );
    }

    #[test]
    fn test_invalid_date_reports_raw_value() {
        let node = cell(
            &[("office:value-type", "date"), ("office:date-value", "not-a-date")],
            vec![],
        );
        let err = decode(&node).unwrap_err();
        assert_eq!(err.invalid_value(), "not-a-date");
        assert_eq!(err.expected(), "date");
    }

    #[test]
    fn test_time() {
        let node = cell(
            &[("office:value-type", "time"), ("office:time-value", "PT13H24M00S")],
            vec![element("text:p", &[], vec![text("01:24:00 PM")])],
        );
        assert_eq!(
            decode(&node).unwrap(),
            CellValue::Duration(Duration::seconds(13 * 3600 + 24 * 60))
        );
        assert_eq!(
            CellValueDecoder::new(true).decode(&node).unwrap(),
            CellValue::text("01:24:00 PM")
        );
    }

    #[test]
    fn test_currency_and_percentage() {
        let currency = cell(
            &[
                ("office:value-type", "currency"),
                ("office:value", "100"),
                ("office:currency", "USD"),
            ],
            vec![],
        );
        assert_eq!(decode(&currency).unwrap(), CellValue::CurrencyText("100 USD".into()));

        let percentage = cell(
            &[("office:value-type", "percentage"), ("office:value", "0.5")],
            vec![],
        );
        assert_eq!(
            decode(&percentage).unwrap(),
            CellValue::PercentageNumber(Number::Float(0.5))
        );
    }

    #[test]
    fn test_void_and_unknown_types_are_empty() {
        let void = cell(&[("office:value-type", "void")], vec![]);
        let unknown = cell(&[("office:value-type", "matrix")], vec![]);
        let untyped = cell(&[], vec![element("text:p", &[], vec![text("x")])]);
        assert_eq!(decode(&void).unwrap(), CellValue::Empty);
        assert_eq!(decode(&unknown).unwrap(), CellValue::Empty);
        assert_eq!(decode(&untyped).unwrap(), CellValue::Empty);
    }
}
