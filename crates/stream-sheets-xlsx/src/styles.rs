//! Number formats of cell styles (`xl/styles.xml`), used to tell dates from numbers

use std::io::{Read, Seek};

use ahash::AHashMap;
use stream_sheets_core::xml::XmlResult;
use stream_sheets_core::{Archive, XmlCursor, XmlElement};

use crate::error::{XlsxError, XlsxResult};

/// Default location of the styles part
pub const DEFAULT_STYLES_PATH: &str = "xl/styles.xml";

const XML_NODE_NUM_FMTS: &str = "numFmts";
const XML_NODE_NUM_FMT: &str = "numFmt";
const XML_NODE_CELL_XFS: &str = "cellXfs";
const XML_NODE_XF: &str = "xf";
const XML_ATTRIBUTE_NUM_FMT_ID: &str = "numFmtId";
const XML_ATTRIBUTE_FORMAT_CODE: &str = "formatCode";
const XML_ATTRIBUTE_APPLY_NUMBER_FORMAT: &str = "applyNumberFormat";

/// Number format of every cell style (`cellXfs`) of a workbook
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    /// Number format id applied by each style, by style index
    num_fmt_ids: Vec<Option<u32>>,
    /// Custom format codes by number format id
    custom_formats: AHashMap<u32, String>,
}

impl StyleTable {
    /// Read the styles part. A workbook without one only uses the default style.
    pub fn read<R: Read + Seek>(archive: &mut Archive<R>, path: &str) -> XlsxResult<Self> {
        let mut cursor = match archive.cursor(path)? {
            Some(cursor) => cursor,
            None => return Ok(Self::default()),
        };
        let table = Self::from_cursor(&mut cursor)
            .map_err(|e| XlsxError::invalid_xml("styles.xml", e))?;
        cursor.close();
        log::debug!("Read {} cell styles", table.num_fmt_ids.len());
        Ok(table)
    }

    /// Read the `numFmts` and `cellXfs` blocks of a styles part
    pub fn from_cursor(cursor: &mut XmlCursor<'_>) -> XmlResult<Self> {
        let mut table = Self::default();
        let blocks = [XML_NODE_NUM_FMTS, XML_NODE_CELL_XFS];
        while let Some(found) = cursor.advance_until_any(&blocks)? {
            let block = cursor.materialize_subtree()?;
            if found == 0 {
                table.read_num_fmts(&block);
            } else {
                table.read_cell_xfs(&block);
            }
        }
        Ok(table)
    }

    fn read_num_fmts(&mut self, block: &XmlElement) {
        for num_fmt in block.children_named(XML_NODE_NUM_FMT) {
            let id = num_fmt
                .attribute(XML_ATTRIBUTE_NUM_FMT_ID)
                .and_then(|id| id.trim().parse().ok());
            if let (Some(id), Some(code)) = (id, num_fmt.attribute(XML_ATTRIBUTE_FORMAT_CODE)) {
                self.custom_formats.insert(id, code.to_string());
            }
        }
    }

    fn read_cell_xfs(&mut self, block: &XmlElement) {
        self.num_fmt_ids = block
            .children_named(XML_NODE_XF)
            .map(|xf| {
                if xf.attribute(XML_ATTRIBUTE_APPLY_NUMBER_FORMAT) == Some("0") {
                    return None;
                }
                xf.attribute(XML_ATTRIBUTE_NUM_FMT_ID)
                    .and_then(|id| id.trim().parse().ok())
            })
            .collect();
    }

    /// Number of cell styles
    pub fn len(&self) -> usize {
        self.num_fmt_ids.len()
    }

    /// Check if the workbook declares no cell style
    pub fn is_empty(&self) -> bool {
        self.num_fmt_ids.is_empty()
    }

    /// Format code applied by the style at `style_index`
    pub fn format_code(&self, style_index: usize) -> Option<&str> {
        let id = (*self.num_fmt_ids.get(style_index)?)?;
        match self.custom_formats.get(&id) {
            Some(code) => Some(code.as_str()),
            None => builtin_format_code(id),
        }
    }

    /// Whether the style at `style_index` displays numbers as dates or times.
    ///
    /// The default style (0) never does.
    pub fn is_date_style(&self, style_index: usize) -> bool {
        if style_index == 0 {
            return false;
        }
        let id = match self.num_fmt_ids.get(style_index) {
            Some(Some(id)) => *id,
            _ => return false,
        };
        match self.custom_formats.get(&id) {
            Some(code) => is_date_format_code(code),
            None => is_builtin_date_format(id),
        }
    }
}

/// Built-in number formats, which styles reference without declaring them
pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

/// Whether a built-in number format id is a date or time format
pub fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

/// Whether a custom format code displays dates or times.
///
/// Quoted literals, escaped characters and bracketed sections such as colors
/// or locales are ignored, except the elapsed time markers `[h]`, `[m]` and `[s]`.
pub fn is_date_format_code(code: &str) -> bool {
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for quoted in chars.by_ref() {
                    if quoted == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let section: String = chars.by_ref().take_while(|&c| c != ']').collect();
                if is_elapsed_marker(&section) {
                    return true;
                }
            }
            c if matches!(c.to_ascii_lowercase(), 'y' | 'm' | 'd' | 'h' | 's') => return true,
            _ => {}
        }
    }
    false
}

/// `h`, `hh`, `m`, `mm`, `s` or `ss` inside brackets
pub(crate) fn is_elapsed_marker(section: &str) -> bool {
    let mut letters = section.chars().map(|c| c.to_ascii_lowercase());
    match letters.next() {
        Some(first @ ('h' | 'm' | 's')) => letters.all(|c| c == first),
        _ => false,
    }
}
