//! Cell value decoding for `<c>` elements of a worksheet

use chrono::{Duration, NaiveDate, NaiveDateTime};
use stream_sheets_core::datetime::parse_iso_datetime;
use stream_sheets_core::{CellValue, Escaper, InvalidValueError, Number, XlsxEscaper, XmlElement};

use crate::date_format::format_excel_date;
use crate::error::{XlsxError, XlsxResult};
use crate::shared_strings::{shared_string_value, SharedStringsManager};
use crate::styles::StyleTable;

/// Definition of all possible cell types
const CELL_TYPE_INLINE_STRING: &str = "inlineStr";
const CELL_TYPE_SHARED_STRING: &str = "s";
const CELL_TYPE_FORMULA_STRING: &str = "str";
const CELL_TYPE_BOOLEAN: &str = "b";
const CELL_TYPE_DATE: &str = "d";
const CELL_TYPE_ERROR: &str = "e";
const CELL_TYPE_NUMERIC: &str = "n";

/// Definition of XML nodes names used to parse data
const XML_NODE_VALUE: &str = "v";
const XML_NODE_INLINE_STRING: &str = "is";

/// Definition of XML attributes used to parse data
const XML_ATTRIBUTE_TYPE: &str = "t";
const XML_ATTRIBUTE_STYLE: &str = "s";

/// Smallest serial Excel can display as a date (0001-01-01)
pub const MIN_DATE_SERIAL: f64 = -693_593.0;
/// Largest serial Excel can display as a date (9999-12-31)
pub const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// Used when a date style has no format code to render with
const FALLBACK_DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Turns one materialized XLSX cell into a [`CellValue`].
///
/// Borrows the shared strings and styles of the workbook the cell belongs to.
#[derive(Debug, Clone, Copy)]
pub struct XlsxCellDecoder<'w> {
    shared_strings: &'w SharedStringsManager,
    styles: &'w StyleTable,
    date1904: bool,
    format_dates: bool,
    escaper: XlsxEscaper,
}

impl<'w> XlsxCellDecoder<'w> {
    /// Create a decoder for the cells of one workbook
    pub fn new(
        shared_strings: &'w SharedStringsManager,
        styles: &'w StyleTable,
        date1904: bool,
        format_dates: bool,
    ) -> Self {
        Self {
            shared_strings,
            styles,
            date1904,
            format_dates,
            escaper: XlsxEscaper,
        }
    }

    /// Decode the value of a cell, dispatching on its `t` attribute.
    ///
    /// A value that does not parse as its declared type fails with
    /// [`XlsxError::InvalidValue`]; a missing shared string fails with
    /// [`XlsxError::SharedStringNotFound`].
    pub fn decode(&self, cell: &XmlElement) -> XlsxResult<CellValue> {
        let cell_type = cell.attribute(XML_ATTRIBUTE_TYPE).unwrap_or(CELL_TYPE_NUMERIC);
        if cell_type == CELL_TYPE_INLINE_STRING {
            return Ok(self.decode_inline_string(cell));
        }

        let value = match cell.first_child(XML_NODE_VALUE) {
            Some(v) => v.text_content(),
            None => return Ok(CellValue::Empty),
        };

        match cell_type {
            CELL_TYPE_SHARED_STRING => self.decode_shared_string(&value),
            CELL_TYPE_FORMULA_STRING => Ok(CellValue::Text(self.unescape(&value))),
            CELL_TYPE_BOOLEAN => Ok(decode_boolean(&value)),
            CELL_TYPE_DATE => self.decode_iso_date(value),
            CELL_TYPE_ERROR => Ok(CellValue::Text(value)),
            CELL_TYPE_NUMERIC => self.decode_number(cell, &value),
            _ => Ok(CellValue::Empty),
        }
    }

    fn unescape(&self, text: &str) -> String {
        self.escaper.unescape(text).into_owned()
    }

    fn decode_inline_string(&self, cell: &XmlElement) -> CellValue {
        match cell.first_child(XML_NODE_INLINE_STRING) {
            Some(item) => CellValue::Text(self.unescape(&shared_string_value(item))),
            None => CellValue::Empty,
        }
    }

    fn decode_shared_string(&self, value: &str) -> XlsxResult<CellValue> {
        let index = value
            .trim()
            .parse::<i64>()
            .map_err(|_| InvalidValueError::new(value, "shared string index"))?;
        let index = usize::try_from(index).map_err(|_| XlsxError::SharedStringNotFound {
            index,
            count: self.shared_strings.len(),
        })?;
        let text = self.shared_strings.get(index)?;
        Ok(CellValue::Text(self.unescape(&text)))
    }

    fn decode_iso_date(&self, value: String) -> XlsxResult<CellValue> {
        if self.format_dates {
            return Ok(CellValue::Text(value));
        }
        parse_iso_datetime(&value)
            .map(CellValue::Date)
            .ok_or_else(|| InvalidValueError::new(value, "date").into())
    }

    fn decode_number(&self, cell: &XmlElement, value: &str) -> XlsxResult<CellValue> {
        let number =
            Number::parse(value).ok_or_else(|| InvalidValueError::new(value, "number"))?;

        let style = cell
            .attribute(XML_ATTRIBUTE_STYLE)
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if !self.styles.is_date_style(style) {
            return Ok(CellValue::Number(number));
        }

        let serial = number.as_f64();
        let date = serial_to_datetime(serial, self.date1904)
            .ok_or_else(|| InvalidValueError::new(value, "date"))?;
        if self.format_dates {
            let code = self.styles.format_code(style).unwrap_or(FALLBACK_DATE_FORMAT);
            return Ok(CellValue::Text(format_excel_date(code, &date, serial)));
        }
        Ok(CellValue::Date(date))
    }
}

fn decode_boolean(value: &str) -> CellValue {
    let value = value.trim();
    CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true"))
}

/// Convert an Excel serial date to a date-time.
///
/// The 1900 system counts days from 1899-12-30, the 1904 system from
/// 1904-01-01. Fractions are rounded to the nearest second. Serials Excel
/// cannot display as dates yield `None`.
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !(MIN_DATE_SERIAL..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let seconds = (serial * 86_400.0).round() as i64;
    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}
