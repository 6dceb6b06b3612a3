//! Row iteration within one `table:table`

use stream_sheets_core::{CellValue, Row, XmlCursor, XmlElement, MAX_COLS, MAX_ROWS};

use crate::cell::CellValueDecoder;
use crate::error::{OdsError, OdsResult};
use crate::sheet::CONTENT_XML;

const XML_NODE_TABLE: &str = "table:table";
const XML_NODE_ROW: &str = "table:table-row";
const XML_NODE_CELL: &str = "table:table-cell";
const XML_NODE_COVERED_CELL: &str = "table:covered-table-cell";
const XML_ATTRIBUTE_NUMBER_ROWS_REPEATED: &str = "table:number-rows-repeated";
const XML_ATTRIBUTE_NUMBER_COLUMNS_REPEATED: &str = "table:number-columns-repeated";

/// Iterates over the rows of the current sheet.
///
/// Repeated rows and cells are expanded. Empty rows are skipped unless
/// `preserve_empty_rows` is set; even then, the empty rows at the end of a
/// sheet are never yielded, since LibreOffice pads every sheet with them.
pub struct RowIterator<'s, 'a> {
    cursor: &'s mut XmlCursor<'a>,
    decoder: CellValueDecoder,
    preserve_empty_rows: bool,
    /// Index of the next row read from the file
    next_index: usize,
    /// Empty rows seen but not yet known to be followed by data
    pending_empty_start: usize,
    pending_empty_count: usize,
    /// Empty rows confirmed to be yielded
    flush_index: usize,
    flush_count: usize,
    /// Row with data waiting to be yielded, possibly more than once
    repeated: Option<Row>,
    repeat_remaining: usize,
    done: bool,
}

impl<'s, 'a> RowIterator<'s, 'a> {
    pub(crate) fn new(
        cursor: &'s mut XmlCursor<'a>,
        decoder: CellValueDecoder,
        preserve_empty_rows: bool,
    ) -> Self {
        Self {
            cursor,
            decoder,
            preserve_empty_rows,
            next_index: 0,
            pending_empty_start: 0,
            pending_empty_count: 0,
            flush_index: 0,
            flush_count: 0,
            repeated: None,
            repeat_remaining: 0,
            done: false,
        }
    }

    fn take_buffered(&mut self) -> Option<Row> {
        if self.flush_count > 0 {
            let row = Row::new(self.flush_index, Vec::new());
            self.flush_index += 1;
            self.flush_count -= 1;
            return Some(row);
        }

        if self.repeat_remaining > 1 {
            let row = self.repeated.as_mut()?;
            let next = row.clone();
            row.index += 1;
            self.repeat_remaining -= 1;
            return Some(next);
        }
        self.repeat_remaining = 0;
        self.repeated.take()
    }

    /// Read the next `table:table-row` of the sheet.
    ///
    /// Returns `false` once the end of the sheet is reached.
    fn read_row(&mut self) -> OdsResult<bool> {
        let remaining = (MAX_ROWS as usize).saturating_sub(self.next_index);
        if remaining == 0 {
            return Ok(false);
        }
        let found = self
            .cursor
            .advance_within(&[XML_NODE_ROW], XML_NODE_TABLE)
            .map_err(|e| OdsError::invalid_xml(CONTENT_XML, e))?;
        if !found {
            return Ok(false);
        }

        // Repeats never run past the last row a sheet can hold
        let repeat = repeat_count(
            self.cursor
                .attribute(XML_ATTRIBUTE_NUMBER_ROWS_REPEATED)
                .as_deref(),
        )
        .min(remaining);
        let element = self
            .cursor
            .materialize_subtree()
            .map_err(|e| OdsError::invalid_xml(CONTENT_XML, e))?;

        let index = self.next_index;
        self.next_index = self.next_index.saturating_add(repeat);
        let row = self.decode_row(index, &element);

        if row.is_empty() {
            if self.preserve_empty_rows {
                if self.pending_empty_count == 0 {
                    self.pending_empty_start = index;
                }
                self.pending_empty_count = self.pending_empty_count.saturating_add(repeat);
            }
            return Ok(true);
        }

        if self.pending_empty_count > 0 {
            self.flush_index = self.pending_empty_start;
            self.flush_count = self.pending_empty_count;
            self.pending_empty_count = 0;
        }
        log::trace!("Read row {} (repeated {} times)", index, repeat);
        self.repeated = Some(row);
        self.repeat_remaining = repeat;
        Ok(true)
    }

    fn decode_row(&self, index: usize, element: &XmlElement) -> Row {
        let mut row = Row::new(index, Vec::new());
        let mut column = 0usize;

        let cells = element
            .child_elements()
            .filter(|e| e.is(XML_NODE_CELL) || e.is(XML_NODE_COVERED_CELL));
        for cell in cells {
            let repeat = repeat_count(cell.attribute(XML_ATTRIBUTE_NUMBER_COLUMNS_REPEATED));
            let decoded = self.decoder.decode(cell);
            // Empty cells only move the column; trailing ones are never stored
            if decoded != Ok(CellValue::Empty) {
                let end = column.saturating_add(repeat).min(MAX_COLS as usize);
                for target in column..end {
                    row.push_decoded(target, decoded.clone());
                }
            }
            column = column.saturating_add(repeat);
        }
        row
    }
}

impl Iterator for RowIterator<'_, '_> {
    type Item = OdsResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.take_buffered() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            match self.read_row() {
                Ok(true) => {}
                Ok(false) => {
                    // Pending empty rows are the padding at the end of the sheet
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Parse a `number-*-repeated` attribute, defaulting to 1
fn repeat_count(raw: Option<&str>) -> usize {
    raw.and_then(|r| r.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stream_sheets_core::Number;

    fn rows(xml: &'static str, preserve_empty_rows: bool) -> Vec<Row> {
        let mut cursor = XmlCursor::new(CONTENT_XML, Box::new(xml.as_bytes()));
        assert!(cursor.advance_until(XML_NODE_TABLE).unwrap());
        RowIterator::new(&mut cursor, CellValueDecoder::new(false), preserve_empty_rows)
            .collect::<OdsResult<Vec<_>>>()
            .unwrap()
    }

    fn int(i: i64) -> CellValue {
        CellValue::Number(Number::Int(i))
    }

    const SHEET: &str = r#"<table:table table:name="Sheet1">
        <table:table-column table:number-columns-repeated="3"/>
        <table:table-row>
            <table:table-cell office:value-type="float" office:value="1"/>
            <table:table-cell table:number-columns-repeated="2"/>
            <table:table-cell office:value-type="string"><text:p>x</text:p></table:table-cell>
            <table:table-cell table:number-columns-repeated="1020"/>
        </table:table-row>
        <table:table-row table:number-rows-repeated="2">
            <table:table-cell/>
        </table:table-row>
        <table:table-row table:number-rows-repeated="2">
            <table:table-cell office:value-type="float" office:value="2" table:number-columns-repeated="2"/>
        </table:table-row>
        <table:table-row table:number-rows-repeated="1048570">
            <table:table-cell table:number-columns-repeated="1024"/>
        </table:table-row>
    </table:table>
    <table:table table:name="Sheet2">
        <table:table-row><table:table-cell office:value-type="float" office:value="9"/></table:table-row>
    </table:table>"#;

    #[test]
    fn test_repeated_rows_and_cells() {
        let found = rows(SHEET, false);
        assert_eq!(
            found,
            vec![
                Row::new(
                    0,
                    vec![int(1), CellValue::Empty, CellValue::Empty, CellValue::text("x")]
                ),
                Row::new(3, vec![int(2), int(2)]),
                Row::new(4, vec![int(2), int(2)]),
            ]
        );
    }

    #[test]
    fn test_preserved_empty_rows_exclude_padding_tail() {
        let indexes: Vec<usize> = rows(SHEET, true).iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_rows_stay_within_the_sheet() {
        let mut cursor = XmlCursor::new(CONTENT_XML, Box::new(SHEET.as_bytes()));
        assert!(cursor.advance_until(XML_NODE_TABLE).unwrap());
        let first: Vec<Row> = RowIterator::new(&mut cursor, CellValueDecoder::new(false), false)
            .collect::<OdsResult<Vec<_>>>()
            .unwrap();
        assert_eq!(first.len(), 3);

        assert!(cursor.advance_until(XML_NODE_TABLE).unwrap());
        assert_eq!(cursor.attribute("table:name").as_deref(), Some("Sheet2"));
        let second: Vec<Row> = RowIterator::new(&mut cursor, CellValueDecoder::new(false), false)
            .collect::<OdsResult<Vec<_>>>()
            .unwrap();
        assert_eq!(second, vec![Row::new(0, vec![int(9)])]);
    }

    #[test]
    fn test_invalid_cell_does_not_stop_the_row() {
        let found = rows(
            r#"<table:table>
                <table:table-row>
                    <table:table-cell office:value-type="date" office:date-value="not-a-date"/>
                    <table:table-cell office:value-type="boolean" office:boolean-value="true"/>
                </table:table-row>
            </table:table>"#,
            false,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].cells, vec![CellValue::Empty, CellValue::Boolean(true)]);
        assert_eq!(found[0].invalid.len(), 1);
        assert_eq!(found[0].invalid[0].error.invalid_value(), "not-a-date");
    }

    #[test]
    fn test_covered_cells_take_a_column() {
        let found = rows(
            r#"<table:table>
                <table:table-row>
                    <table:table-cell office:value-type="string" table:number-columns-spanned="2"><text:p>a</text:p></table:table-cell>
                    <table:covered-table-cell/>
                    <table:table-cell office:value-type="string"><text:p>b</text:p></table:table-cell>
                </table:table-row>
            </table:table>"#,
            false,
        );
        assert_eq!(
            found[0].cells,
            vec![CellValue::text("a"), CellValue::Empty, CellValue::text("b")]
        );
    }

    #[test]
    fn test_repeat_count() {
        assert_eq!(repeat_count(None), 1);
        assert_eq!(repeat_count(Some("3")), 3);
        assert_eq!(repeat_count(Some(" 4 ")), 4);
        assert_eq!(repeat_count(Some("0")), 1);
        assert_eq!(repeat_count(Some("x")), 1);
    }

    #[test]
    fn test_rows_stop_at_the_sheet_limit() {
        let found = rows(
            r#"<table:table>
                <table:table-row table:number-rows-repeated="1048575">
                    <table:table-cell/>
                </table:table-row>
                <table:table-row table:number-rows-repeated="4000000000">
                    <table:table-cell office:value-type="float" office:value="1"/>
                </table:table-row>
                <table:table-row>
                    <table:table-cell office:value-type="float" office:value="2"/>
                </table:table-row>
            </table:table>"#,
            false,
        );
        assert_eq!(found, vec![Row::new(1_048_575, vec![int(1)])]);
    }

    #[test]
    fn test_preserved_rows_stop_at_the_sheet_limit() {
        let found = rows(
            r#"<table:table>
                <table:table-row table:number-rows-repeated="1048574">
                    <table:table-cell/>
                </table:table-row>
                <table:table-row table:number-rows-repeated="4000000000">
                    <table:table-cell office:value-type="float" office:value="1"/>
                </table:table-row>
            </table:table>"#,
            true,
        );
        assert_eq!(found.len(), 1_048_576);
        assert_eq!(found[1_048_574], Row::new(1_048_574, vec![int(1)]));
        assert_eq!(found[1_048_575], Row::new(1_048_575, vec![int(1)]));
    }
}
