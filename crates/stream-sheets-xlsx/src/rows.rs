//! Row iteration within one worksheet part

use stream_sheets_core::{CellAddress, CellValue, Row, XmlCursor, XmlElement, MAX_ROWS};

use crate::cell::XlsxCellDecoder;
use crate::error::{XlsxError, XlsxResult};

const XML_NODE_SHEET_DATA: &str = "sheetData";
const XML_NODE_ROW: &str = "row";
const XML_NODE_CELL: &str = "c";
const XML_ATTRIBUTE_REFERENCE: &str = "r";

/// Iterates over the rows of one worksheet.
///
/// Rows and cells missing from the file are gaps: gaps between cells are
/// filled with [`CellValue::Empty`], and gaps between rows are only yielded
/// (as empty rows) when `preserve_empty_rows` is set.
pub struct RowIterator<'s> {
    cursor: Option<XmlCursor<'s>>,
    /// Worksheet file name, for error messages
    entry: String,
    decoder: XlsxCellDecoder<'s>,
    preserve_empty_rows: bool,
    started: bool,
    /// Index the next `<row>` gets when it has no `r` attribute
    next_index: usize,
    /// Missing rows to yield before `pending`
    gap_start: usize,
    gap_end: usize,
    pending: Option<Row>,
}

impl<'s> RowIterator<'s> {
    pub(crate) fn new(
        cursor: Option<XmlCursor<'s>>,
        entry: &str,
        decoder: XlsxCellDecoder<'s>,
        preserve_empty_rows: bool,
    ) -> Self {
        Self {
            cursor,
            entry: entry.rsplit('/').next().unwrap_or(entry).to_string(),
            decoder,
            preserve_empty_rows,
            started: false,
            next_index: 0,
            gap_start: 0,
            gap_end: 0,
            pending: None,
        }
    }

    /// Release the worksheet entry. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }
        self.pending = None;
        self.gap_start = self.gap_end;
    }

    fn take_buffered(&mut self) -> Option<Row> {
        if self.gap_start < self.gap_end {
            let row = Row::new(self.gap_start, Vec::new());
            self.gap_start += 1;
            return Some(row);
        }
        self.pending.take()
    }

    /// Read the next `<row>` of the sheet.
    ///
    /// Returns `None` once the end of `<sheetData>` is reached.
    fn read_row(&mut self) -> XlsxResult<Option<Row>> {
        let cursor = match self.cursor.as_mut() {
            Some(cursor) => cursor,
            None => return Ok(None),
        };
        let invalid = |e| XlsxError::invalid_xml(self.entry.as_str(), e);

        if !self.started {
            self.started = true;
            if !cursor.advance_until(XML_NODE_SHEET_DATA).map_err(invalid)? {
                return Ok(None);
            }
        }
        if !cursor
            .advance_within(&[XML_NODE_ROW], XML_NODE_SHEET_DATA)
            .map_err(invalid)?
        {
            return Ok(None);
        }

        let index = cursor
            .attribute(XML_ATTRIBUTE_REFERENCE)
            .and_then(|r| r.trim().parse::<usize>().ok())
            .filter(|&r| r > 0)
            .map_or(self.next_index, |r| r - 1);
        if index >= MAX_ROWS as usize {
            log::warn!(
                "Row {} of {} is past the last row a sheet can hold, ignoring the rest",
                index + 1,
                self.entry
            );
            return Ok(None);
        }
        let element = cursor.materialize_subtree().map_err(invalid)?;

        let row = decode_row(&self.decoder, index, &element)?;
        log::trace!("Read row {} of {}", index, self.entry);
        Ok(Some(row))
    }

    fn next_row(&mut self) -> XlsxResult<Option<Row>> {
        loop {
            let row = match self.read_row()? {
                Some(row) => row,
                None => return Ok(None),
            };
            let expected = self.next_index;
            self.next_index = row.index + 1;

            if row.is_empty() && !self.preserve_empty_rows {
                continue;
            }
            if self.preserve_empty_rows && row.index > expected {
                self.gap_start = expected;
                self.gap_end = row.index;
                self.pending = Some(row);
                return Ok(self.take_buffered());
            }
            return Ok(Some(row));
        }
    }
}

/// Decode the cells of one `<row>`.
///
/// Only a missing shared string is fatal; other undecodable values are
/// recorded on the row.
fn decode_row(
    decoder: &XlsxCellDecoder<'_>,
    index: usize,
    element: &XmlElement,
) -> XlsxResult<Row> {
    let mut row = Row::new(index, Vec::new());
    let mut column = 0usize;

    for cell in element.children_named(XML_NODE_CELL) {
        if let Some(address) = cell
            .attribute(XML_ATTRIBUTE_REFERENCE)
            .and_then(|r| CellAddress::parse(r).ok())
        {
            column = address.col as usize;
        }
        let decoded = match decoder.decode(cell) {
            Ok(CellValue::Empty) => None,
            Ok(value) => Some(Ok(value)),
            Err(XlsxError::InvalidValue(e)) => Some(Err(e)),
            Err(e) => return Err(e),
        };
        if let Some(decoded) = decoded {
            row.push_decoded(column, decoded);
        }
        column += 1;
    }
    Ok(row)
}

impl Iterator for RowIterator<'_> {
    type Item = XlsxResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.take_buffered() {
            return Some(Ok(row));
        }
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.close();
                None
            }
            Err(e) => {
                self.close();
                Some(Err(e))
            }
        }
    }
}

impl Drop for RowIterator<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stream_sheets_core::Number;

    use crate::shared_strings::SharedStringsManager;
    use crate::styles::StyleTable;

    const SHEET: &str = r#"<worksheet>
        <sheetViews><sheetView workbookViewId="0"/></sheetViews>
        <sheetData>
            <row r="1"><c r="A1"><v>1</v></c><c r="C1" t="inlineStr"><is><t>x</t></is></c></row>
            <row r="2"><c r="A2"/></row>
            <row r="5"><c r="B5" t="b"><v>1</v></c></row>
            <row><c><v>6</v></c><c><v>7</v></c></row>
        </sheetData>
        <mergeCells count="0"/>
    </worksheet>"#;

    fn rows(xml: &'static str, preserve_empty_rows: bool) -> Vec<Row> {
        let shared_strings = SharedStringsManager::empty();
        let styles = StyleTable::default();
        let decoder = XlsxCellDecoder::new(&shared_strings, &styles, false, false);
        let cursor = XmlCursor::new("xl/worksheets/sheet1.xml", Box::new(xml.as_bytes()));
        RowIterator::new(Some(cursor), "xl/worksheets/sheet1.xml", decoder, preserve_empty_rows)
            .collect::<XlsxResult<Vec<_>>>()
            .unwrap()
    }

    fn int(i: i64) -> CellValue {
        CellValue::Number(Number::Int(i))
    }

    #[test]
    fn test_rows_and_column_gaps() {
        assert_eq!(
            rows(SHEET, false),
            vec![
                Row::new(0, vec![int(1), CellValue::Empty, CellValue::text("x")]),
                Row::new(4, vec![CellValue::Empty, CellValue::Boolean(true)]),
                Row::new(5, vec![int(6), int(7)]),
            ]
        );
    }

    #[test]
    fn test_preserved_empty_rows() {
        let indexes: Vec<usize> = rows(SHEET, true).iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_rows_past_the_sheet_limit_end_the_sheet() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1"><v>1</v></c></row>
            <row r="1048576"><c r="A1048576"><v>2</v></c></row>
            <row r="1048576000"><c r="A1"><v>3</v></c></row>
            <row><c r="A1"><v>4</v></c></row>
        </sheetData></worksheet>"#;
        let found = rows(xml, false);
        assert_eq!(
            found,
            vec![Row::new(0, vec![int(1)]), Row::new(1_048_575, vec![int(2)])]
        );

        let preserved = rows(xml, true);
        assert_eq!(preserved.len(), 1_048_576);
        assert_eq!(preserved[1_048_575], Row::new(1_048_575, vec![int(2)]));
    }

    #[test]
    fn test_missing_sheet_data() {
        assert_eq!(rows("<worksheet/>", false), Vec::<Row>::new());
        assert_eq!(rows("<worksheet><sheetData/></worksheet>", true), Vec::<Row>::new());
    }

    #[test]
    fn test_missing_worksheet_part() {
        let shared_strings = SharedStringsManager::empty();
        let styles = StyleTable::default();
        let decoder = XlsxCellDecoder::new(&shared_strings, &styles, false, false);
        let mut iter = RowIterator::new(None, "xl/worksheets/sheet9.xml", decoder, false);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_invalid_cell_is_recorded() {
        let found = rows(
            r#"<worksheet><sheetData>
                <row r="1"><c r="A1"><v>oops</v></c><c r="B1"><v>2</v></c></row>
            </sheetData></worksheet>"#,
            false,
        );
        assert_eq!(found[0].cells, vec![CellValue::Empty, int(2)]);
        assert_eq!(found[0].invalid[0].column, 0);
        assert_eq!(found[0].invalid[0].error.invalid_value(), "oops");
    }

    #[test]
    fn test_missing_shared_string_stops_iteration() {
        let shared_strings = SharedStringsManager::empty();
        let styles = StyleTable::default();
        let decoder = XlsxCellDecoder::new(&shared_strings, &styles, false, false);
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c></row>
            <row r="2"><c r="A2"><v>1</v></c></row>
        </sheetData></worksheet>"#;
        let cursor = XmlCursor::new("sheet1.xml", Box::new(xml.as_bytes()));
        let mut iter = RowIterator::new(Some(cursor), "sheet1.xml", decoder, false);

        assert!(matches!(
            iter.next(),
            Some(Err(XlsxError::SharedStringNotFound { index: 0, count: 0 }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_malformed_xml_names_the_entry() {
        let shared_strings = SharedStringsManager::empty();
        let styles = StyleTable::default();
        let decoder = XlsxCellDecoder::new(&shared_strings, &styles, false, false);
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1</v></x></row>"#;
        let cursor = XmlCursor::new("xl/worksheets/sheet1.xml", Box::new(xml.as_bytes()));
        let mut iter = RowIterator::new(Some(cursor), "xl/worksheets/sheet1.xml", decoder, false);

        match iter.next() {
            Some(Err(XlsxError::InvalidXml { entry, .. })) => assert_eq!(entry, "sheet1.xml"),
            other => panic!("unexpected result: {:?}", other.map(|r| r.map(|row| row.index))),
        }
    }
}
