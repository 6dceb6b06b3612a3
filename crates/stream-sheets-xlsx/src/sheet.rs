//! Sheet enumeration over the workbook's sheet list

use std::io::{Read, Seek};

use stream_sheets_core::{Archive, SheetDescriptor};

use crate::cell::XlsxCellDecoder;
use crate::error::XlsxResult;
use crate::rows::RowIterator;
use crate::workbook::{WorkbookInfo, WORKBOOK_PATH};

/// Iterates over the sheets of an XLSX file, in workbook order.
///
/// Each [`Sheet`] borrows the iterator: its rows must be read before asking
/// for the next sheet.
pub struct SheetIterator<'a, R> {
    archive: &'a mut Archive<R>,
    info: &'a WorkbookInfo,
    decoder: XlsxCellDecoder<'a>,
    preserve_empty_rows: bool,
    next_index: usize,
    exhausted: bool,
}

impl<'a, R: Read + Seek> SheetIterator<'a, R> {
    pub(crate) fn new(
        archive: &'a mut Archive<R>,
        info: &'a WorkbookInfo,
        decoder: XlsxCellDecoder<'a>,
        preserve_empty_rows: bool,
    ) -> Self {
        Self {
            archive,
            info,
            decoder,
            preserve_empty_rows,
            next_index: 0,
            exhausted: false,
        }
    }

    /// Move to the next sheet. Returns `None` once every sheet was seen.
    ///
    /// A sheet whose worksheet part cannot be found has no rows.
    pub fn next_sheet(&mut self) -> XlsxResult<Option<Sheet<'_>>> {
        if self.exhausted {
            return Ok(None);
        }
        let index = self.next_index;
        let descriptor = match self.info.descriptor(index) {
            Some(descriptor) => descriptor,
            None => {
                self.exhausted = true;
                return Ok(None);
            }
        };
        self.next_index += 1;
        log::debug!(
            "Found sheet {} \"{}\" (active: {}, visible: {})",
            descriptor.index,
            descriptor.name,
            descriptor.is_active,
            descriptor.is_visible
        );

        let info = self.info;
        let path = info
            .sheets
            .get(index)
            .and_then(|sheet| sheet.path.as_deref());
        let cursor = match path {
            Some(path) => self.archive.cursor(path)?,
            None => None,
        };
        if cursor.is_none() {
            log::warn!(
                "Worksheet part of sheet \"{}\" is missing, reading it as empty",
                descriptor.name
            );
        }

        Ok(Some(Sheet {
            descriptor,
            rows: RowIterator::new(
                cursor,
                path.unwrap_or(WORKBOOK_PATH),
                self.decoder,
                self.preserve_empty_rows,
            ),
        }))
    }

    /// Stop iterating. Safe to call more than once.
    pub fn close(&mut self) {
        self.exhausted = true;
    }
}

/// One sheet of an XLSX file: its descriptor and a lazy row iterator
pub struct Sheet<'s> {
    descriptor: SheetDescriptor,
    rows: RowIterator<'s>,
}

impl<'s> Sheet<'s> {
    /// Metadata of the sheet
    pub fn descriptor(&self) -> &SheetDescriptor {
        &self.descriptor
    }

    /// Name of the sheet
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Rows of the sheet, read on demand
    pub fn rows(&mut self) -> &mut RowIterator<'s> {
        &mut self.rows
    }

    /// Consume the sheet, keeping only its row iterator
    pub fn into_rows(self) -> RowIterator<'s> {
        self.rows
    }
}
