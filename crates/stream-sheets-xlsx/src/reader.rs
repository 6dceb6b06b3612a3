//! XLSX reader

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use stream_sheets_core::{Archive, ReaderOptions};

use crate::cell::XlsxCellDecoder;
use crate::error::XlsxResult;
use crate::shared_strings::SharedStringsManager;
use crate::sheet::SheetIterator;
use crate::styles::StyleTable;
use crate::workbook::WorkbookInfo;

/// Streaming XLSX file reader.
///
/// Opening a workbook reads its metadata, its styles and its shared strings.
/// Worksheets are only read while iterating over their rows.
pub struct XlsxReader<R = BufReader<File>> {
    archive: Archive<R>,
    info: WorkbookInfo,
    styles: StyleTable,
    shared_strings: SharedStringsManager,
    options: ReaderOptions,
}

impl XlsxReader<BufReader<File>> {
    /// Open an XLSX file
    pub fn open<P: AsRef<Path>>(path: P, options: ReaderOptions) -> XlsxResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::debug!("Opening XLSX file {}", path.display());
        Self::from_reader(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> XlsxReader<R> {
    /// Open an XLSX document from any seekable reader
    pub fn from_reader(reader: R, options: ReaderOptions) -> XlsxResult<Self> {
        let mut archive = Archive::from_reader(reader)?;
        let info = WorkbookInfo::read(&mut archive)?;
        let styles = StyleTable::read(&mut archive, &info.styles_path)?;
        let shared_strings =
            SharedStringsManager::extract(&mut archive, &info.shared_strings_path, &options)?;
        log::debug!(
            "Workbook has {} sheets and {} shared strings ({})",
            info.sheets.len(),
            shared_strings.len(),
            shared_strings.strategy_name()
        );

        Ok(Self {
            archive,
            info,
            styles,
            shared_strings,
            options,
        })
    }

    /// Options the reader was opened with
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Sheet list and settings of the workbook
    pub fn workbook(&self) -> &WorkbookInfo {
        &self.info
    }

    /// Shared strings of the workbook
    pub fn shared_strings(&self) -> &SharedStringsManager {
        &self.shared_strings
    }

    /// Number formats of the workbook's cell styles
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// Start iterating over the sheets of the workbook.
    ///
    /// Every call starts over from the first sheet.
    pub fn sheets(&mut self) -> SheetIterator<'_, R> {
        let decoder = XlsxCellDecoder::new(
            &self.shared_strings,
            &self.styles,
            self.info.date1904,
            self.options.format_dates,
        );
        SheetIterator::new(
            &mut self.archive,
            &self.info,
            decoder,
            self.options.preserve_empty_rows,
        )
    }

    /// Close the reader, removing any temporary file of the shared strings
    pub fn close(mut self) {
        self.shared_strings.dispose();
        log::debug!("Closed XLSX reader");
    }
}
