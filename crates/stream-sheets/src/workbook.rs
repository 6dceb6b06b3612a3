//! Format-agnostic workbook, sheet and row types

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use stream_sheets_core::{ReaderOptions, Row, SheetDescriptor};
use stream_sheets_ods::OdsReader;
use stream_sheets_xlsx::XlsxReader;

use crate::error::{Error, Result};

/// Spreadsheet formats that can be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// OpenDocument spreadsheet (`.ods`)
    Ods,
    /// Office Open XML workbook (`.xlsx`, `.xlsm`)
    Xlsx,
}

impl Format {
    /// Format of a file extension, ignoring case
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ods" => Some(Format::Ods),
            "xlsx" | "xlsm" => Some(Format::Xlsx),
            _ => None,
        }
    }

    /// Format of a file, from its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// An open spreadsheet of any supported format
pub enum Workbook {
    /// An ODS document
    Ods(OdsReader),
    /// An XLSX workbook
    Xlsx(XlsxReader),
}

impl Workbook {
    /// Open a spreadsheet, picking the reader from the file extension
    pub fn open<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path);
        log::debug!("Opening {} as {:?}", path.display(), format);
        match format {
            Some(Format::Ods) => Ok(Workbook::Ods(OdsReader::open(path, options)?)),
            Some(Format::Xlsx) => Ok(Workbook::Xlsx(XlsxReader::open(path, options)?)),
            None => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Format of the open file
    pub fn format(&self) -> Format {
        match self {
            Workbook::Ods(_) => Format::Ods,
            Workbook::Xlsx(_) => Format::Xlsx,
        }
    }

    /// Options the workbook was opened with
    pub fn options(&self) -> &ReaderOptions {
        match self {
            Workbook::Ods(reader) => reader.options(),
            Workbook::Xlsx(reader) => reader.options(),
        }
    }

    /// Start iterating over the sheets, from the first one
    pub fn sheets(&mut self) -> Result<Sheets<'_>> {
        match self {
            Workbook::Ods(reader) => Ok(Sheets::Ods(Box::new(reader.sheets()?))),
            Workbook::Xlsx(reader) => Ok(Sheets::Xlsx(reader.sheets())),
        }
    }

    /// Descriptors of every sheet, without reading any row
    pub fn sheet_descriptors(&mut self) -> Result<Vec<SheetDescriptor>> {
        let mut sheets = self.sheets()?;
        let mut descriptors = Vec::new();
        while let Some(sheet) = sheets.next_sheet()? {
            descriptors.push(sheet.descriptor().clone());
        }
        Ok(descriptors)
    }

    /// Close the file and release temporary files
    pub fn close(self) {
        match self {
            Workbook::Ods(reader) => reader.close(),
            Workbook::Xlsx(reader) => reader.close(),
        }
    }
}

/// Iterator over the sheets of a [`Workbook`]
pub enum Sheets<'w> {
    /// Sheets of an ODS document
    Ods(Box<stream_sheets_ods::SheetIterator<'w>>),
    /// Sheets of an XLSX workbook
    Xlsx(stream_sheets_xlsx::SheetIterator<'w, BufReader<File>>),
}

impl<'w> Sheets<'w> {
    /// Move to the next sheet. Returns `None` once every sheet was seen.
    pub fn next_sheet(&mut self) -> Result<Option<Sheet<'_>>> {
        let sheet = match self {
            Sheets::Ods(sheets) => sheets.next_sheet()?.map(|sheet| {
                let descriptor = sheet.descriptor().clone();
                Sheet::new(descriptor, Rows::new(sheet.into_rows()))
            }),
            Sheets::Xlsx(sheets) => sheets.next_sheet()?.map(|sheet| {
                let descriptor = sheet.descriptor().clone();
                Sheet::new(descriptor, Rows::new(sheet.into_rows()))
            }),
        };
        Ok(sheet)
    }

    /// Stop iterating. Safe to call more than once.
    pub fn close(&mut self) {
        match self {
            Sheets::Ods(sheets) => sheets.close(),
            Sheets::Xlsx(sheets) => sheets.close(),
        }
    }
}

/// One sheet: its descriptor and its rows
pub struct Sheet<'s> {
    descriptor: SheetDescriptor,
    rows: Rows<'s>,
}

impl<'s> Sheet<'s> {
    fn new(descriptor: SheetDescriptor, rows: Rows<'s>) -> Self {
        Self { descriptor, rows }
    }

    /// Metadata of the sheet
    pub fn descriptor(&self) -> &SheetDescriptor {
        &self.descriptor
    }

    /// Name of the sheet
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Rows of the sheet, read on demand
    pub fn rows(&mut self) -> &mut Rows<'s> {
        &mut self.rows
    }

    /// Consume the sheet, keeping only its rows
    pub fn into_rows(self) -> Rows<'s> {
        self.rows
    }
}

/// Rows of a [`Sheet`], whatever its format
pub struct Rows<'r> {
    inner: Box<dyn Iterator<Item = Result<Row>> + 'r>,
}

impl<'r> Rows<'r> {
    fn new<I, E>(rows: I) -> Self
    where
        I: Iterator<Item = std::result::Result<Row, E>> + 'r,
        E: Into<Error> + 'r,
    {
        Self {
            inner: Box::new(rows.map(|row| row.map_err(Into::into))),
        }
    }
}

impl Iterator for Rows<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
