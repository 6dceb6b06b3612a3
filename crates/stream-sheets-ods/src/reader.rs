//! ODS reader

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use stream_sheets_core::{Archive, ReaderOptions};

use crate::error::{OdsError, OdsResult};
use crate::settings::read_active_sheet_name;
use crate::sheet::{SheetIterator, CONTENT_XML};

/// Streaming ODS file reader
pub struct OdsReader<R = BufReader<File>> {
    archive: Archive<R>,
    options: ReaderOptions,
    active_sheet_name: Option<String>,
}

impl OdsReader<BufReader<File>> {
    /// Open an ODS file
    pub fn open<P: AsRef<Path>>(path: P, options: ReaderOptions) -> OdsResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::debug!("Opening ODS file {}", path.display());
        Self::from_reader(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> OdsReader<R> {
    /// Open an ODS document from any seekable reader
    pub fn from_reader(reader: R, options: ReaderOptions) -> OdsResult<Self> {
        let mut archive = Archive::from_reader(reader)?;
        let active_sheet_name = read_active_sheet_name(&mut archive)?;
        Ok(Self {
            archive,
            options,
            active_sheet_name,
        })
    }

    /// Options the reader was opened with
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Name of the sheet declared active in `settings.xml`, if any
    pub fn active_sheet_name(&self) -> Option<&str> {
        self.active_sheet_name.as_deref()
    }

    /// Start iterating over the sheets of the document.
    ///
    /// Every call starts over from the first sheet.
    pub fn sheets(&mut self) -> OdsResult<SheetIterator<'_>> {
        let cursor = self
            .archive
            .cursor(CONTENT_XML)?
            .ok_or_else(|| OdsError::MissingPart(CONTENT_XML.to_string()))?;
        Ok(SheetIterator::new(
            cursor,
            self.active_sheet_name.clone(),
            &self.options,
        ))
    }

    /// Close the reader and its underlying file
    pub fn close(self) {
        log::debug!("Closed ODS reader");
    }
}
