//! Errors of the format-agnostic API

use stream_sheets_ods::OdsError;
use stream_sheets_xlsx::XlsxError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading any supported spreadsheet
#[derive(Debug, Error)]
pub enum Error {
    /// Error reading an ODS file
    #[error(transparent)]
    Ods(#[from] OdsError),

    /// Error reading an XLSX file
    #[error(transparent)]
    Xlsx(#[from] XlsxError),

    /// Error shared by every format
    #[error(transparent)]
    Core(#[from] stream_sheets_core::Error),

    /// The file extension does not name a supported format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}
