//! XLSX error types

use stream_sheets_core::{InvalidValueError, XmlProcessingError};
use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while reading an XLSX file
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// An entry contains malformed XML
    #[error("The {entry} file is invalid and cannot be read. [{source}]")]
    InvalidXml {
        entry: String,
        #[source]
        source: XmlProcessingError,
    },

    /// A cell value could not be decoded
    #[error(transparent)]
    InvalidValue(#[from] InvalidValueError),

    /// A cell references a shared string that does not exist.
    ///
    /// `index` is signed so that negative references in the sheet are reported as written.
    #[error("Shared string at index {index} not found (the table holds {count} strings)")]
    SharedStringNotFound { index: i64, count: usize },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] stream_sheets_core::Error),
}

impl XlsxError {
    /// Wrap a parser failure with the name of the entry it happened in
    pub fn invalid_xml<S: Into<String>>(entry: S, source: XmlProcessingError) -> Self {
        XlsxError::InvalidXml {
            entry: entry.into(),
            source,
        }
    }
}
