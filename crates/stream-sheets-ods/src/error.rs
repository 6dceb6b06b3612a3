//! ODS error types

use stream_sheets_core::{InvalidValueError, XmlProcessingError};
use thiserror::Error;

/// Result type for ODS operations
pub type OdsResult<T> = std::result::Result<T, OdsError>;

/// Errors that can occur while reading an ODS file
#[derive(Debug, Error)]
pub enum OdsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Missing required part
    #[error("Could not open \"{0}\"")]
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

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] stream_sheets_core::Error),
}

impl OdsError {
    /// Wrap a parser failure with the name of the entry it happened in
    pub fn invalid_xml<S: Into<String>>(entry: S, source: XmlProcessingError) -> Self {
        OdsError::InvalidXml {
            entry: entry.into(),
            source,
        }
    }
}
