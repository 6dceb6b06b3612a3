//! Error types for stream-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stream-sheets-core
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed XML
    #[error("XML error: {0}")]
    Xml(#[from] XmlProcessingError),

    /// Archive entry that must exist is missing
    #[error("Could not open \"{0}\"")]
    MissingEntry(String),

    /// A single cell value could not be decoded
    #[error(transparent)]
    InvalidValue(#[from] InvalidValueError),

    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}

/// Malformed XML found while pulling nodes from an archive entry.
///
/// Format readers wrap this into an error naming the failing entry before it
/// reaches the caller.
#[derive(Debug, Error)]
pub enum XmlProcessingError {
    /// Diagnostic from the underlying pull parser
    #[error("{0}")]
    Parser(#[from] quick_xml::Error),

    /// Malformed attribute list
    #[error("invalid attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The stream ended inside an element being materialized
    #[error("unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    /// The cursor is not positioned on an unread element
    #[error("cursor is not positioned on an element")]
    NotPositioned,
}

/// The raw value of one cell cannot be parsed as its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {expected} value: \"{raw}\"")]
pub struct InvalidValueError {
    raw: String,
    expected: &'static str,
}

impl InvalidValueError {
    /// Create a new error for the given raw value and expected type name
    pub fn new<S: Into<String>>(raw: S, expected: &'static str) -> Self {
        Self {
            raw: raw.into(),
            expected,
        }
    }

    /// The offending raw value, exactly as found in the file
    pub fn invalid_value(&self) -> &str {
        &self.raw
    }

    /// Name of the type the value was declared as
    pub fn expected(&self) -> &'static str {
        self.expected
    }
}
