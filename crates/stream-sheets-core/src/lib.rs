//! # stream-sheets-core
//!
//! Core building blocks shared by the stream-sheets format readers.
//!
//! This crate provides:
//! - [`CellValue`] and [`Number`] - Decoded cell values
//! - [`SheetDescriptor`] and [`Row`] - What the sheet and row enumerators yield
//! - [`ReaderOptions`] - Reader configuration
//! - [`xml`] - [`Archive`] and the forward-only [`XmlCursor`] over one zip entry
//! - [`escape`] - Format-specific text escapers
//!
//! ## Example
//!
//! ```rust
//! use stream_sheets_core::{CellValue, Number, Row};
//!
//! let mut row = Row::new(0, Vec::new());
//! row.push_decoded(0, Ok(CellValue::text("Hello")));
//! row.push_decoded(1, Ok(CellValue::Number(Number::Int(7))));
//!
//! assert_eq!(row.cells[1].to_string(), "7");
//! ```

pub mod cell;
pub mod datetime;
pub mod error;
pub mod escape;
pub mod options;
pub mod row;
pub mod sheet;
pub mod xml;

// Re-exports for convenience
pub use cell::{CellAddress, CellValue, Number};
pub use error::{Error, InvalidValueError, Result, XmlProcessingError};
pub use escape::{Escaper, OdsEscaper, XlsxEscaper};
pub use options::ReaderOptions;
pub use row::{InvalidCell, Row};
pub use sheet::SheetDescriptor;
pub use xml::{Archive, XmlCursor, XmlElement, XmlNode};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
