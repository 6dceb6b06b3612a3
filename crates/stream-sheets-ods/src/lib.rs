//! # stream-sheets-ods
//!
//! Streaming reader for OpenDocument spreadsheets (`.ods`).
//!
//! Sheets are discovered one at a time from `content.xml` and their rows are
//! decoded on demand, so memory use does not grow with the size of a sheet.
//!
//! ```rust,no_run
//! use stream_sheets_core::ReaderOptions;
//! use stream_sheets_ods::OdsReader;
//!
//! let mut reader = OdsReader::open("report.ods", ReaderOptions::default())?;
//! let mut sheets = reader.sheets()?;
//! while let Some(mut sheet) = sheets.next_sheet()? {
//!     println!("{}", sheet.name());
//!     for row in sheet.rows() {
//!         println!("{:?}", row?.cells);
//!     }
//! }
//! # Ok::<(), stream_sheets_ods::OdsError>(())
//! ```

pub mod cell;
pub mod error;
pub mod reader;
pub mod rows;
pub mod settings;
pub mod sheet;

pub use cell::CellValueDecoder;
pub use error::{OdsError, OdsResult};
pub use reader::OdsReader;
pub use rows::RowIterator;
pub use sheet::{Sheet, SheetIterator, StyleVisibility};
