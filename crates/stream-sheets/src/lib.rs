//! # stream-sheets
//!
//! Streaming, low-memory reading of spreadsheets.
//!
//! Reads OpenDocument (`.ods`) and Office Open XML (`.xlsx`, `.xlsm`) files
//! one sheet and one row at a time, without loading whole sheets into memory.
//! Large XLSX shared strings tables can be paged out to temporary files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stream_sheets::prelude::*;
//!
//! let options = ReaderOptions::default().with_preserve_empty_rows(true);
//! let mut workbook = stream_sheets::open("report.xlsx", options)?;
//!
//! let mut sheets = workbook.sheets()?;
//! while let Some(mut sheet) = sheets.next_sheet()? {
//!     let descriptor = sheet.descriptor().clone();
//!     for row in sheet.rows() {
//!         let row = row?;
//!         println!("{}!{}: {:?}", descriptor.name, row.index + 1, row.cells);
//!     }
//! }
//! drop(sheets);
//! workbook.close();
//! # Ok::<(), stream_sheets::Error>(())
//! ```

pub mod error;
pub mod prelude;
mod workbook;

use std::path::Path;

pub use error::{Error, Result};
pub use workbook::{Format, Rows, Sheet, Sheets, Workbook};

// Re-export core types
pub use stream_sheets_core::{
    CellAddress, CellValue, InvalidCell, InvalidValueError, Number, ReaderOptions, Row,
    SheetDescriptor, MAX_COLS, MAX_ROWS,
};

// Re-export format readers
pub use stream_sheets_ods as ods;
pub use stream_sheets_xlsx as xlsx;

/// Open a spreadsheet, picking the reader from the file extension
/// (`ods`, `xlsx` or `xlsm`)
pub fn open<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Workbook> {
    Workbook::open(path, options)
}
