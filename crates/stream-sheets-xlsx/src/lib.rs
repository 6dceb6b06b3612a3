//! # stream-sheets-xlsx
//!
//! Streaming reader for Office Open XML spreadsheets (`.xlsx`, `.xlsm`).
//!
//! The shared strings table is read once when the workbook is opened, either
//! into memory or, for large tables, into temporary page files. Worksheets
//! are then read one row at a time.
//!
//! ```rust,no_run
//! use stream_sheets_core::ReaderOptions;
//! use stream_sheets_xlsx::XlsxReader;
//!
//! let options = ReaderOptions::default().with_in_memory_threshold(10_000);
//! let mut reader = XlsxReader::open("report.xlsx", options)?;
//! let mut sheets = reader.sheets();
//! while let Some(mut sheet) = sheets.next_sheet()? {
//!     println!("{}", sheet.name());
//!     for row in sheet.rows() {
//!         println!("{:?}", row?.cells);
//!     }
//! }
//! # Ok::<(), stream_sheets_xlsx::XlsxError>(())
//! ```

pub mod cell;
pub mod date_format;
pub mod error;
pub mod reader;
pub mod rows;
pub mod shared_strings;
pub mod sheet;
pub mod styles;
pub mod workbook;

pub use cell::XlsxCellDecoder;
pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use rows::RowIterator;
pub use shared_strings::{
    CachingStrategy, CachingStrategyFactory, FileBasedStrategy, InMemoryStrategy,
    SharedStringsManager,
};
pub use sheet::{Sheet, SheetIterator};
pub use styles::StyleTable;
pub use workbook::{SheetEntry, WorkbookInfo};
