//! Prelude module - common imports for stream-sheets users
//!
//! ```rust
//! use stream_sheets::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellValue,
    // Error types
    Error,
    Format,
    Number,
    ReaderOptions,
    Result,
    Row,
    Rows,
    Sheet,
    SheetDescriptor,
    Sheets,
    // Main types
    Workbook,
};
