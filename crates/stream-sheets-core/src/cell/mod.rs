//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The decoded value of a cell
//! - [`Number`] - Integer-or-float numeric payload
//! - [`CellAddress`] - A cell's location (e.g., "A1")

mod address;
mod value;

pub use address::CellAddress;
pub use value::{CellValue, Number};
