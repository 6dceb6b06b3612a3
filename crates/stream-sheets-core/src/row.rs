//! Row types

use crate::cell::CellValue;
use crate::error::InvalidValueError;

/// A cell whose raw value could not be decoded as its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidCell {
    /// Column index (0-based)
    pub column: usize,
    /// The decode failure
    pub error: InvalidValueError,
}

/// One decoded row of a sheet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Row index (0-based, counted in file order including repeated and skipped rows)
    pub index: usize,
    /// Cell values in column order. Cells that failed to decode are `Empty`.
    pub cells: Vec<CellValue>,
    /// Cells whose value could not be decoded
    pub invalid: Vec<InvalidCell>,
}

impl Row {
    /// Create a row from already decoded values
    pub fn new(index: usize, cells: Vec<CellValue>) -> Self {
        Self {
            index,
            cells,
            invalid: Vec::new(),
        }
    }

    /// Store the outcome of decoding the cell at `column`.
    ///
    /// Failures are recorded and the cell is left empty, so one bad value never
    /// hides the rest of the row.
    pub fn push_decoded(&mut self, column: usize, value: Result<CellValue, InvalidValueError>) {
        if self.cells.len() < column {
            self.cells.resize(column, CellValue::Empty);
        }
        let value = match value {
            Ok(value) => value,
            Err(error) => {
                self.invalid.push(InvalidCell { column, error });
                CellValue::Empty
            }
        };
        if column < self.cells.len() {
            self.cells[column] = value;
        } else {
            self.cells.push(value);
        }
    }

    /// Drop empty cells from the end of the row
    pub fn trim_trailing_empty(&mut self) {
        while matches!(self.cells.last(), Some(CellValue::Empty)) {
            self.cells.pop();
        }
    }

    /// Check if every cell is empty and nothing failed to decode
    pub fn is_empty(&self) -> bool {
        self.invalid.is_empty() && self.cells.iter().all(CellValue::is_empty)
    }

    /// Check if any cell failed to decode
    pub fn has_invalid_cells(&self) -> bool {
        !self.invalid.is_empty()
    }

    /// Get a cell by column index
    pub fn get(&self, column: usize) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Number of cells in the row
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Consume the row, failing with the first decode error if there was one
    pub fn into_values(self) -> Result<Vec<CellValue>, InvalidValueError> {
        match self.invalid.into_iter().next() {
            Some(invalid) => Err(invalid.error),
            None => Ok(self.cells),
        }
    }
}
