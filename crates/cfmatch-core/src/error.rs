//! Errors raised by the cell store and address parsing

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row number and the largest allowed
    #[error("Row {0} is outside 1..={1}")]
    RowOutOfBounds(u32, u32),

    /// Column number and the largest allowed
    #[error("Column {0} is outside 1..={1}")]
    ColumnOutOfBounds(u32, u16),

    /// A relative reference moved off the edge of the sheet
    #[error("Moving {reference} by {d_col} columns and {d_row} rows leaves the sheet")]
    ShiftOutOfBounds {
        reference: String,
        d_col: i64,
        d_row: i64,
    },

    /// Requested index and the number of sheets
    #[error("No sheet at index {0} ({1} sheets)")]
    SheetOutOfBounds(usize, usize),

    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    #[error("A sheet named {0} already exists")]
    DuplicateSheetName(String),
}
