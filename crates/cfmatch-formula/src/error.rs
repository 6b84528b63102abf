//! Why a formula could not produce a value

use thiserror::Error;

pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// A formula that cannot be parsed or run
///
/// Spreadsheet-level errors (`#DIV/0!`, `#VALUE!`, ...) are values, not `FormulaError`s;
/// they travel through evaluation as [`FormulaValue::Error`](crate::FormulaValue::Error).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// Malformed formula text; the message names the byte offset
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// A formula cell that (indirectly) references itself
    #[error("Circular reference through {0}")]
    CircularReference(String),

    /// Formula cells nested deeper than the configured limit
    #[error("Formula cells nest deeper than {0}")]
    DepthLimit(usize),

    /// A sheet index or address the workbook cannot resolve
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

impl From<cfmatch_core::Error> for FormulaError {
    fn from(err: cfmatch_core::Error) -> Self {
        FormulaError::InvalidReference(err.to_string())
    }
}
