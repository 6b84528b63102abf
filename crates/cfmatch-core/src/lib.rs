//! # cfmatch-core
//!
//! Core data structures for the cfmatch conditional-formatting matcher.
//!
//! This crate provides:
//! - [`CellAddress`] and [`CellRange`] - 1-based cell addressing with `$` lock markers
//! - [`CellValue`] - Cell values (numbers, strings, booleans, errors, formulas)
//! - [`Workbook`], [`Worksheet`] - A sparse in-memory cell store
//! - [`ConditionalFormatRule`] - The conditional formatting rule model
//!
//! ## Example
//!
//! ```rust
//! use cfmatch_core::{CellRange, ConditionalFormatRule, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.fill_column("B2", [0, 1, 1, 2, 3]).unwrap();
//! sheet.add_conditional_format(
//!     ConditionalFormatRule::expression("ISODD(B2)")
//!         .with_range(CellRange::parse("B2:B6").unwrap()),
//! );
//!
//! assert_eq!(sheet.get_value_at(4, 2).as_number(), Some(1.0));
//! assert_eq!(sheet.conditional_formats().len(), 1);
//! ```

pub mod cell;
pub mod conditional_format;
pub mod error;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellError, CellRange, CellValue};
pub use conditional_format::{CfOperator, CfRuleType, ConditionalFormatRule, TimePeriod};
pub use error::{Error, Result};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
