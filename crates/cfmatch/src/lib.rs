//! # cfmatch
//!
//! Decide whether a conditional-formatting rule applies to a given cell.
//!
//! A rule's condition text is written against the top-left cell of the range it applies
//! to. To test another cell of the range, cfmatch moves the condition's relative
//! references onto that cell, compiles the rule kind into a single boolean formula with
//! the cell's value substituted in, and evaluates it through a [`FormulaEngine`].
//!
//! ## Features
//!
//! - Quote-safe reference rewriting ([`reference`])
//! - Formula templates for every rule kind with a cell-level meaning ([`compiler`])
//! - [`CellMatcher`] / [`RangeMatcher`] for single cells and whole ranges
//! - Typed rule builders ([`wizard`])
//!
//! ## Example
//!
//! ```rust
//! use cfmatch::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.fill_column("B2", [1, 1, 2, 3, 5, 8, 13, 21, 34, 55]).unwrap();
//!
//! let rule = ConditionalFormatRule::expression("ISODD(B2)");
//! let matcher = RangeMatcher::new(&workbook, 0, "$B$2:$B$11").unwrap();
//! let mut engine = Calculation::new(&workbook);
//!
//! let odd = matcher.matching_cells(&rule, &CellRange::parse("B2:B11").unwrap(), &mut engine);
//! assert_eq!(odd.len(), 7);
//! ```

pub mod adapter;
pub mod compiler;
pub mod error;
pub mod matcher;
pub mod prelude;
pub mod reference;
pub mod wizard;

pub use adapter::{is_truthy, FlushedEngine};
pub use compiler::compile;
pub use error::{MatchError, Result, WizardError, WizardResult};
pub use matcher::{CellMatcher, RangeMatcher};

// Re-export core types
pub use cfmatch_core::{
    CellAddress, CellError, CellRange, CellValue, CfOperator, CfRuleType, ConditionalFormatRule,
    TimePeriod, Workbook, Worksheet,
};

// Re-export formula types
pub use cfmatch_formula::{
    Calculation, CalculationOptions, FormulaEngine, FormulaError, FormulaResult, FormulaValue,
};
