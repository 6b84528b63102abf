//! Everything needed to build rules and match them
//!
//! ```rust
//! use cfmatch::prelude::*;
//! ```

pub use crate::matcher::{CellMatcher, RangeMatcher};
pub use crate::wizard::{Operand, RuleWizard, Wizard};
pub use crate::{MatchError, WizardError};

pub use cfmatch_core::{
    CellAddress, CellRange, CellValue, CfOperator, CfRuleType, ConditionalFormatRule, TimePeriod,
    Workbook, Worksheet,
};
pub use cfmatch_formula::{Calculation, CalculationOptions, FormulaEngine, FormulaValue};
