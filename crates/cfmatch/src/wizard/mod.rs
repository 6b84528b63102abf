//! Rule-builder wizards
//!
//! Typed builders that produce [`ConditionalFormatRule`]s for a cell range. Formula text
//! handed to a wizard (formula operands, expressions) is written relative to `A1` and
//! moved onto the range's top-left cell when the rule is built; `from_conditional`
//! reverses that move so a stored rule can be edited again.
//!
//! ## Example
//!
//! ```rust
//! use cfmatch::wizard::{RuleWizard, Wizard};
//! use cfmatch_core::CfRuleType;
//!
//! let wizard = Wizard::new("A2:C11").unwrap();
//! let rule = wizard.expression().expression("ISODD(A1)").conditional().unwrap();
//! assert_eq!(
//!     rule.rule_type,
//!     CfRuleType::Expression { formula: "ISODD(A2)".into() }
//! );
//! ```

mod blanks;
mod cell_value;
mod date_value;
mod duplicates;
mod errors;
mod expression;
mod text_value;

pub use blanks::BlanksWizard;
pub use cell_value::{CellValueWizard, Operand};
pub use date_value::DateValueWizard;
pub use duplicates::DuplicatesWizard;
pub use errors::ErrorsWizard;
pub use expression::ExpressionWizard;
pub use text_value::TextValueWizard;

use cfmatch_core::{CellAddress, CellRange, CfRuleType, ConditionalFormatRule};

use crate::error::{WizardError, WizardResult};
use crate::reference::shift_references;

/// Cell wizard formulas are written against
const AUTHORING_CELL: CellAddress = CellAddress {
    row: 1,
    col: 1,
    row_absolute: false,
    col_absolute: false,
};

/// Factory for the per-family rule builders of one cell range
#[derive(Debug, Clone, PartialEq)]
pub struct Wizard {
    base: WizardBase,
}

impl Wizard {
    /// Create a wizard for `cell_range` (`"A2:C11"`, `"$A$1:$A$5 C1:C5"`, ...)
    pub fn new(cell_range: &str) -> WizardResult<Self> {
        Ok(Self {
            base: WizardBase::new(cell_range)?,
        })
    }

    /// The range rules are built for
    pub fn cell_range(&self) -> &str {
        &self.base.range_text
    }

    /// Compare the cell value against operands
    pub fn cell_value(&self) -> CellValueWizard {
        CellValueWizard::with_base(self.base.clone())
    }

    /// Search the cell text
    pub fn text_value(&self) -> TextValueWizard {
        TextValueWizard::with_base(self.base.clone())
    }

    /// Blank or non-blank cells
    pub fn blanks(&self) -> BlanksWizard {
        BlanksWizard::with_base(self.base.clone())
    }

    /// Cells holding (or not holding) an error
    pub fn errors(&self) -> ErrorsWizard {
        ErrorsWizard::with_base(self.base.clone())
    }

    /// Dates within a period relative to today
    pub fn date_value(&self) -> DateValueWizard {
        DateValueWizard::with_base(self.base.clone())
    }

    /// A free formula
    pub fn expression(&self) -> ExpressionWizard {
        ExpressionWizard::with_base(self.base.clone())
    }

    /// Duplicate or unique values within the range
    pub fn duplicates(&self) -> DuplicatesWizard {
        DuplicatesWizard::with_base(self.base.clone())
    }
}

/// Shared builder behaviour: range, style and building the final rule
pub trait RuleWizard: Sized {
    /// Shared builder state
    fn base(&self) -> &WizardBase;

    /// Shared builder state, mutably
    fn base_mut(&mut self) -> &mut WizardBase;

    /// Build the rule
    fn conditional(&self) -> WizardResult<ConditionalFormatRule>;

    /// The range the rule is built for
    fn cell_range(&self) -> &str {
        &self.base().range_text
    }

    /// Style applied on a match
    fn with_dxf_id(mut self, dxf_id: u32) -> Self {
        self.base_mut().dxf_id = Some(dxf_id);
        self
    }

    /// Stop evaluating lower-priority rules after a match
    fn with_stop_if_true(mut self, stop: bool) -> Self {
        self.base_mut().stop_if_true = stop;
        self
    }
}

/// State every builder carries
#[derive(Debug, Clone, PartialEq)]
pub struct WizardBase {
    range_text: String,
    ranges: Vec<CellRange>,
    anchor: CellAddress,
    dxf_id: Option<u32>,
    stop_if_true: bool,
}

impl WizardBase {
    fn new(cell_range: &str) -> WizardResult<Self> {
        let ranges = cell_range
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|area| !area.is_empty())
            .map(CellRange::parse)
            .collect::<Result<Vec<_>, _>>()?;

        let anchor = ranges
            .first()
            .map(|r| r.start.to_relative())
            .ok_or_else(|| WizardError::InvalidRange(format!("no cells in '{}'", cell_range)))?;

        Ok(Self {
            range_text: cell_range.trim().to_string(),
            ranges,
            anchor,
            dxf_id: None,
            stop_if_true: false,
        })
    }

    /// Top-left cell of the first area
    pub fn anchor(&self) -> CellAddress {
        self.anchor
    }

    /// The parsed areas of the range
    pub fn ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    /// Move formula text written against `A1` onto the anchor
    fn adjust(&self, formula: &str) -> WizardResult<String> {
        Ok(shift_references(formula, AUTHORING_CELL, self.anchor)?)
    }

    /// Move formula text written against the anchor back onto `A1`
    fn reverse_adjust(&self, formula: &str) -> WizardResult<String> {
        Ok(shift_references(formula, self.anchor, AUTHORING_CELL)?)
    }

    /// Take over the style settings of a stored rule
    fn inherit(&mut self, rule: &ConditionalFormatRule) {
        self.dxf_id = rule.dxf_id;
        self.stop_if_true = rule.stop_if_true;
    }

    fn build(&self, rule_type: CfRuleType) -> ConditionalFormatRule {
        let mut rule = ConditionalFormatRule::new(rule_type)
            .with_ranges(self.ranges.clone())
            .with_stop_if_true(self.stop_if_true);
        rule.dxf_id = self.dxf_id;
        rule
    }
}

/// The error `from_conditional` reports for a rule of another family
fn wrong_rule_type(expected: &'static str, rule: &ConditionalFormatRule) -> WizardError {
    WizardError::WrongRuleType {
        expected,
        found: rule.rule_type.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wizard_range_parsing() {
        let wizard = Wizard::new("$B$2:C11, E2:E11").unwrap();
        assert_eq!(wizard.cell_range(), "$B$2:C11, E2:E11");
        assert_eq!(wizard.base.anchor(), CellAddress::new(2, 2));
        assert_eq!(wizard.base.ranges().len(), 2);

        assert!(matches!(
            Wizard::new("not a range"),
            Err(WizardError::InvalidRange(_))
        ));
        assert!(matches!(Wizard::new("  "), Err(WizardError::InvalidRange(_))));
    }

    #[test]
    fn test_adjust_round_trip() {
        let wizard = Wizard::new("C3:D9").unwrap();
        let adjusted = wizard.base.adjust("A1>$A$1+B1").unwrap();
        assert_eq!(adjusted, "C3>$A$1+D3");
        assert_eq!(wizard.base.reverse_adjust(&adjusted).unwrap(), "A1>$A$1+B1");
    }

    #[test]
    fn test_style_settings_carried() {
        let rule = Wizard::new("A1:A5")
            .unwrap()
            .blanks()
            .with_dxf_id(3)
            .with_stop_if_true(true)
            .conditional()
            .unwrap();
        assert_eq!(rule.dxf_id, Some(3));
        assert!(rule.stop_if_true);
        assert_eq!(rule.ranges, vec![CellRange::parse("A1:A5").unwrap()]);
    }
}
