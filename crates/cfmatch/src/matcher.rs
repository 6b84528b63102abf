//! Cell matchers
//!
//! A [`RangeMatcher`] fixes the anchor (top-left cell) of a conditional-formatting range on
//! one sheet and answers "does this rule match at that cell" for any cell of the range. A
//! [`CellMatcher`] does the same for a single cell.
//!
//! ## Example
//!
//! ```rust
//! use cfmatch::{CellMatcher, ConditionalFormatRule};
//! use cfmatch_core::Workbook;
//! use cfmatch_formula::Calculation;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.fill_column("A1", [5, 50, 500]).unwrap();
//!
//! let rule = ConditionalFormatRule::cell_is_greater_than("10");
//! let matcher = CellMatcher::new(&workbook, 0, "A2", "A1:A3").unwrap();
//! let mut engine = Calculation::new(&workbook);
//! assert!(matcher.evaluate_conditional(&rule, &mut engine));
//! ```

use cfmatch_core::{CellAddress, CellRange, CellValue, ConditionalFormatRule, Workbook};
use cfmatch_formula::FormulaEngine;

use crate::adapter::FlushedEngine;
use crate::compiler::compile;
use crate::error::{MatchError, Result};

/// Matches rules of one conditional-formatting range at arbitrary cells
///
/// Holds the range's anchor, parsed once; copying it is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeMatcher {
    sheet: usize,
    anchor: CellAddress,
}

impl RangeMatcher {
    /// Anchor `conditional_range` (e.g. `"$A$2:$C$11"` or `"A1:A5 C1:C5"`) on `sheet`
    pub fn new(workbook: &Workbook, sheet: usize, conditional_range: &str) -> Result<Self> {
        workbook.try_worksheet(sheet)?;
        let anchor = CellRange::anchor_from_range_text(conditional_range)
            .map_err(|e| MatchError::MalformedReference(e.to_string()))?;
        Ok(Self { sheet, anchor })
    }

    /// Top-left cell condition text is written against
    pub fn anchor(&self) -> CellAddress {
        self.anchor
    }

    /// Sheet the cells are read from and formulas run on
    pub fn sheet(&self) -> usize {
        self.sheet
    }

    /// Whether `rule` matches at `target`
    ///
    /// Never fails: a rule that cannot be compiled or evaluated does not match.
    pub fn matches<E>(&self, rule: &ConditionalFormatRule, target: CellAddress, engine: &mut E) -> bool
    where
        E: FormulaEngine + ?Sized,
    {
        let target = target.to_relative();
        let mut engine = FlushedEngine::acquire(engine);
        let value = CellValue::from(engine.cell_value(self.sheet, target));

        match compile(rule, self.anchor, target, &value) {
            Ok(formula) => {
                log::debug!(
                    "{} rule at {} compiled to '{}'",
                    rule.rule_type.type_name(),
                    target,
                    formula
                );
                engine.evaluate(&formula, self.sheet)
            }
            Err(err) => {
                log::debug!(
                    "{} rule at {} does not match: {}",
                    rule.rule_type.type_name(),
                    target,
                    err
                );
                false
            }
        }
    }

    /// Every cell of `range` where `rule` matches, row by row
    pub fn matching_cells<E>(
        &self,
        rule: &ConditionalFormatRule,
        range: &CellRange,
        engine: &mut E,
    ) -> Vec<CellAddress>
    where
        E: FormulaEngine + ?Sized,
    {
        range
            .cells()
            .filter(|cell| self.matches(rule, *cell, engine))
            .collect()
    }
}

/// Matches rules at one cell of a conditional-formatting range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMatcher {
    range: RangeMatcher,
    cell: CellAddress,
}

impl CellMatcher {
    /// Create a matcher for `cell` inside `conditional_range` on `sheet`
    ///
    /// Fails when the cell or range text is not a valid reference, or the sheet does not
    /// exist.
    pub fn new(
        workbook: &Workbook,
        sheet: usize,
        cell: &str,
        conditional_range: &str,
    ) -> Result<Self> {
        let range = RangeMatcher::new(workbook, sheet, conditional_range)?;
        let cell = CellAddress::parse(cell)
            .map_err(|e| MatchError::MalformedReference(e.to_string()))?
            .to_relative();
        Ok(Self { range, cell })
    }

    /// The cell being matched
    pub fn cell(&self) -> CellAddress {
        self.cell
    }

    /// Top-left cell of the conditional range
    pub fn anchor(&self) -> CellAddress {
        self.range.anchor()
    }

    /// Whether `rule` currently matches this cell's value
    pub fn evaluate_conditional<E>(&self, rule: &ConditionalFormatRule, engine: &mut E) -> bool
    where
        E: FormulaEngine + ?Sized,
    {
        self.range.matches(rule, self.cell, engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfmatch_formula::Calculation;

    fn workbook() -> Workbook {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.fill_column("A1", [5, 50, 500]).unwrap();
        ws.set_cell_formula("B1", "=A3/10").unwrap();
        wb
    }

    #[test]
    fn test_construction_errors() {
        let wb = workbook();
        assert!(matches!(
            CellMatcher::new(&wb, 0, "A0", "A1:A3"),
            Err(MatchError::MalformedReference(_))
        ));
        assert!(matches!(
            CellMatcher::new(&wb, 0, "A1", "nonsense"),
            Err(MatchError::MalformedReference(_))
        ));
        assert_eq!(
            CellMatcher::new(&wb, 2, "A1", "A1:A3"),
            Err(MatchError::SheetOutOfBounds(2, 1))
        );
    }

    #[test]
    fn test_anchor_is_normalized() {
        let wb = workbook();
        let matcher = CellMatcher::new(&wb, 0, "$a$2", "$a$1:$a$3,C1:C3").unwrap();
        assert_eq!(matcher.anchor(), CellAddress::new(1, 1));
        assert_eq!(matcher.cell(), CellAddress::new(2, 1));
    }

    #[test]
    fn test_formula_cell_value_is_calculated() {
        let wb = workbook();
        let mut engine = Calculation::new(&wb);
        let matcher = CellMatcher::new(&wb, 0, "B1", "B1").unwrap();
        assert!(matcher.evaluate_conditional(&ConditionalFormatRule::cell_is_equal_to("50"), &mut engine));
    }

    #[test]
    fn test_matching_cells() {
        let wb = workbook();
        let mut engine = Calculation::new(&wb);
        let matcher = RangeMatcher::new(&wb, 0, "A1:A3").unwrap();
        // Each cell against twice the cell below it; A4 is empty
        let rule = ConditionalFormatRule::cell_is_greater_than("A2*2");
        assert_eq!(
            matcher.matching_cells(&rule, &CellRange::parse("A1:A3").unwrap(), &mut engine),
            vec![CellAddress::new(3, 1)]
        );
    }
}
