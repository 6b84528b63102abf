//! Formula engine adapter
//!
//! Every evaluation starts from a flushed engine, so no calculated value from an earlier
//! rule or cell can leak into the next one.

use cfmatch_core::CellAddress;
use cfmatch_formula::{FormulaEngine, FormulaValue};

/// Exclusive, freshly flushed access to a formula engine for one evaluation
pub struct FlushedEngine<'e, E: FormulaEngine + ?Sized> {
    engine: &'e mut E,
}

impl<'e, E: FormulaEngine + ?Sized> FlushedEngine<'e, E> {
    /// Flush `engine` and borrow it for one evaluation
    pub fn acquire(engine: &'e mut E) -> Self {
        engine.flush();
        Self { engine }
    }

    /// Current value of a cell, formula cells calculated
    pub fn cell_value(&mut self, sheet: usize, addr: CellAddress) -> FormulaValue {
        self.engine.cell_value(sheet, addr)
    }

    /// Evaluate `formula` (no leading `=`) on `sheet` as a condition
    ///
    /// Engine failures and error values count as `false`.
    pub fn evaluate(self, formula: &str, sheet: usize) -> bool {
        let formula = format!("={}", formula);
        match self.engine.calculate(&formula, sheet) {
            Ok(value) => is_truthy(&value),
            Err(err) => {
                log::debug!("'{}' failed to evaluate: {}", formula, err);
                false
            }
        }
    }
}

/// Booleans as-is, numbers when non-zero; nothing else matches
pub fn is_truthy(value: &FormulaValue) -> bool {
    match value {
        FormulaValue::Boolean(b) => *b,
        FormulaValue::Number(n) => *n != 0.0 && !n.is_nan(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfmatch_core::{CellError, Workbook};
    use cfmatch_formula::Calculation;

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&FormulaValue::Boolean(true)));
        assert!(is_truthy(&FormulaValue::Number(-2.0)));
        assert!(!is_truthy(&FormulaValue::Number(0.0)));
        assert!(!is_truthy(&FormulaValue::String("TRUE".into())));
        assert!(!is_truthy(&FormulaValue::Error(CellError::Value)));
        assert!(!is_truthy(&FormulaValue::Empty));
    }

    #[test]
    fn test_evaluate_absorbs_failures() {
        let wb = Workbook::new();
        let mut engine = Calculation::new(&wb);

        assert!(FlushedEngine::acquire(&mut engine).evaluate("1<2", 0));
        assert!(!FlushedEngine::acquire(&mut engine).evaluate("NOSUCHFUNCTION(1)", 0));
        assert!(!FlushedEngine::acquire(&mut engine).evaluate("1/0", 0));
        assert!(!FlushedEngine::acquire(&mut engine).evaluate("AND(", 0));
        assert!(!FlushedEngine::acquire(&mut engine).evaluate("TRUE", 5));
    }

    #[test]
    fn test_works_through_trait_object() {
        let wb = Workbook::new();
        let mut engine = Calculation::new(&wb);
        let dynamic: &mut dyn FormulaEngine = &mut engine;
        assert!(FlushedEngine::acquire(dynamic).evaluate("2*3=6", 0));
    }
}
