//! Workbook calculation engine
//!
//! [`Calculation`] evaluates ad-hoc formulas against a borrowed [`Workbook`]. Formula cells
//! reached by a reference are calculated on demand, with circular reference detection and
//! a nesting limit, and memoized until the next [`FormulaEngine::flush`].
//!
//! # Example
//!
//! ```rust
//! use cfmatch_core::Workbook;
//! use cfmatch_formula::{Calculation, FormulaEngine, FormulaValue};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 10.0).unwrap();
//! sheet.set_cell_value("A2", 20.0).unwrap();
//! sheet.set_cell_formula("A3", "=A1+A2").unwrap();
//!
//! let mut engine = Calculation::new(&workbook);
//! assert_eq!(engine.calculate("=A3*2", 0).unwrap(), FormulaValue::Number(60.0));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use ahash::{AHashMap, AHashSet};
use chrono::{Local, NaiveDate};

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{CellSource, EvaluationContext};
use crate::value::FormulaValue;
use crate::parser::parse_formula;
use cfmatch_core::{CellAddress, CellError, CellValue, Workbook};

/// A formula engine the conditional-format matcher can drive
pub trait FormulaEngine {
    /// Drop every transient cache (calculated cell values, parsed formulas)
    fn flush(&mut self);

    /// Evaluate a formula (leading `=` required) with `sheet` as the current sheet
    fn calculate(&mut self, formula: &str, sheet: usize) -> FormulaResult<FormulaValue>;

    /// Value of a cell; formula cells report their calculated value
    fn cell_value(&mut self, sheet: usize, addr: CellAddress) -> FormulaValue;
}

/// Options for formula calculation
#[derive(Debug, Clone)]
pub struct CalculationOptions {
    /// Date `TODAY()` reports; `None` reads the local clock at every flush
    pub today: Option<NaiveDate>,
    /// Maximum chain of formula cells referencing formula cells (default: 256)
    pub max_depth: usize,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            today: None,
            max_depth: 256,
        }
    }
}

/// (sheet, row, col)
type CellKey = (usize, u32, u16);

/// The calculation engine for one workbook
pub struct Calculation<'wb> {
    workbook: &'wb Workbook,
    options: CalculationOptions,
    today: NaiveDate,
    /// Calculated formula cells
    values: RefCell<AHashMap<CellKey, FormulaValue>>,
    /// Formula cells currently being calculated, for cycle detection
    in_progress: RefCell<AHashSet<CellKey>>,
    /// Parsed formulas, keyed by formula text
    parsed: RefCell<AHashMap<String, Rc<FormulaExpr>>>,
}

impl<'wb> Calculation<'wb> {
    /// Create an engine with default options
    pub fn new(workbook: &'wb Workbook) -> Self {
        Self::with_options(workbook, CalculationOptions::default())
    }

    /// Create an engine with custom options
    pub fn with_options(workbook: &'wb Workbook, options: CalculationOptions) -> Self {
        let today = options.today.unwrap_or_else(|| Local::now().date_naive());
        Self {
            workbook,
            options,
            today,
            values: RefCell::new(AHashMap::new()),
            in_progress: RefCell::new(AHashSet::new()),
            parsed: RefCell::new(AHashMap::new()),
        }
    }

    /// The workbook this engine reads from
    pub fn workbook(&self) -> &'wb Workbook {
        self.workbook
    }

    /// The date `TODAY()` currently reports
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Number of formula cells calculated since the last flush
    pub fn cached_cells(&self) -> usize {
        self.values.borrow().len()
    }

    fn context(&self, sheet: usize) -> EvaluationContext<'_> {
        EvaluationContext {
            cells: self,
            current_sheet: sheet,
            today: self.today,
        }
    }

    fn parse(&self, formula: &str) -> FormulaResult<Rc<FormulaExpr>> {
        if let Some(expr) = self.parsed.borrow().get(formula) {
            return Ok(Rc::clone(expr));
        }
        let expr = Rc::new(parse_formula(formula)?);
        self.parsed
            .borrow_mut()
            .insert(formula.to_string(), Rc::clone(&expr));
        Ok(expr)
    }

    fn check_sheet(&self, sheet: usize) -> FormulaResult<()> {
        self.workbook.try_worksheet(sheet)?;
        Ok(())
    }

    /// Calculate a formula cell, memoizing the result
    ///
    /// A cell whose formula fails to calculate falls back to its stored cached result
    /// when it has one.
    fn formula_cell_value(
        &self,
        key: CellKey,
        text: &str,
        cached: Option<&CellValue>,
    ) -> FormulaResult<FormulaValue> {
        if let Some(value) = self.values.borrow().get(&key) {
            return Ok(value.clone());
        }

        let (sheet, row, col) = key;
        if self.in_progress.borrow().contains(&key) {
            return Err(FormulaError::CircularReference(
                CellAddress::new(row, col).to_a1_string(),
            ));
        }
        if self.in_progress.borrow().len() >= self.options.max_depth {
            return Err(FormulaError::DepthLimit(self.options.max_depth));
        }

        self.in_progress.borrow_mut().insert(key);
        let result = if text.starts_with('=') {
            self.parse(text)
        } else {
            self.parse(&format!("={}", text))
        }
        .and_then(|expr| self.context(sheet).evaluate(&expr));
        self.in_progress.borrow_mut().remove(&key);

        let value = match (result, cached) {
            (Ok(value), _) => value,
            (Err(err), Some(cached)) => {
                log::debug!(
                    "formula at {} failed ({}), using cached value",
                    CellAddress::new(row, col),
                    err
                );
                cached.clone().into()
            }
            (Err(err), None) => return Err(err),
        };

        self.values.borrow_mut().insert(key, value.clone());
        Ok(value)
    }
}

impl CellSource for Calculation<'_> {
    fn cell_value(&self, sheet: usize, row: u32, col: u16) -> FormulaResult<FormulaValue> {
        let Some(worksheet) = self.workbook.worksheet(sheet) else {
            return Ok(FormulaValue::Error(CellError::Ref));
        };
        match worksheet.value_ref_at(row, col) {
            Some(CellValue::Formula { text, cached_value }) => {
                self.formula_cell_value((sheet, row, col), text, cached_value.as_deref())
            }
            Some(value) => Ok(value.clone().into()),
            None => Ok(FormulaValue::Empty),
        }
    }

    fn sheet_index(&self, name: &str) -> Option<usize> {
        self.workbook.sheet_index(name)
    }
}

impl FormulaEngine for Calculation<'_> {
    fn flush(&mut self) {
        log::trace!(
            "flushing {} calculated cells and {} parsed formulas",
            self.values.get_mut().len(),
            self.parsed.get_mut().len()
        );
        self.values.get_mut().clear();
        self.in_progress.get_mut().clear();
        self.parsed.get_mut().clear();
        if self.options.today.is_none() {
            self.today = Local::now().date_naive();
        }
    }

    fn calculate(&mut self, formula: &str, sheet: usize) -> FormulaResult<FormulaValue> {
        self.check_sheet(sheet)?;
        let expr = self.parse(formula)?;
        self.context(sheet).evaluate(&expr)
    }

    fn cell_value(&mut self, sheet: usize, addr: CellAddress) -> FormulaValue {
        match CellSource::cell_value(self, sheet, addr.row, addr.col) {
            Ok(value) => value,
            Err(err) => {
                log::debug!("cell {} could not be calculated: {}", addr, err);
                FormulaValue::Error(match err {
                    FormulaError::CircularReference(_) | FormulaError::DepthLimit(_) => {
                        CellError::Calc
                    }
                    FormulaError::UnknownFunction(_) => CellError::Name,
                    FormulaError::InvalidReference(_) => CellError::Ref,
                    _ => CellError::Value,
                })
            }
        }
    }
}
