//! Formula evaluator
//!
//! Walks a [`FormulaExpr`] and produces a [`FormulaValue`]. Cell contents come through a
//! [`CellSource`], so the same code runs against a plain [`Workbook`] (formula cells read
//! as their cached result) or against the [`Calculation`](crate::Calculation) engine
//! (formula cells calculated on demand).
//!
//! Spreadsheet errors such as `#DIV/0!` are values and flow through operators. A
//! [`FormulaError`] means the formula itself cannot run: an unknown function, a wrong
//! argument count, or a failure reported by the cell source.

use std::cmp::Ordering;

use chrono::{Local, NaiveDate};

use crate::ast::{Area, BinaryOperator, FormulaExpr, Literal, Reference, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::FunctionRegistry;
use crate::value::{compare_values, FormulaValue};
use cfmatch_core::{CellError, Workbook};

/// Where the evaluator reads cell values from
pub trait CellSource {
    /// Value of a cell, by sheet index and 1-based row/column
    fn cell_value(&self, sheet: usize, row: u32, col: u16) -> FormulaResult<FormulaValue>;

    /// Resolve a sheet name used in a `Sheet1!A1` reference
    fn sheet_index(&self, name: &str) -> Option<usize>;
}

/// Reads stored values; formula cells yield their cached result
impl CellSource for Workbook {
    fn cell_value(&self, sheet: usize, row: u32, col: u16) -> FormulaResult<FormulaValue> {
        Ok(match self.worksheet(sheet) {
            Some(ws) => ws.get_value_at(row, col).into(),
            None => FormulaValue::Error(CellError::Ref),
        })
    }

    fn sheet_index(&self, name: &str) -> Option<usize> {
        Workbook::sheet_index(self, name)
    }
}

/// No cells at all: every reference is blank
impl CellSource for () {
    fn cell_value(&self, _sheet: usize, _row: u32, _col: u16) -> FormulaResult<FormulaValue> {
        Ok(FormulaValue::Empty)
    }

    fn sheet_index(&self, _name: &str) -> Option<usize> {
        None
    }
}

/// Everything a formula can observe besides its own text
pub struct EvaluationContext<'a> {
    pub cells: &'a dyn CellSource,
    /// Sheet that unqualified references resolve against
    pub current_sheet: usize,
    /// The date `TODAY()` reports
    pub today: NaiveDate,
}

impl<'a> EvaluationContext<'a> {
    /// Context over `cells`, with `today` taken from the local clock
    pub fn new(cells: &'a dyn CellSource, sheet: usize) -> Self {
        Self {
            cells,
            current_sheet: sheet,
            today: Local::now().date_naive(),
        }
    }

    /// A context with no cells behind it
    pub fn simple() -> EvaluationContext<'static> {
        EvaluationContext::new(&(), 0)
    }

    /// Pin the date `TODAY()` reports
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Evaluate `expr` in this context
    pub fn evaluate(&self, expr: &FormulaExpr) -> FormulaResult<FormulaValue> {
        match expr {
            FormulaExpr::Literal(literal) => Ok(match literal {
                Literal::Number(n) => FormulaValue::Number(*n),
                Literal::Text(s) => FormulaValue::String(s.clone()),
                Literal::Boolean(b) => FormulaValue::Boolean(*b),
                Literal::Error(e) => FormulaValue::Error(*e),
            }),
            FormulaExpr::Reference(reference) => self.dereference(reference),
            FormulaExpr::Name(_) => Ok(FormulaValue::Error(CellError::Name)),
            FormulaExpr::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                Ok(unary(*op, &value))
            }
            FormulaExpr::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Ok(binary(*op, &left, &right))
            }
            FormulaExpr::Call { name, args } => self.call(name, args),
        }
    }

    fn dereference(&self, reference: &Reference) -> FormulaResult<FormulaValue> {
        let sheet = match &reference.sheet {
            None => self.current_sheet,
            Some(name) => match self.cells.sheet_index(name) {
                Some(idx) => idx,
                None => return Ok(FormulaValue::Error(CellError::Ref)),
            },
        };

        match reference.area {
            Area::Cell(addr) => self.cells.cell_value(sheet, addr.row, addr.col),
            Area::Range(range) => {
                let (top, bottom) = ordered(range.start.row, range.end.row);
                let (left, right) = ordered(range.start.col, range.end.col);
                let rows = (top..=bottom)
                    .map(|row| {
                        (left..=right)
                            .map(|col| self.cells.cell_value(sheet, row, col))
                            .collect::<FormulaResult<Vec<_>>>()
                    })
                    .collect::<FormulaResult<Vec<_>>>()?;
                Ok(FormulaValue::Array(rows))
            }
        }
    }

    fn call(&self, name: &str, args: &[FormulaExpr]) -> FormulaResult<FormulaValue> {
        let def = FunctionRegistry::global()
            .get(name)
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

        if !def.accepts(args.len()) {
            return Err(FormulaError::ArgumentCount {
                function: def.name.to_string(),
                expected: def.arity(),
                actual: args.len(),
            });
        }

        let values = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<FormulaResult<Vec<_>>>()?;
        (def.implementation)(&values, self)
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    ctx.evaluate(expr)
}

fn ordered<T: Ord>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The operand as a plain number, or the error value the operator yields instead
fn numeric(value: &FormulaValue) -> Result<f64, CellError> {
    match value {
        FormulaValue::Error(e) => Err(*e),
        FormulaValue::Array(_) => Err(CellError::Value),
        other => other.as_number().ok_or(CellError::Value),
    }
}

fn unary(op: UnaryOperator, value: &FormulaValue) -> FormulaValue {
    let n = match numeric(value) {
        Ok(n) => n,
        Err(e) => return FormulaValue::Error(e),
    };
    FormulaValue::Number(match op {
        UnaryOperator::Negate => -n,
        UnaryOperator::Percent => n / 100.0,
    })
}

fn binary(op: BinaryOperator, left: &FormulaValue, right: &FormulaValue) -> FormulaValue {
    // The left operand's error wins
    if let Some(e) = left.error().or_else(|| right.error()) {
        return FormulaValue::Error(e);
    }
    // Ranges only make sense as function arguments
    if matches!(left, FormulaValue::Array(_)) || matches!(right, FormulaValue::Array(_)) {
        return FormulaValue::Error(CellError::Value);
    }

    if op.is_comparison() {
        let ord = compare_values(left, right);
        return FormulaValue::Boolean(match op {
            BinaryOperator::Equal => ord == Ordering::Equal,
            BinaryOperator::NotEqual => ord != Ordering::Equal,
            BinaryOperator::LessThan => ord == Ordering::Less,
            BinaryOperator::LessEqual => ord != Ordering::Greater,
            BinaryOperator::GreaterThan => ord == Ordering::Greater,
            _ => ord != Ordering::Less,
        });
    }
    if op == BinaryOperator::Concat {
        return FormulaValue::String(left.as_string() + &right.as_string());
    }

    let (l, r) = match (numeric(left), numeric(right)) {
        (Ok(l), Ok(r)) => (l, r),
        (Err(e), _) | (_, Err(e)) => return FormulaValue::Error(e),
    };
    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide if r == 0.0 => return FormulaValue::Error(CellError::Div0),
        BinaryOperator::Divide => l / r,
        _ => l.powf(r),
    };
    if result.is_finite() {
        FormulaValue::Number(result)
    } else {
        FormulaValue::Error(CellError::Num)
    }
}
