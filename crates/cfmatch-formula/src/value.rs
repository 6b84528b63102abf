//! Values produced while evaluating a formula

use std::cmp::Ordering;

use cfmatch_core::cell::format_number;
use cfmatch_core::{CellError, CellValue};

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Error(CellError),
    /// Values of a range reference, row by row
    Array(Vec<Vec<FormulaValue>>),
    Empty,
}

impl FormulaValue {
    /// Numeric reading of the value; text counts when it parses as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            FormulaValue::String(s) => s.trim().parse().ok(),
            FormulaValue::Empty => Some(0.0),
            FormulaValue::Error(_) | FormulaValue::Array(_) => None,
        }
    }

    /// Truth value, as IF and AND read their arguments
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormulaValue::Boolean(b) => Some(*b),
            FormulaValue::Number(n) => Some(*n != 0.0),
            FormulaValue::String(s) if s.eq_ignore_ascii_case("TRUE") => Some(true),
            FormulaValue::String(s) if s.eq_ignore_ascii_case("FALSE") => Some(false),
            _ => None,
        }
    }

    /// Text as `&` and the text functions see it
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            FormulaValue::Error(e) => e.as_str().to_string(),
            FormulaValue::Array(_) => CellError::Value.as_str().to_string(),
            FormulaValue::Empty => String::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FormulaValue::Error(_))
    }

    pub fn error(&self) -> Option<CellError> {
        match self {
            FormulaValue::Error(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<CellValue> for FormulaValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Empty => FormulaValue::Empty,
            CellValue::Number(n) => FormulaValue::Number(n),
            CellValue::String(s) => FormulaValue::String(s.as_str().to_string()),
            CellValue::Boolean(b) => FormulaValue::Boolean(b),
            CellValue::Error(e) => FormulaValue::Error(e),
            // A formula cell nobody calculated reads as blank
            CellValue::Formula { cached_value, .. } => match cached_value {
                Some(cached) => (*cached).into(),
                None => FormulaValue::Empty,
            },
        }
    }
}

impl From<FormulaValue> for CellValue {
    fn from(value: FormulaValue) -> Self {
        match value {
            FormulaValue::Empty => CellValue::Empty,
            FormulaValue::Number(n) => CellValue::Number(n),
            FormulaValue::String(s) => CellValue::string(s),
            FormulaValue::Boolean(b) => CellValue::Boolean(b),
            FormulaValue::Error(e) => CellValue::Error(e),
            FormulaValue::Array(_) => CellValue::Error(CellError::Value),
        }
    }
}

impl From<f64> for FormulaValue {
    fn from(n: f64) -> Self {
        FormulaValue::Number(n)
    }
}

impl From<bool> for FormulaValue {
    fn from(b: bool) -> Self {
        FormulaValue::Boolean(b)
    }
}

impl From<&str> for FormulaValue {
    fn from(s: &str) -> Self {
        FormulaValue::String(s.to_string())
    }
}

/// Spreadsheet ordering of two values
///
/// A blank takes the type of the other side (`0`, `""` or `FALSE`). Text compares without
/// regard to case, and across types every number sorts below every text, which sorts
/// below every boolean.
pub fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Ordering {
    let left = blank_as(left, right);
    let right = blank_as(right, &left);

    match (&left, &right) {
        (FormulaValue::Number(l), FormulaValue::Number(r)) => {
            l.partial_cmp(r).unwrap_or(Ordering::Equal)
        }
        (FormulaValue::String(l), FormulaValue::String(r)) => {
            l.to_lowercase().cmp(&r.to_lowercase())
        }
        (FormulaValue::Boolean(l), FormulaValue::Boolean(r)) => l.cmp(r),
        _ => type_rank(&left).cmp(&type_rank(&right)),
    }
}

fn type_rank(value: &FormulaValue) -> u8 {
    match value {
        FormulaValue::Number(_) => 0,
        FormulaValue::String(_) => 1,
        FormulaValue::Boolean(_) => 2,
        // Errors and arrays never reach a comparison operator; rank them together
        _ => 3,
    }
}

fn blank_as(value: &FormulaValue, other: &FormulaValue) -> FormulaValue {
    match (value, other) {
        (FormulaValue::Empty, FormulaValue::String(_)) => FormulaValue::String(String::new()),
        (FormulaValue::Empty, FormulaValue::Boolean(_)) => FormulaValue::Boolean(false),
        (FormulaValue::Empty, _) => FormulaValue::Number(0.0),
        (v, _) => v.clone(),
    }
}
