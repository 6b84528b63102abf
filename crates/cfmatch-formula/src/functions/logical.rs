//! Logical functions

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;
use cfmatch_core::CellError;

/// Outcome of folding one argument into AND/OR
enum Fold {
    Continue,
    Stop(FormulaValue),
}

/// Walk every scalar (array cells included), letting `step` short-circuit
fn fold_logical(args: &[FormulaValue], mut step: impl FnMut(bool) -> Fold) -> Option<FormulaValue> {
    for arg in args {
        let cells: Box<dyn Iterator<Item = &FormulaValue>> = match arg {
            FormulaValue::Array(arr) => Box::new(arr.iter().flatten()),
            v => Box::new(std::iter::once(v)),
        };
        for cell in cells {
            let b = match cell {
                FormulaValue::Boolean(b) => *b,
                FormulaValue::Number(n) => *n != 0.0,
                FormulaValue::Error(e) => return Some(FormulaValue::Error(*e)),
                // Text and blanks are skipped
                _ => continue,
            };
            if let Fold::Stop(v) = step(b) {
                return Some(v);
            }
        }
    }
    None
}

/// IF(condition, value_if_true, [value_if_false])
pub fn fn_if(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let condition_bool = match &args[0] {
        FormulaValue::Boolean(b) => *b,
        FormulaValue::Number(n) => *n != 0.0,
        FormulaValue::Empty => false,
        FormulaValue::Error(e) => return Ok(FormulaValue::Error(*e)),
        _ => return Ok(FormulaValue::Error(CellError::Value)),
    };

    if condition_bool {
        Ok(args[1].clone())
    } else {
        Ok(args.get(2).cloned().unwrap_or(FormulaValue::Boolean(false)))
    }
}

/// AND function
pub fn fn_and(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let mut seen = false;
    let stopped = fold_logical(args, |b| {
        seen = true;
        if b {
            Fold::Continue
        } else {
            Fold::Stop(FormulaValue::Boolean(false))
        }
    });

    Ok(match stopped {
        Some(v) => v,
        // AND over nothing but text/blank cells is #VALUE! in Excel
        None if !seen => FormulaValue::Error(CellError::Value),
        None => FormulaValue::Boolean(true),
    })
}

/// OR function
pub fn fn_or(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let mut seen = false;
    let stopped = fold_logical(args, |b| {
        seen = true;
        if b {
            Fold::Stop(FormulaValue::Boolean(true))
        } else {
            Fold::Continue
        }
    });

    Ok(match stopped {
        Some(v) => v,
        None if !seen => FormulaValue::Error(CellError::Value),
        None => FormulaValue::Boolean(false),
    })
}

/// NOT function
pub fn fn_not(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match &args[0] {
        FormulaValue::Boolean(b) => Ok(FormulaValue::Boolean(!b)),
        FormulaValue::Number(n) => Ok(FormulaValue::Boolean(*n == 0.0)),
        FormulaValue::Empty => Ok(FormulaValue::Boolean(true)),
        FormulaValue::Error(e) => Ok(FormulaValue::Error(*e)),
        _ => Ok(FormulaValue::Error(CellError::Value)),
    }
}

/// IFERROR(value, value_if_error) - Returns value_if_error if value is an error, otherwise returns value
pub fn fn_iferror(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match &args[0] {
        FormulaValue::Error(_) => Ok(args[1].clone()),
        value => Ok(value.clone()),
    }
}
