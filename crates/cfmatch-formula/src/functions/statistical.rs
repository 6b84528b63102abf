//! Counting functions

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;
use cfmatch_core::CellError;

use super::criteria::CriteriaMatcher;

/// Every scalar in the arguments, with ranges flattened row by row
fn scalars<'a>(args: &'a [FormulaValue]) -> impl Iterator<Item = &'a FormulaValue> {
    args.iter().flat_map(|arg| -> Box<dyn Iterator<Item = &'a FormulaValue> + 'a> {
        match arg {
            FormulaValue::Array(rows) => Box::new(rows.iter().flatten()),
            v => Box::new(std::iter::once(v)),
        }
    })
}

/// COUNT(value1, [value2], ...) - Counts numeric values
pub fn fn_count(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let count = scalars(args)
        .filter(|v| matches!(v, FormulaValue::Number(_)))
        .count();
    Ok(FormulaValue::Number(count as f64))
}

/// COUNTA(value1, [value2], ...) - Counts non-empty values, errors included
pub fn fn_counta(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let count = scalars(args)
        .filter(|v| !matches!(v, FormulaValue::Empty))
        .count();
    Ok(FormulaValue::Number(count as f64))
}

/// COUNTIF(range, criteria) - Counts cells that meet a criterion
///
/// See [`CriteriaMatcher`] for the criterion syntax. A single cell works as a one-cell
/// range.
pub fn fn_countif(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    if let FormulaValue::Error(e) = &args[0] {
        return Ok(FormulaValue::Error(*e));
    }
    if let FormulaValue::Error(e) = &args[1] {
        return Ok(FormulaValue::Error(*e));
    }
    if matches!(args[1], FormulaValue::Array(_)) {
        return Ok(FormulaValue::Error(CellError::Value));
    }

    let matcher = CriteriaMatcher::new(&args[1]);
    let count = scalars(&args[..1]).filter(|v| matcher.matches(v)).count();
    Ok(FormulaValue::Number(count as f64))
}
