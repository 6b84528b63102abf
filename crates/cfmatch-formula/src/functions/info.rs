//! Information functions

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;
use cfmatch_core::CellError;

fn type_test(
    args: &[FormulaValue],
    test: impl Fn(&FormulaValue) -> bool,
) -> FormulaResult<FormulaValue> {
    let v = &args[0];
    if matches!(v, FormulaValue::Array(_)) {
        return Ok(FormulaValue::Error(CellError::Value));
    }
    Ok(FormulaValue::Boolean(test(v)))
}

/// ISBLANK(value)
pub fn fn_isblank(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    type_test(args, |v| matches!(v, FormulaValue::Empty))
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    type_test(args, |v| matches!(v, FormulaValue::Number(_)))
}

/// ISTEXT(value)
pub fn fn_istext(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    type_test(args, |v| matches!(v, FormulaValue::String(_)))
}

/// ISERROR(value)
pub fn fn_iserror(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    type_test(args, |v| matches!(v, FormulaValue::Error(_)))
}

/// Parity test shared by ISODD/ISEVEN: the number is truncated first, text is `#VALUE!`
fn parity(args: &[FormulaValue], odd: bool) -> FormulaResult<FormulaValue> {
    let n = match &args[0] {
        FormulaValue::Error(e) => return Ok(FormulaValue::Error(*e)),
        FormulaValue::Number(n) => *n,
        FormulaValue::Empty => 0.0,
        FormulaValue::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return Ok(FormulaValue::Error(CellError::Value)),
        },
        _ => return Ok(FormulaValue::Error(CellError::Value)),
    };
    let is_odd = (n.trunc() as i64).rem_euclid(2) == 1;
    Ok(FormulaValue::Boolean(is_odd == odd))
}

/// ISODD(number)
pub fn fn_isodd(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    parity(args, true)
}

/// ISEVEN(number)
pub fn fn_iseven(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    parity(args, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isodd(v: FormulaValue) -> FormulaValue {
        fn_isodd(&[v], &EvaluationContext::simple()).unwrap()
    }

    #[test]
    fn test_isodd_iseven() {
        assert_eq!(isodd(FormulaValue::Number(3.0)), FormulaValue::Boolean(true));
        assert_eq!(isodd(FormulaValue::Number(4.0)), FormulaValue::Boolean(false));
        assert_eq!(isodd(FormulaValue::Number(-3.7)), FormulaValue::Boolean(true));
        assert_eq!(isodd(FormulaValue::Empty), FormulaValue::Boolean(false));
        assert_eq!(
            isodd(FormulaValue::String("abc".into())),
            FormulaValue::Error(CellError::Value)
        );
        assert_eq!(
            fn_iseven(&[FormulaValue::Number(8.0)], &EvaluationContext::simple()).unwrap(),
            FormulaValue::Boolean(true)
        );
    }

    #[test]
    fn test_type_tests() {
        let ctx = EvaluationContext::simple();
        assert_eq!(
            fn_isblank(&[FormulaValue::String(String::new())], &ctx).unwrap(),
            FormulaValue::Boolean(false)
        );
        assert_eq!(
            fn_iserror(&[FormulaValue::Error(CellError::Na)], &ctx).unwrap(),
            FormulaValue::Boolean(true)
        );
        assert_eq!(
            fn_istext(&[FormulaValue::Array(vec![])], &ctx).unwrap(),
            FormulaValue::Error(CellError::Value)
        );
    }
}
