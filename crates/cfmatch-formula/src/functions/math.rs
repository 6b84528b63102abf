//! Math functions

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;
use cfmatch_core::CellError;

/// Numeric scalar argument; blanks count as 0, numeric text is coerced
fn number_arg(v: &FormulaValue) -> Result<f64, FormulaValue> {
    match v {
        FormulaValue::Error(e) => Err(FormulaValue::Error(*e)),
        FormulaValue::Array(_) => Err(FormulaValue::Error(CellError::Value)),
        v => v.as_number().ok_or(FormulaValue::Error(CellError::Value)),
    }
}

macro_rules! try_num {
    ($e:expr) => {
        match number_arg($e) {
            Ok(n) => n,
            Err(err) => return Ok(err),
        }
    };
}

/// Numbers of every argument, in order
///
/// Direct arguments are coerced; range cells contribute only when they hold a number.
/// The first error wins.
fn collect_numbers(args: &[FormulaValue]) -> Result<Vec<f64>, CellError> {
    let mut numbers = Vec::new();
    for arg in args {
        match arg {
            FormulaValue::Error(e) => return Err(*e),
            FormulaValue::Array(rows) => {
                for cell in rows.iter().flatten() {
                    match cell {
                        FormulaValue::Number(n) => numbers.push(*n),
                        FormulaValue::Error(e) => return Err(*e),
                        _ => {}
                    }
                }
            }
            FormulaValue::Empty => {}
            v => numbers.push(v.as_number().ok_or(CellError::Value)?),
        }
    }
    Ok(numbers)
}

/// Apply `reduce` to the collected numbers, turning a collection error into its value
fn aggregate(
    args: &[FormulaValue],
    reduce: impl FnOnce(&[f64]) -> FormulaValue,
) -> FormulaResult<FormulaValue> {
    Ok(match collect_numbers(args) {
        Ok(numbers) => reduce(&numbers),
        Err(e) => FormulaValue::Error(e),
    })
}

pub fn fn_sum(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    aggregate(args, |ns| FormulaValue::Number(ns.iter().sum()))
}

/// AVERAGE: `#DIV/0!` when nothing numeric was given
pub fn fn_average(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    aggregate(args, |ns| match ns.len() {
        0 => FormulaValue::Error(CellError::Div0),
        len => FormulaValue::Number(ns.iter().sum::<f64>() / len as f64),
    })
}

/// MIN and MAX read 0 when nothing numeric was given
pub fn fn_min(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    aggregate(args, |ns| {
        FormulaValue::Number(ns.iter().copied().reduce(f64::min).unwrap_or(0.0))
    })
}

pub fn fn_max(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    aggregate(args, |ns| {
        FormulaValue::Number(ns.iter().copied().reduce(f64::max).unwrap_or(0.0))
    })
}

/// ABS(number)
pub fn fn_abs(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let n = try_num!(&args[0]);
    Ok(FormulaValue::Number(n.abs()))
}

/// MOD(number, divisor) - Returns the remainder after division
/// Uses number - divisor * floor(number/divisor), so the result takes the divisor's sign
/// (unlike Rust's % operator)
pub fn fn_mod(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_num!(&args[0]);
    let divisor = try_num!(&args[1]);

    if divisor == 0.0 {
        return Ok(FormulaValue::Error(CellError::Div0));
    }

    Ok(FormulaValue::Number(
        number - divisor * (number / divisor).floor(),
    ))
}

/// INT(number) - Rounds toward negative infinity
pub fn fn_int(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let n = try_num!(&args[0]);
    Ok(FormulaValue::Number(n.floor()))
}

/// ROUND(number, num_digits) - Rounds half away from zero
pub fn fn_round(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_num!(&args[0]);
    let num_digits = try_num!(&args[1]).trunc() as i32;

    let multiplier = 10_f64.powi(num_digits);
    let result = if number >= 0.0 {
        (number * multiplier + 0.5).floor() / multiplier
    } else {
        (number * multiplier - 0.5).ceil() / multiplier
    };

    Ok(FormulaValue::Number(result))
}

/// ROUNDDOWN(number, num_digits) - Rounds a number down, toward zero
pub fn fn_rounddown(
    args: &[FormulaValue],
    _ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let number = try_num!(&args[0]);
    let num_digits = try_num!(&args[1]).trunc() as i32;

    let multiplier = 10_f64.powi(num_digits);
    Ok(FormulaValue::Number((number * multiplier).trunc() / multiplier))
}

/// FLOOR(number, significance) - Rounds down to a multiple of significance
///
/// A zero significance is `#DIV/0!`; a positive number with a negative significance is
/// `#NUM!`. When both are negative the result rounds toward zero.
pub fn fn_floor(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = try_num!(&args[0]);
    let significance = try_num!(&args[1]);

    if significance == 0.0 {
        return Ok(if number == 0.0 {
            FormulaValue::Number(0.0)
        } else {
            FormulaValue::Error(CellError::Div0)
        });
    }
    if number > 0.0 && significance < 0.0 {
        return Ok(FormulaValue::Error(CellError::Num));
    }

    let result = if number < 0.0 && significance < 0.0 {
        -((number / significance).floor() * -significance)
    } else {
        (number / significance).floor() * significance
    };

    Ok(FormulaValue::Number(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: f64) -> FormulaValue {
        FormulaValue::Number(v)
    }

    fn call(
        f: fn(&[FormulaValue], &EvaluationContext) -> FormulaResult<FormulaValue>,
        args: &[FormulaValue],
    ) -> FormulaValue {
        f(args, &EvaluationContext::simple()).unwrap()
    }

    #[test]
    fn test_floor() {
        assert_eq!(call(fn_floor, &[n(45366.75), n(1.0)]), n(45366.0));
        assert_eq!(call(fn_floor, &[n(7.0), n(5.0)]), n(5.0));
        assert_eq!(call(fn_floor, &[n(-2.5), n(2.0)]), n(-4.0));
        assert_eq!(call(fn_floor, &[n(-2.5), n(-2.0)]), n(-2.0));
        assert_eq!(
            call(fn_floor, &[n(2.5), n(-2.0)]),
            FormulaValue::Error(CellError::Num)
        );
        assert_eq!(
            call(fn_floor, &[n(2.5), n(0.0)]),
            FormulaValue::Error(CellError::Div0)
        );
        assert_eq!(
            call(fn_floor, &[FormulaValue::String("soon".into()), n(1.0)]),
            FormulaValue::Error(CellError::Value)
        );
    }

    #[test]
    fn test_rounddown_and_round() {
        assert_eq!(call(fn_rounddown, &[n(3.99), n(0.0)]), n(3.0));
        assert_eq!(call(fn_rounddown, &[n(-3.99), n(0.0)]), n(-3.0));
        assert_eq!(call(fn_rounddown, &[n(3.14159), n(2.0)]), n(3.14));
        assert_eq!(call(fn_round, &[n(2.5), n(0.0)]), n(3.0));
        assert_eq!(call(fn_round, &[n(-2.5), n(0.0)]), n(-3.0));
    }

    #[test]
    fn test_mod_sign_follows_divisor() {
        assert_eq!(call(fn_mod, &[n(-3.0), n(2.0)]), n(1.0));
        assert_eq!(call(fn_mod, &[n(3.0), n(-2.0)]), n(-1.0));
        assert_eq!(
            call(fn_mod, &[n(3.0), n(0.0)]),
            FormulaValue::Error(CellError::Div0)
        );
    }

    #[test]
    fn test_min_max_over_ranges() {
        let range = FormulaValue::Array(vec![
            vec![n(3.0), FormulaValue::String("skip".into())],
            vec![FormulaValue::Empty, n(10.0)],
        ]);
        assert_eq!(call(fn_min, &[range.clone()]), n(3.0));
        assert_eq!(call(fn_max, &[range.clone(), n(12.0)]), n(12.0));
        assert_eq!(call(fn_sum, &[range]), n(13.0));
        assert_eq!(call(fn_min, &[n(10.0), n(3.0)]), n(3.0));
    }

    #[test]
    fn test_aggregates_reject_direct_text() {
        assert_eq!(
            call(fn_max, &[n(1.0), FormulaValue::String("abc".into())]),
            FormulaValue::Error(CellError::Value)
        );
        assert_eq!(
            call(fn_average, &[FormulaValue::Array(vec![])]),
            FormulaValue::Error(CellError::Div0)
        );
    }

    #[test]
    fn test_abs_int() {
        assert_eq!(call(fn_abs, &[n(-4.0)]), n(4.0));
        assert_eq!(call(fn_abs, &[FormulaValue::Empty]), n(0.0));
        assert_eq!(call(fn_int, &[n(-1.5)]), n(-2.0));
    }
}
