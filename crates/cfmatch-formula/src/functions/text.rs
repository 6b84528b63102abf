//! Text functions

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::value::FormulaValue;
use cfmatch_core::CellError;

/// Text of a scalar argument; errors pass through and ranges are `#VALUE!`
fn text_arg(v: &FormulaValue) -> Result<String, FormulaValue> {
    match v {
        FormulaValue::Error(e) => Err(FormulaValue::Error(*e)),
        FormulaValue::Array(_) => Err(FormulaValue::Error(CellError::Value)),
        v => Ok(v.as_string()),
    }
}

/// Optional character count argument (LEFT/RIGHT), defaulting to 1
fn count_arg(v: Option<&FormulaValue>) -> Result<usize, FormulaValue> {
    let n = match v {
        None => 1,
        Some(FormulaValue::Error(e)) => return Err(FormulaValue::Error(*e)),
        Some(v) => v.as_number().map(|n| n.trunc() as i64).unwrap_or(-1),
    };
    if n < 0 {
        return Err(FormulaValue::Error(CellError::Value));
    }
    Ok(n as usize)
}

macro_rules! try_arg {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(err) => return Ok(err),
        }
    };
}

/// LEN(text)
pub fn fn_len(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let s = try_arg!(text_arg(&args[0]));
    Ok(FormulaValue::Number(s.chars().count() as f64))
}

/// LEFT(text, [num_chars])
pub fn fn_left(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let s = try_arg!(text_arg(&args[0]));
    let n = try_arg!(count_arg(args.get(1)));
    Ok(FormulaValue::String(s.chars().take(n).collect()))
}

/// RIGHT(text, [num_chars])
pub fn fn_right(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let s = try_arg!(text_arg(&args[0]));
    let n = try_arg!(count_arg(args.get(1)));
    let len = s.chars().count();
    Ok(FormulaValue::String(s.chars().skip(len.saturating_sub(n)).collect()))
}

/// MID(text, start_num, num_chars)
pub fn fn_mid(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let s = try_arg!(text_arg(&args[0]));

    let mut ints = [0i64; 2];
    for (slot, v) in ints.iter_mut().zip(&args[1..3]) {
        if let FormulaValue::Error(e) = v {
            return Ok(FormulaValue::Error(*e));
        }
        *slot = v.as_number().map(|n| n.trunc() as i64).unwrap_or(-1);
    }
    let [start, count] = ints;

    if start < 1 || count < 0 {
        return Ok(FormulaValue::Error(CellError::Value));
    }

    Ok(FormulaValue::String(
        s.chars()
            .skip(start as usize - 1)
            .take(count as usize)
            .collect(),
    ))
}

/// LOWER(text)
pub fn fn_lower(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let s = try_arg!(text_arg(&args[0]));
    Ok(FormulaValue::String(s.to_lowercase()))
}

/// UPPER(text)
pub fn fn_upper(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let s = try_arg!(text_arg(&args[0]));
    Ok(FormulaValue::String(s.to_uppercase()))
}

/// TRIM(text) - strips leading/trailing spaces and collapses inner runs to one
pub fn fn_trim(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let s = try_arg!(text_arg(&args[0]));
    Ok(FormulaValue::String(
        s.split_whitespace().collect::<Vec<_>>().join(" "),
    ))
}

/// Shared FIND/SEARCH: 1-based character position of `find` in `within`, or `#VALUE!`.
/// The caller has already rejected error and range operands.
fn locate(args: &[FormulaValue], case_sensitive: bool) -> FormulaValue {
    let mut find_text = args[0].as_string();
    let mut within_text = args[1].as_string();

    let start_num = match args.get(2) {
        Some(FormulaValue::Number(n)) if *n >= 1.0 => *n as usize,
        Some(FormulaValue::Error(e)) => return FormulaValue::Error(*e),
        Some(FormulaValue::Empty) | None => 1,
        _ => return FormulaValue::Error(CellError::Value),
    };

    let within_len = within_text.chars().count();
    if start_num > within_len.max(1) {
        return FormulaValue::Error(CellError::Value);
    }

    if !case_sensitive {
        find_text = find_text.to_lowercase();
        within_text = within_text.to_lowercase();
    }

    let search_start = start_num - 1;
    let search_str: String = within_text.chars().skip(search_start).collect();

    match search_str.find(&find_text) {
        Some(byte_pos) => {
            let char_pos = search_str[..byte_pos].chars().count();
            FormulaValue::Number((search_start + char_pos + 1) as f64)
        }
        None => FormulaValue::Error(CellError::Value),
    }
}

fn first_error(args: &[FormulaValue]) -> Option<FormulaValue> {
    args.iter().take(2).find_map(|v| match v {
        FormulaValue::Error(e) => Some(FormulaValue::Error(*e)),
        FormulaValue::Array(_) => Some(FormulaValue::Error(CellError::Value)),
        _ => None,
    })
}

/// FIND(find_text, within_text, [start_num]) - case-sensitive position of find_text
pub fn fn_find(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    if let Some(err) = first_error(args) {
        return Ok(err);
    }
    Ok(locate(args, true))
}

/// SEARCH(find_text, within_text, [start_num]) - case-insensitive position of find_text
pub fn fn_search(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    if let Some(err) = first_error(args) {
        return Ok(err);
    }
    Ok(locate(args, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> FormulaValue {
        FormulaValue::String(v.into())
    }

    fn call(
        f: fn(&[FormulaValue], &EvaluationContext) -> FormulaResult<FormulaValue>,
        args: &[FormulaValue],
    ) -> FormulaValue {
        f(args, &EvaluationContext::simple()).unwrap()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        assert_eq!(
            call(fn_search, &[s("PIE"), s("apple pie")]),
            FormulaValue::Number(7.0)
        );
        assert_eq!(
            call(fn_find, &[s("PIE"), s("apple pie")]),
            FormulaValue::Error(CellError::Value)
        );
        assert_eq!(
            call(fn_search, &[s("x"), FormulaValue::Empty]),
            FormulaValue::Error(CellError::Value)
        );
    }

    #[test]
    fn test_search_start_position() {
        assert_eq!(
            call(fn_search, &[s("a"), s("banana"), FormulaValue::Number(3.0)]),
            FormulaValue::Number(4.0)
        );
        assert_eq!(
            call(fn_search, &[s("a"), s("banana"), FormulaValue::Number(9.0)]),
            FormulaValue::Error(CellError::Value)
        );
    }

    #[test]
    fn test_search_in_number() {
        assert_eq!(
            call(fn_search, &[s("3"), FormulaValue::Number(1234.0)]),
            FormulaValue::Number(3.0)
        );
    }

    #[test]
    fn test_search_propagates_errors() {
        assert_eq!(
            call(fn_search, &[s("a"), FormulaValue::Error(CellError::Div0)]),
            FormulaValue::Error(CellError::Div0)
        );
    }

    #[test]
    fn test_left_right_mid() {
        assert_eq!(call(fn_left, &[s("abcdef"), FormulaValue::Number(2.0)]), s("ab"));
        assert_eq!(call(fn_left, &[s("abcdef")]), s("a"));
        assert_eq!(call(fn_right, &[s("abcdef"), FormulaValue::Number(3.0)]), s("def"));
        assert_eq!(call(fn_right, &[s("ab"), FormulaValue::Number(5.0)]), s("ab"));
        assert_eq!(
            call(
                fn_mid,
                &[s("abcdef"), FormulaValue::Number(2.0), FormulaValue::Number(3.0)]
            ),
            s("bcd")
        );
        assert_eq!(
            call(fn_left, &[s("abc"), FormulaValue::Number(-1.0)]),
            FormulaValue::Error(CellError::Value)
        );
    }

    #[test]
    fn test_len_trim_case() {
        assert_eq!(call(fn_len, &[s("héllo")]), FormulaValue::Number(5.0));
        assert_eq!(call(fn_len, &[FormulaValue::Empty]), FormulaValue::Number(0.0));
        assert_eq!(call(fn_trim, &[s("  a   b  ")]), s("a b"));
        assert_eq!(call(fn_upper, &[s("AbC")]), s("ABC"));
        assert_eq!(call(fn_lower, &[s("AbC")]), s("abc"));
    }
}
