//! Rule compiler: one conditional-formatting rule, one target cell, one formula
//!
//! Every rule kind with a template compiles into a formula (without the leading `=`)
//! whose truth value decides the match:
//!
//! | rule                | formula                                              |
//! |---------------------|------------------------------------------------------|
//! | cell is `op` c      | `<value><op>(<c>)`                                   |
//! | between a, b        | `AND(<value>>=lo,<value><=hi)`                       |
//! | contains text t     | `NOT(ISERROR(SEARCH("t",<ref>)))`                    |
//! | begins with t       | `LEFT(<ref>,LEN("t"))="t"`                           |
//! | blanks              | `LEN(TRIM(<ref>))=0`                                 |
//! | errors              | `ISERROR(<ref>)`                                     |
//! | today               | `FLOOR(<ref>,1)=TODAY()`                             |
//! | expression e        | `e`, references anchored on the target               |
//!
//! `<value>` is the target's value as a formula literal and `<ref>` the target's own
//! address.

use cfmatch_core::cell::quote_text;
use cfmatch_core::{CellAddress, CellValue, CfOperator, CfRuleType, ConditionalFormatRule, TimePeriod};

use crate::error::{MatchError, Result};
use crate::reference::{rewrite, shift_references};

/// Compile `rule`, anchored at `anchor`, into the formula that decides whether it matches
/// `target` (whose current value is `target_value`)
///
/// ```
/// use cfmatch::compiler::compile;
/// use cfmatch_core::{CellAddress, CellValue, ConditionalFormatRule};
///
/// let rule = ConditionalFormatRule::cell_is_greater_than("B1");
/// let formula = compile(
///     &rule,
///     CellAddress::new(1, 1),
///     CellAddress::new(3, 1),
///     &CellValue::Number(12.0),
/// )
/// .unwrap();
/// assert_eq!(formula, "12>(B3)");
/// ```
pub fn compile(
    rule: &ConditionalFormatRule,
    anchor: CellAddress,
    target: CellAddress,
    target_value: &CellValue,
) -> Result<String> {
    let cell_ref = target.to_relative().to_a1_string();
    let value = target_value.to_formula_literal();

    match &rule.rule_type {
        CfRuleType::CellIs {
            operator,
            conditions,
        } => {
            if operator.is_range() {
                compile_range(*operator, conditions, anchor, target, &value)
            } else {
                compile_comparison(*operator, conditions, anchor, target, &value)
            }
        }

        CfRuleType::ContainsText { text } => Ok(format!(
            "NOT(ISERROR(SEARCH({},{})))",
            quote_text(text),
            cell_ref
        )),
        CfRuleType::NotContainsText { text } => {
            Ok(format!("ISERROR(SEARCH({},{}))", quote_text(text), cell_ref))
        }
        CfRuleType::BeginsWith { text } => {
            let t = quote_text(text);
            Ok(format!("LEFT({},LEN({}))={}", cell_ref, t, t))
        }
        CfRuleType::EndsWith { text } => {
            let t = quote_text(text);
            Ok(format!("RIGHT({},LEN({}))={}", cell_ref, t, t))
        }

        CfRuleType::ContainsBlanks => Ok(format!("LEN(TRIM({}))=0", cell_ref)),
        CfRuleType::NotContainsBlanks => Ok(format!("LEN(TRIM({}))>0", cell_ref)),
        CfRuleType::ContainsErrors => Ok(format!("ISERROR({})", cell_ref)),
        CfRuleType::NotContainsErrors => Ok(format!("NOT(ISERROR({}))", cell_ref)),

        CfRuleType::TimePeriod { period } => Ok(time_period_formula(*period, &cell_ref)),

        CfRuleType::Expression { formula } => compile_expression(formula, anchor, target, &value),

        other => Err(MatchError::UnsupportedRule(format!(
            "no formula template for {} rules",
            other.type_name()
        ))),
    }
}

fn compile_comparison(
    operator: CfOperator,
    conditions: &[String],
    anchor: CellAddress,
    target: CellAddress,
    value: &str,
) -> Result<String> {
    let symbol = operator
        .symbol()
        .ok_or_else(|| MatchError::UnsupportedRule(format!("operator {}", operator.name())))?;
    let condition = conditions.last().ok_or_else(|| {
        MatchError::UnsupportedRule(format!("{} rule without a condition", operator.name()))
    })?;

    // The condition is a whole formula; `5>(B1=1)` compares against its result
    let condition = shift_references(strip_equals(condition), anchor, target)?;
    Ok(format!("{}{}({})", value, symbol, condition))
}

fn compile_range(
    operator: CfOperator,
    conditions: &[String],
    anchor: CellAddress,
    target: CellAddress,
    value: &str,
) -> Result<String> {
    let [first, second] = conditions else {
        return Err(MatchError::UnsupportedRule(format!(
            "{} needs exactly two bounds, got {}",
            operator.name(),
            conditions.len()
        )));
    };

    let a = shift_references(strip_equals(first), anchor, target)?;
    let b = shift_references(strip_equals(second), anchor, target)?;

    if a.starts_with('"') || b.starts_with('"') {
        return Err(MatchError::UnsupportedRule(format!(
            "{} with a text bound",
            operator.name()
        )));
    }

    let (lo, hi) = match (numeric_literal(&a), numeric_literal(&b)) {
        (Some(x), Some(y)) if x > y => (b, a),
        (Some(_), Some(_)) => (a, b),
        // The engine orders bounds it has to calculate
        _ => (format!("MIN({},{})", a, b), format!("MAX({},{})", a, b)),
    };

    let between = format!("AND({v}>={lo},{v}<={hi})", v = value, lo = lo, hi = hi);
    Ok(match operator {
        CfOperator::NotBetween => format!("NOT({})", between),
        _ => between,
    })
}

/// Free expression: references move onto the target, and the anchor cell itself
/// (unlocked, on the evaluating sheet, outside a range) stands for the target's value
fn compile_expression(
    formula: &str,
    anchor: CellAddress,
    target: CellAddress,
    value: &str,
) -> Result<String> {
    rewrite(strip_equals(formula), anchor, target, |r, d_col, d_row| {
        if r.is_single_cell() && r.address.same_cell(&anchor) {
            value.to_string()
        } else {
            r.shifted_text(d_col, d_row)
        }
    })
}

fn time_period_formula(period: TimePeriod, cell_ref: &str) -> String {
    let r = cell_ref;
    match period {
        TimePeriod::Yesterday => format!("FLOOR({r},1)=TODAY()-1"),
        TimePeriod::Today => format!("FLOOR({r},1)=TODAY()"),
        TimePeriod::Tomorrow => format!("FLOOR({r},1)=TODAY()+1"),
        TimePeriod::Last7Days => {
            format!("AND(TODAY()-FLOOR({r},1)<=6,FLOOR({r},1)<=TODAY())")
        }
        TimePeriod::ThisWeek => format!(
            "AND(TODAY()-ROUNDDOWN({r},0)<=WEEKDAY(TODAY())-1,ROUNDDOWN({r},0)-TODAY()<=7-WEEKDAY(TODAY()))"
        ),
        TimePeriod::LastWeek => format!(
            "AND(TODAY()-ROUNDDOWN({r},0)>=(WEEKDAY(TODAY())),TODAY()-ROUNDDOWN({r},0)<(WEEKDAY(TODAY())+7))"
        ),
        TimePeriod::NextWeek => format!(
            "AND(ROUNDDOWN({r},0)-TODAY()>(7-WEEKDAY(TODAY())),ROUNDDOWN({r},0)-TODAY()<(15-WEEKDAY(TODAY())))"
        ),
        TimePeriod::ThisMonth => {
            format!("AND(MONTH({r})=MONTH(TODAY()),YEAR({r})=YEAR(TODAY()))")
        }
        TimePeriod::LastMonth => format!(
            "AND(MONTH({r})=MONTH(EDATE(TODAY(),0-1)),YEAR({r})=YEAR(EDATE(TODAY(),0-1)))"
        ),
        TimePeriod::NextMonth => format!(
            "AND(MONTH({r})=MONTH(EDATE(TODAY(),0+1)),YEAR({r})=YEAR(EDATE(TODAY(),0+1)))"
        ),
    }
}

/// The value of a bound written as a plain (optionally negative) number literal
///
/// Anything else, `inf` and `NaN` included, is left for the engine to calculate.
fn numeric_literal(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let literal = unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && unsigned
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !literal {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Condition text is stored without `=`, but tolerate a leading one
fn strip_equals(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('=').unwrap_or(text)
}
