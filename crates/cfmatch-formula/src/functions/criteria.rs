//! Criteria matching for COUNTIF
//!
//! A criterion is either a plain value (`5`, `"apple"`, `TRUE`) or a string that starts
//! with a comparison operator (`">5"`, `"<>banana"`, `"="`). Text equality honours the
//! `*` and `?` wildcards and ignores case; ordering comparisons use the same rules as the
//! formula comparison operators.

use std::cmp::Ordering;

use crate::value::{compare_values, FormulaValue};

/// Parsed COUNTIF criterion
#[derive(Debug)]
pub struct CriteriaMatcher {
    op: CriteriaOp,
    operand: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CriteriaOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

#[derive(Debug)]
enum Operand {
    Number(f64),
    Boolean(bool),
    /// Lowercased pattern, may contain wildcards
    Text(String),
    /// `""` or `"="`: matches empty cells
    Blank,
    /// An error criterion matches nothing
    Never,
}

impl CriteriaMatcher {
    /// Parse a criterion from an evaluated COUNTIF argument
    pub fn new(criteria: &FormulaValue) -> Self {
        let (op, operand) = match criteria {
            FormulaValue::Number(n) => (CriteriaOp::Equal, Operand::Number(*n)),
            FormulaValue::Boolean(b) => (CriteriaOp::Equal, Operand::Boolean(*b)),
            FormulaValue::String(s) => Self::parse_text(s),
            FormulaValue::Empty => (CriteriaOp::Equal, Operand::Blank),
            FormulaValue::Error(_) | FormulaValue::Array(_) => (CriteriaOp::Equal, Operand::Never),
        };
        Self { op, operand }
    }

    fn parse_text(s: &str) -> (CriteriaOp, Operand) {
        let (op, rest) = [
            (">=", CriteriaOp::GreaterEqual),
            ("<=", CriteriaOp::LessEqual),
            ("<>", CriteriaOp::NotEqual),
            (">", CriteriaOp::GreaterThan),
            ("<", CriteriaOp::LessThan),
            ("=", CriteriaOp::Equal),
        ]
        .iter()
        .find_map(|(prefix, op)| s.strip_prefix(prefix).map(|rest| (*op, rest)))
        .unwrap_or((CriteriaOp::Equal, s));

        let operand = if rest.is_empty() {
            Operand::Blank
        } else if let Ok(n) = rest.trim().parse::<f64>() {
            Operand::Number(n)
        } else if rest.eq_ignore_ascii_case("TRUE") {
            Operand::Boolean(true)
        } else if rest.eq_ignore_ascii_case("FALSE") {
            Operand::Boolean(false)
        } else {
            Operand::Text(rest.to_lowercase())
        };
        (op, operand)
    }

    /// Check if a cell value satisfies the criterion
    pub fn matches(&self, value: &FormulaValue) -> bool {
        let is_blank = match value {
            FormulaValue::Empty => true,
            FormulaValue::String(s) => s.is_empty(),
            _ => false,
        };

        match &self.operand {
            Operand::Never => false,
            Operand::Blank => match self.op {
                CriteriaOp::Equal => is_blank,
                CriteriaOp::NotEqual => !is_blank,
                _ => false,
            },
            Operand::Text(pattern) if matches!(self.op, CriteriaOp::Equal | CriteriaOp::NotEqual) => {
                let hit = match value {
                    FormulaValue::String(s) => wildcard_match(pattern, &s.to_lowercase()),
                    _ => false,
                };
                hit == (self.op == CriteriaOp::Equal)
            }
            operand => {
                // Ordering only applies between values of the same kind; `<>` still
                // counts every value of a different kind
                let criterion = match operand {
                    Operand::Number(n) => FormulaValue::Number(*n),
                    Operand::Boolean(b) => FormulaValue::Boolean(*b),
                    Operand::Text(t) => FormulaValue::String(t.clone()),
                    Operand::Blank | Operand::Never => return false,
                };
                if !same_kind(value, &criterion) {
                    return self.op == CriteriaOp::NotEqual;
                }
                let ord = compare_values(value, &criterion);
                match self.op {
                    CriteriaOp::Equal => ord == Ordering::Equal,
                    CriteriaOp::NotEqual => ord != Ordering::Equal,
                    CriteriaOp::LessThan => ord == Ordering::Less,
                    CriteriaOp::LessEqual => ord != Ordering::Greater,
                    CriteriaOp::GreaterThan => ord == Ordering::Greater,
                    CriteriaOp::GreaterEqual => ord != Ordering::Less,
                }
            }
        }
    }
}

fn same_kind(a: &FormulaValue, b: &FormulaValue) -> bool {
    matches!(
        (a, b),
        (FormulaValue::Number(_), FormulaValue::Number(_))
            | (FormulaValue::String(_), FormulaValue::String(_))
            | (FormulaValue::Boolean(_), FormulaValue::Boolean(_))
    )
}

/// Match with wildcards: `*` is any run of characters, `?` a single character
fn wildcard_match(pattern: &str, text: &str) -> bool {
    if !pattern.contains(['*', '?']) {
        return pattern == text;
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    // Last `*` seen, and the text position it currently absorbs up to
    let mut star: Option<(usize, usize)> = None;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }

    pattern[pi..].iter().all(|&c| c == '*')
}
