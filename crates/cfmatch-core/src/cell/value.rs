//! What a cell holds

use std::fmt;

use super::CellError;

/// Contents of one worksheet cell
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    /// Every number, dates included (as serial numbers)
    Number(f64),
    String(String),
    Error(CellError),
    /// Formula text with the result of its last calculation, if there was one
    Formula {
        text: String,
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// An uncalculated formula cell
    pub fn formula<S: Into<String>>(text: S) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: None,
        }
    }

    /// The value a reader sees: the cached result for formula cells
    pub fn resolved(&self) -> &CellValue {
        match self {
            CellValue::Formula {
                cached_value: Some(cached),
                ..
            } => cached.resolved(),
            other => other,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.resolved() {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self.resolved() {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn formula_text(&self) -> Option<&str> {
        match self {
            CellValue::Formula { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Render the value as a literal that can be spliced into formula text
    ///
    /// Numbers are written bare and booleans as `TRUE`/`FALSE`. Anything else becomes a
    /// double-quoted string with embedded quotes doubled. The value's type decides, so the
    /// text `"12"` stays quoted.
    ///
    /// ```
    /// use cfmatch_core::CellValue;
    ///
    /// assert_eq!(CellValue::Number(12.0).to_formula_literal(), "12");
    /// assert_eq!(CellValue::string("12").to_formula_literal(), "\"12\"");
    /// assert_eq!(CellValue::Boolean(false).to_formula_literal(), "FALSE");
    /// ```
    pub fn to_formula_literal(&self) -> String {
        match self.resolved() {
            CellValue::Number(n) => format_number(*n),
            CellValue::Boolean(b) => bool_text(*b).to_string(),
            CellValue::String(s) => quote_text(s),
            CellValue::Error(e) => quote_text(e.as_str()),
            CellValue::Empty | CellValue::Formula { .. } => quote_text(""),
        }
    }
}

fn bool_text(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Format a number the way it would be typed into a formula
///
/// Whole numbers lose their fraction (`5`, not `5.0`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

/// Wrap text in double quotes, doubling any quotes inside it
pub fn quote_text(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolved() {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => f.write_str(bool_text(*b)),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::String(s) => f.write_str(s),
            CellValue::Error(e) => fmt::Display::fmt(e, f),
            CellValue::Formula { text, .. } => f.write_str(text),
        }
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(impl From<$t> for CellValue {
            fn from(n: $t) -> Self {
                CellValue::Number(f64::from(n))
            }
        })*
    };
}

number_from!(f64, f32, i32, u32, i16, u16, u8);

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}
