use std::fmt;

/// A spreadsheet error value such as `#DIV/0!`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellError {
    /// `#NULL!`
    Null,
    /// `#DIV/0!`
    Div0,
    /// `#VALUE!`, an operand of the wrong type
    Value,
    /// `#REF!`, a reference that points nowhere
    Ref,
    /// `#NAME?`, an unknown function or name
    Name,
    /// `#NUM!`
    Num,
    /// `#N/A`
    Na,
    /// `#CALC!`, a calculation that could not finish (cycles, runaway nesting)
    Calc,
}

const SPELLINGS: [(CellError, &str); 8] = [
    (CellError::Null, "#NULL!"),
    (CellError::Div0, "#DIV/0!"),
    (CellError::Value, "#VALUE!"),
    (CellError::Ref, "#REF!"),
    (CellError::Name, "#NAME?"),
    (CellError::Num, "#NUM!"),
    (CellError::Na, "#N/A"),
    (CellError::Calc, "#CALC!"),
];

impl CellError {
    /// How the error is written in a cell or formula
    pub fn as_str(self) -> &'static str {
        SPELLINGS
            .iter()
            .find(|(e, _)| *e == self)
            .map_or("#VALUE!", |(_, s)| s)
    }

    /// Read an error literal, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        SPELLINGS
            .iter()
            .find(|(_, spelling)| spelling.eq_ignore_ascii_case(s))
            .map(|(e, _)| *e)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
