//! Error types for rule matching and rule building

use thiserror::Error;

/// Result type for matching operations
pub type Result<T> = std::result::Result<T, MatchError>;

/// Errors raised while anchoring or compiling a conditional-formatting rule
///
/// Only construction of a matcher reports these to the caller; during per-cell
/// evaluation every failure reads as "no match".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    /// A cell or range token that is not a valid A1 reference
    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    /// Condition text that cannot be split into literal and formula parts
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// A rule kind or rule shape with no formula template
    #[error("Unsupported rule: {0}")]
    UnsupportedRule(String),

    /// Sheet index out of bounds
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetOutOfBounds(usize, usize),
}

impl From<cfmatch_core::Error> for MatchError {
    fn from(err: cfmatch_core::Error) -> Self {
        match err {
            cfmatch_core::Error::SheetOutOfBounds(index, count) => {
                MatchError::SheetOutOfBounds(index, count)
            }
            other => MatchError::MalformedReference(other.to_string()),
        }
    }
}

/// Result type for the rule-builder wizards
pub type WizardResult<T> = std::result::Result<T, WizardError>;

/// Errors raised by the rule-builder wizards
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WizardError {
    /// The wizard's cell range could not be parsed
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// `from_conditional` was handed a rule of another family
    #[error("Rule is not {expected} rule (found {found})")]
    WrongRuleType {
        expected: &'static str,
        found: &'static str,
    },

    /// The builder is missing a required piece (operator, operand, text)
    #[error("Incomplete rule: {0}")]
    Incomplete(String),

    /// Operand text could not be adjusted onto the range
    #[error("Match error: {0}")]
    Match(#[from] MatchError),
}

impl From<cfmatch_core::Error> for WizardError {
    fn from(err: cfmatch_core::Error) -> Self {
        WizardError::InvalidRange(err.to_string())
    }
}
