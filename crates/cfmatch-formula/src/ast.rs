//! Formula syntax tree

use cfmatch_core::{CellAddress, CellError, CellRange};

/// A parsed formula
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    Literal(Literal),
    Reference(Reference),
    /// Defined name; none are defined, so these evaluate to `#NAME?`
    Name(String),
    Unary {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Function call; `name` is upper-cased
    Call {
        name: String,
        args: Vec<FormulaExpr>,
    },
}

impl FormulaExpr {
    pub fn number(n: f64) -> Self {
        FormulaExpr::Literal(Literal::Number(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        FormulaExpr::Literal(Literal::Text(s.into()))
    }

    pub fn binary(op: BinaryOperator, left: FormulaExpr, right: FormulaExpr) -> Self {
        FormulaExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, operand: FormulaExpr) -> Self {
        FormulaExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

/// Constant written into the formula
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(CellError),
}

/// `A1`, `$B$2:C9`, `Data!A1` or `'My Sheet'!A1:A5`
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Sheet name without quotes or `!`
    pub sheet: Option<String>,
    pub area: Area,
}

/// What a reference covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Area {
    Cell(CellAddress),
    Range(CellRange),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Concat,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl BinaryOperator {
    /// Left and right binding power; all operators associate to the left
    pub(crate) fn binding_power(self) -> (u8, u8) {
        match self {
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::LessThan
            | BinaryOperator::LessEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterEqual => (1, 2),
            BinaryOperator::Concat => (3, 4),
            BinaryOperator::Add | BinaryOperator::Subtract => (5, 6),
            BinaryOperator::Multiply | BinaryOperator::Divide => (7, 8),
            BinaryOperator::Power => (9, 10),
        }
    }

    pub fn is_comparison(self) -> bool {
        self.binding_power().0 == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Percent,
}
