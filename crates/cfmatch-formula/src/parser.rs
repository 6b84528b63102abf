//! Formula parser
//!
//! Precedence climbing over the token stream. From loosest to tightest: comparisons, `&`,
//! `+ -`, `* /`, `^`, prefix `-`/`+`, postfix `%`, then `:` between two cells.

use std::iter::Peekable;
use std::vec::IntoIter;

use cfmatch_core::{CellAddress, CellRange};

use crate::ast::{Area, BinaryOperator, FormulaExpr, Literal, Reference, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Spanned, Token};

const PREFIX_BP: u8 = 11;
const POSTFIX_BP: u8 = 12;

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use cfmatch_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=IF(A1>0,\"Yes\",\"No\")").unwrap();
/// assert!(parse_formula("=1 2").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let body = formula
        .trim()
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("formula must start with '='".into()))?;

    let mut parser = Parser {
        tokens: tokenize(body)?.into_iter().peekable(),
    };
    let expr = parser.expression(0)?;
    match parser.tokens.next() {
        None => Ok(expr),
        Some(extra) => Err(FormulaError::Parse(format!(
            "unexpected {} at {} after a complete expression",
            extra.token, extra.offset
        ))),
    }
}

fn infix_operator(token: &Token) -> Option<BinaryOperator> {
    Some(match token {
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Subtract,
        Token::Star => BinaryOperator::Multiply,
        Token::Slash => BinaryOperator::Divide,
        Token::Caret => BinaryOperator::Power,
        Token::Amp => BinaryOperator::Concat,
        Token::Eq => BinaryOperator::Equal,
        Token::Ne => BinaryOperator::NotEqual,
        Token::Lt => BinaryOperator::LessThan,
        Token::Le => BinaryOperator::LessEqual,
        Token::Gt => BinaryOperator::GreaterThan,
        Token::Ge => BinaryOperator::GreaterEqual,
        _ => return None,
    })
}

fn unexpected(found: Option<Spanned>, wanted: &str) -> FormulaError {
    match found {
        Some(s) => FormulaError::Parse(format!(
            "expected {} but found {} at {}",
            wanted, s.token, s.offset
        )),
        None => FormulaError::Parse(format!("expected {} but the formula ended", wanted)),
    }
}

struct Parser {
    tokens: Peekable<IntoIter<Spanned>>,
}

impl Parser {
    fn eat(&mut self, token: &Token) -> bool {
        self.tokens.next_if(|s| &s.token == token).is_some()
    }

    fn expect(&mut self, token: &Token, wanted: &str) -> FormulaResult<()> {
        match self.tokens.next() {
            Some(s) if &s.token == token => Ok(()),
            other => Err(unexpected(other, wanted)),
        }
    }

    fn expression(&mut self, min_bp: u8) -> FormulaResult<FormulaExpr> {
        let mut left = self.prefix()?;

        while let Some(next) = self.tokens.peek() {
            if next.token == Token::Percent {
                if POSTFIX_BP < min_bp {
                    break;
                }
                self.tokens.next();
                left = FormulaExpr::unary(UnaryOperator::Percent, left);
                continue;
            }

            let Some(op) = infix_operator(&next.token) else {
                break;
            };
            let (left_bp, right_bp) = op.binding_power();
            if left_bp < min_bp {
                break;
            }
            self.tokens.next();
            let right = self.expression(right_bp)?;
            left = FormulaExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn prefix(&mut self) -> FormulaResult<FormulaExpr> {
        if self.eat(&Token::Minus) {
            let operand = self.expression(PREFIX_BP)?;
            return Ok(FormulaExpr::unary(UnaryOperator::Negate, operand));
        }
        if self.eat(&Token::Plus) {
            return self.expression(PREFIX_BP);
        }
        self.primary()
    }

    fn primary(&mut self) -> FormulaResult<FormulaExpr> {
        let Some(Spanned { token, offset }) = self.tokens.next() else {
            return Err(unexpected(None, "a value"));
        };

        Ok(match token {
            Token::Number(n) => FormulaExpr::Literal(Literal::Number(n)),
            Token::Text(s) => FormulaExpr::Literal(Literal::Text(s)),
            Token::Boolean(b) => FormulaExpr::Literal(Literal::Boolean(b)),
            Token::Error(e) => FormulaExpr::Literal(Literal::Error(e)),
            Token::Open => {
                let inner = self.expression(0)?;
                self.expect(&Token::Close, "')'")?;
                inner
            }
            Token::Cell(start) => self.reference(None, start)?,
            Token::Sheet(sheet) => {
                let start = self.cell_after_sheet(&sheet)?;
                self.reference(Some(sheet), start)?
            }
            Token::Function(name) => self.call(name)?,
            Token::Name(name) => FormulaExpr::Name(name),
            other => {
                return Err(unexpected(
                    Some(Spanned {
                        token: other,
                        offset,
                    }),
                    "a value",
                ))
            }
        })
    }

    fn cell_after_sheet(&mut self, sheet: &str) -> FormulaResult<CellAddress> {
        match self.tokens.next() {
            Some(Spanned {
                token: Token::Cell(addr),
                ..
            }) => Ok(addr),
            other => Err(unexpected(other, &format!("a cell after '{}'!", sheet))),
        }
    }

    /// A cell, or a range when a `:` and a second cell follow
    fn reference(&mut self, sheet: Option<String>, start: CellAddress) -> FormulaResult<FormulaExpr> {
        if !self.eat(&Token::Colon) {
            return Ok(FormulaExpr::Reference(Reference {
                sheet,
                area: Area::Cell(start),
            }));
        }

        let end = match self.tokens.next() {
            Some(Spanned {
                token: Token::Cell(end),
                ..
            }) => end,
            // Data!A1:Data!B2 names the sheet on both corners
            Some(Spanned {
                token: Token::Sheet(other),
                offset,
            }) => {
                let same = matches!(&sheet, Some(s) if s.eq_ignore_ascii_case(&other));
                if !same {
                    return Err(FormulaError::Parse(format!(
                        "range ending at {} spans two sheets",
                        offset
                    )));
                }
                self.cell_after_sheet(&other)?
            }
            other => return Err(unexpected(other, "a cell to end the range")),
        };

        Ok(FormulaExpr::Reference(Reference {
            sheet,
            area: Area::Range(CellRange::new(start, end)),
        }))
    }

    fn call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        self.expect(&Token::Open, "'('")?;
        let mut args = Vec::new();
        if !self.eat(&Token::Close) {
            loop {
                args.push(self.expression(0)?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::Close, "',' or ')'")?;
                break;
            }
        }
        Ok(FormulaExpr::Call { name, args })
    }
}
