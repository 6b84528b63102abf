//! # cfmatch-formula
//!
//! Formula parser, evaluator and calculation engine for cfmatch.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → value) against any [`CellSource`]
//! - The built-in functions conditional formatting relies on
//! - [`Calculation`], a per-workbook [`FormulaEngine`] that calculates formula cells on
//!   demand
//!
//! ## Example
//!
//! ```rust
//! use cfmatch_core::Workbook;
//! use cfmatch_formula::{evaluate, parse_formula, EvaluationContext, FormulaValue};
//!
//! let mut workbook = Workbook::new();
//! workbook.worksheet_mut(0).unwrap().set_cell_value("B2", 3.0).unwrap();
//!
//! let ast = parse_formula("=ISODD(B2)").unwrap();
//! let ctx = EvaluationContext::new(&workbook, 0);
//! assert_eq!(evaluate(&ast, &ctx).unwrap(), FormulaValue::Boolean(true));
//! ```

pub mod ast;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod functions;
mod lexer;
pub mod parser;
pub mod value;

pub use ast::{Area, BinaryOperator, FormulaExpr, Literal, Reference, UnaryOperator};
pub use engine::{Calculation, CalculationOptions, FormulaEngine};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, CellSource, EvaluationContext};
pub use parser::parse_formula;
pub use value::{compare_values, FormulaValue};
