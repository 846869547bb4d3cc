//! # cellgrid-formula
//!
//! Formula engine for cellgrid.
//!
//! This crate provides:
//! - Lexing of cell text into tokens (literals, operators, addresses, ranges)
//! - Formula parsing (tokens → AST) and cell type classification
//! - Formula evaluation (AST → value) against an [`EvaluationContext`]
//! - A small set of built-in functions
//! - Dependency tracking for recalculation
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_formula::{evaluate, parse_formula, FormulaValue, NoReferences};
//!
//! let ast = parse_formula("=SUM(1, 2) * 2").unwrap();
//! let result = evaluate(&ast, &NoReferences).unwrap();
//! assert_eq!(result, FormulaValue::Number(6.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, format_number, EvaluationContext, FormulaValue, NoReferences};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse_cell_text, parse_formula, ParsedFormula, MAX_NESTING};
