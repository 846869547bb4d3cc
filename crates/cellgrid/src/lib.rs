//! # cellgrid
//!
//! A spreadsheet cell engine: a fixed-extent grid of cells whose text is
//! either a literal or a small formula language.
//!
//! Cellgrid stores the text a user typed per cell, classifies it, evaluates it
//! (resolving references to other cells on demand) and keeps a formatted
//! computed value for display. Rendering and input handling are left to the
//! host.
//!
//! ## Features
//!
//! - A1-style addressing with bijective base-26 columns
//! - Literals, arithmetic, comparisons and a handful of built-in functions
//! - Cell references and ranges (`=A1+B2`, `=SUM(A1:A10)`)
//! - Circular reference and depth-limit detection
//! - Automatic or manual recalculation of dependents
//! - A per-cell slot for host data that the engine never reads
//!
//! ## Example
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let mut grid = Grid::new();
//!
//! grid.set_raw_at("A1", "2").unwrap();
//! grid.set_raw_at("A2", "3").unwrap();
//! let cell = grid.set_raw_at("A3", "=A1+A2").unwrap();
//!
//! assert_eq!(cell.cell_type(), CellType::Operator);
//! assert_eq!(cell.computed(), Some("5"));
//!
//! // Dependents follow edits
//! grid.set_raw_at("A1", "10").unwrap();
//! assert_eq!(grid.cell_at("A3").unwrap().unwrap().computed(), Some("13"));
//! ```

pub mod calculation;
pub mod cell;
pub mod grid;
pub mod options;
pub mod prelude;

pub use calculation::CalculationStats;
pub use cell::Cell;
pub use grid::Grid;
pub use options::{GridOptions, RecalcMode};

// Re-export core types
pub use cellgrid_core::{
    column_to_letters, format_address, letters_to_column, parse_address, CellRange, CellType,
    Error, Position, Result, UserData, DEFAULT_COLS, DEFAULT_ROWS,
};

// Re-export formula types
pub use cellgrid_formula::{
    evaluate, parse_cell_text, parse_formula, tokenize, EvaluationContext, FormulaError,
    FormulaExpr, FormulaResult, FormulaValue,
};
