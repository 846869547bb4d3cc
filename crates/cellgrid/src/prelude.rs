//! Prelude module - common imports for cellgrid users
//!
//! ```rust
//! use cellgrid::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationStats,
    // Main types
    Cell,
    CellRange,
    CellType,
    // Error types
    Error,
    FormulaError,
    FormulaValue,
    Grid,
    GridOptions,
    Position,
    RecalcMode,
    Result,
};
