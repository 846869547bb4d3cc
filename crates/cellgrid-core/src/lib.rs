//! # cellgrid-core
//!
//! Core data structures for the cellgrid spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout cellgrid:
//! - [`Position`] and the A1 address codec ([`parse_address`], [`format_address`])
//! - [`CellRange`] - rectangular ranges such as `A1:B10`
//! - [`CellType`] - the coarse classification of a cell's text
//! - [`UserData`] - an opaque per-cell slot for the presentation layer
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_core::{format_address, parse_address, Position};
//!
//! let pos = parse_address("AB12").unwrap();
//! assert_eq!(pos, Position::new(11, 27));
//! assert_eq!(format_address(pos), "AB12");
//! ```

pub mod address;
pub mod cell_type;
pub mod error;
pub mod range;
pub mod user_data;

// Re-exports for convenience
pub use address::{column_to_letters, format_address, letters_to_column, parse_address, Position};
pub use cell_type::CellType;
pub use error::{Error, Result};
pub use range::{CellRange, CellRangeIter};
pub use user_data::UserData;

/// Default number of rows in a grid
pub const DEFAULT_ROWS: u32 = 1000;

/// Default number of columns in a grid
pub const DEFAULT_COLS: u32 = 1000;
