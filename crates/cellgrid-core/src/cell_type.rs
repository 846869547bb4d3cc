//! Coarse classification of a cell's contents

use std::fmt;

/// The syntactic shape of a cell's raw text
///
/// This describes what the user typed, not what it evaluates to: `=1+1` is an
/// [`CellType::Operator`] cell even though its value is a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellType {
    /// Never set, or the text could not be lexed/parsed
    #[default]
    Unknown,
    /// Text literal
    String,
    /// Integer literal
    Number,
    /// Decimal literal
    Float,
    /// Arithmetic or comparison expression
    Operator,
    /// Built-in function call
    Function,
    /// Bare reference to another cell
    CellReference,
}

impl CellType {
    /// Name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            CellType::Unknown => "UNKNOWN",
            CellType::String => "STRING",
            CellType::Number => "NUMBER",
            CellType::Float => "FLOAT",
            CellType::Operator => "OPERATOR",
            CellType::Function => "FUNCTION",
            CellType::CellReference => "CELL_REFERENCE",
        }
    }

    /// True for the three literal kinds
    pub fn is_literal(&self) -> bool {
        matches!(self, CellType::String | CellType::Number | CellType::Float)
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
