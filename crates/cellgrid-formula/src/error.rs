//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while lexing, parsing or evaluating a cell's text
///
/// These never abort an edit. The grid stores them on the cell and shows
/// [`FormulaError::marker`] as the computed text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Character run that cannot start any token
    #[error("Lex error at offset {offset}: {message}")]
    Lex { offset: usize, message: String },

    /// Unexpected token or premature end of input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reference outside the grid, or to a cell that does not exist
    #[error("Invalid reference: {0}")]
    Bounds(String),

    /// A cell that (transitively) refers back to itself
    #[error("Circular reference detected at {0}")]
    CircularReference(String),

    /// Division with a zero divisor
    #[error("Division by zero")]
    DivisionByZero,

    /// Operand of the wrong kind, e.g. arithmetic on text
    #[error("Type error: {0}")]
    Type(String),

    /// Function name not in the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Result is not a finite number
    #[error("Numeric error: {0}")]
    Numeric(String),

    /// Reference chain deeper than the configured limit
    #[error("Reference chain exceeds maximum depth of {0}")]
    RecursionLimit(usize),
}

impl FormulaError {
    /// Short marker shown in place of a computed value
    pub fn marker(&self) -> &'static str {
        match self {
            FormulaError::Lex { .. } | FormulaError::Parse(_) => "#ERROR!",
            FormulaError::Bounds(_) => "#REF!",
            FormulaError::CircularReference(_) => "#CIRC!",
            FormulaError::DivisionByZero => "#DIV/0!",
            FormulaError::Type(_) => "#VALUE!",
            FormulaError::UnknownFunction(_) => "#NAME?",
            FormulaError::Arity { .. } => "#N/A",
            FormulaError::Numeric(_) => "#NUM!",
            FormulaError::RecursionLimit(_) => "#DEPTH!",
        }
    }

    /// True for errors raised before evaluation started
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, FormulaError::Lex { .. } | FormulaError::Parse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_distinct_from_numbers() {
        let errors = [
            FormulaError::Lex {
                offset: 3,
                message: "unexpected character '#'".into(),
            },
            FormulaError::Bounds("A1001".into()),
            FormulaError::CircularReference("A1".into()),
            FormulaError::DivisionByZero,
            FormulaError::Type("expected number".into()),
            FormulaError::UnknownFunction("FOO".into()),
            FormulaError::RecursionLimit(8),
        ];

        for err in &errors {
            assert!(err.marker().starts_with('#'));
        }
    }

    #[test]
    fn test_display() {
        let err = FormulaError::Arity {
            function: "IF".into(),
            expected: "at least 2".into(),
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "Wrong number of arguments for IF: expected at least 2, got 1"
        );
        assert!(FormulaError::Parse("x".into()).is_syntax_error());
        assert!(!FormulaError::DivisionByZero.is_syntax_error());
    }
}
