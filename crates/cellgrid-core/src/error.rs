//! Error types for cellgrid-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Addressing and structural errors
///
/// These are surfaced directly to the caller: they indicate the host asked for
/// something that can never be valid, as opposed to a bad formula typed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Text that does not have the `letters + digits` shape, or decodes out of range
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Position outside the grid extent
    #[error("Position (row {row}, col {col}) out of bounds (grid is {rows} x {cols})")]
    OutOfBounds {
        row: u32,
        col: u32,
        rows: u32,
        cols: u32,
    },
}

impl Error {
    /// Create an [`Error::InvalidAddress`] with a message
    pub fn invalid_address<S: Into<String>>(msg: S) -> Self {
        Error::InvalidAddress(msg.into())
    }
}
