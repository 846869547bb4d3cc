//! Cell positions and the A1 address codec
//!
//! Columns use bijective base-26 letters (A=0, ..., Z=25, AA=26, ...), rows are
//! rendered 1-based. Internally everything is zero-based.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A zero-based (row, column) position in a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u32,
}

impl Position {
    /// Create a new position
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a position from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use cellgrid_core::Position;
    ///
    /// let pos = Position::parse("B3").unwrap();
    /// assert_eq!(pos.row, 2);
    /// assert_eq!(pos.col, 1);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        parse_address(s)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format_address(*self)
    }

    /// Pack row and column into a single 64-bit key (row in the high half)
    pub const fn pack(self) -> u64 {
        ((self.row as u64) << 32) | self.col as u64
    }

    /// Inverse of [`Position::pack`]
    pub const fn unpack(key: u64) -> Self {
        Self {
            row: (key >> 32) as u32,
            col: key as u32,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<(u32, u32)> for Position {
    fn from((row, col): (u32, u32)) -> Self {
        Self::new(row, col)
    }
}

/// Parse an address such as `"A1"`, `"ab12"` or `"ZZ700"`
///
/// Letters are case-insensitive. No whitespace, sign or `$` marker is accepted.
pub fn parse_address(text: &str) -> Result<Position> {
    let split = text
        .bytes()
        .position(|b| !b.is_ascii_alphabetic())
        .unwrap_or(text.len());

    if split == 0 {
        return Err(Error::invalid_address(format!(
            "no column letters in '{}'",
            text
        )));
    }

    // Everything before `split` is ASCII, so this is a char boundary
    let (letters, digits) = text.split_at(split);

    if digits.is_empty() {
        return Err(Error::invalid_address(format!(
            "no row number in '{}'",
            text
        )));
    }

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_address(format!(
            "invalid row number in '{}'",
            text
        )));
    }

    let row: u64 = digits
        .parse()
        .map_err(|_| Error::invalid_address(format!("row number too large in '{}'", text)))?;

    // Rows are 1-based in text, 0-based internally
    if row == 0 {
        return Err(Error::invalid_address(format!(
            "row number must be >= 1 in '{}'",
            text
        )));
    }

    let row = u32::try_from(row - 1)
        .map_err(|_| Error::invalid_address(format!("row number too large in '{}'", text)))?;
    let col = letters_to_column(letters)?;

    Ok(Position::new(row, col))
}

/// Format a position as an A1-style address
pub fn format_address(pos: Position) -> String {
    let mut result = column_to_letters(pos.col);
    result.push_str(&(u64::from(pos.row) + 1).to_string());
    result
}

/// Convert a column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn column_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = i64::from(col);

    while n >= 0 {
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n = n / 26 - 1;
    }

    result
}

/// Convert column letters to an index (A = 0, Z = 25, AA = 26, etc.)
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::invalid_address("empty column letters"));
    }

    let mut col: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::invalid_address(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        let digit = u64::from(c.to_ascii_uppercase() as u8 - b'A' + 1);
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| Error::invalid_address(format!("column too large: {}", letters)))?;
    }

    u32::try_from(col - 1)
        .map_err(|_| Error::invalid_address(format!("column too large: {}", letters)))
}
