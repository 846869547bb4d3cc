//! Rectangular cell ranges (e.g. `A1:B10`)

use crate::address::{parse_address, Position};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A rectangle of cells, normalized so `start` is top-left and `end` bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start position (top-left)
    pub start: Position,
    /// End position (bottom-right), inclusive
    pub end: Position,
}

impl CellRange {
    /// Create a new range from two opposite corners, in any order
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            start: Position::new(a.row.min(b.row), a.col.min(b.col)),
            end: Position::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Create a single-cell range
    pub fn single(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Parse a range from `A1:B10` notation (a lone address is a single-cell range)
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((start, end)) => Ok(Self::new(parse_address(start)?, parse_address(end)?)),
            None => parse_address(s).map(Self::single),
        }
    }

    /// Check if a position is within this range
    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= self.start.row
            && pos.row <= self.end.row
            && pos.col >= self.start.col
            && pos.col <= self.end.col
    }

    /// Number of rows in the range
    pub fn row_count(&self) -> u64 {
        u64::from(self.end.row - self.start.row) + 1
    }

    /// Number of columns in the range
    pub fn col_count(&self) -> u64 {
        u64::from(self.end.col - self.start.col) + 1
    }

    /// Total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() * self.col_count()
    }

    /// Iterate over all positions in the range (row by row)
    pub fn cells(&self) -> CellRangeIter {
        CellRangeIter {
            range: *self,
            current: Some(self.start),
        }
    }

    /// Format as `A1:B10` (or a lone address for a single cell)
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start, self.end)
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major iterator over the positions of a [`CellRange`]
#[derive(Debug, Clone)]
pub struct CellRangeIter {
    range: CellRange,
    current: Option<Position>,
}

impl Iterator for CellRangeIter {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.current?;

        self.current = if pos.col < self.range.end.col {
            Some(Position::new(pos.row, pos.col + 1))
        } else if pos.row < self.range.end.row {
            Some(Position::new(pos.row + 1, self.range.start.col))
        } else {
            None
        };

        Some(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_range_parse() {
        let range = CellRange::parse("A1:B2").unwrap();
        assert_eq!(range.start, Position::new(0, 0));
        assert_eq!(range.end, Position::new(1, 1));

        // Corners given in reverse are normalized
        let range = CellRange::parse("B2:A1").unwrap();
        assert_eq!(range.start, Position::new(0, 0));
        assert_eq!(range.end, Position::new(1, 1));

        // Single cell
        let range = CellRange::parse("C3").unwrap();
        assert_eq!(range.start, Position::new(2, 2));
        assert_eq!(range.end, Position::new(2, 2));

        assert!(CellRange::parse("A1:").is_err());
    }

    #[test]
    fn test_cell_range_contains() {
        let range = CellRange::parse("B2:D4").unwrap();

        assert!(range.contains(Position::new(1, 1))); // B2
        assert!(range.contains(Position::new(3, 3))); // D4
        assert!(range.contains(Position::new(2, 2))); // C3

        assert!(!range.contains(Position::new(0, 0))); // A1
        assert!(!range.contains(Position::new(4, 1))); // B5
    }

    #[test]
    fn test_cell_range_iterator() {
        let range = CellRange::parse("A1:B2").unwrap();
        let cells: Vec<_> = range.cells().collect();

        assert_eq!(
            cells,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(1, 1),
            ]
        );
        assert_eq!(range.cell_count(), 4);
    }

    #[test]
    fn test_cell_range_display() {
        assert_eq!(CellRange::parse("A1:C3").unwrap().to_string(), "A1:C3");
        assert_eq!(CellRange::parse("B7").unwrap().to_string(), "B7");
    }
}
