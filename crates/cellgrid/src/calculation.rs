//! Grid calculation engine
//!
//! Evaluation is pull-based: evaluating one cell resolves the cells it reads on
//! demand, recursing through the grid. Each top-level evaluation owns the set
//! of positions currently being resolved, which is how reference cycles are
//! detected, and a memo of everything it resolved, which the grid writes back
//! afterwards.
//!
//! # Example
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let mut grid = Grid::new();
//! grid.set_raw_at("A1", "10").unwrap();
//! grid.set_raw_at("A2", "20").unwrap();
//! grid.set_raw_at("A3", "=A1+A2").unwrap();
//!
//! let stats = grid.recalculate();
//! assert_eq!(stats.cells_calculated, 3);
//! assert_eq!(grid.cell_at("A3").unwrap().unwrap().computed(), Some("30"));
//! ```

use crate::cell::Cell;
use crate::grid::Grid;
use cellgrid_core::Position;
use cellgrid_formula::{EvaluationContext, FormulaError, FormulaResult, FormulaValue};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Number of cells whose text reads other cells
    pub formula_count: usize,
    /// Number of cells evaluated
    pub cells_calculated: usize,
    /// Number of cells that ended in a circular reference error
    pub circular_references: usize,
    /// Number of cells that ended in any error
    pub errors: usize,
}

impl CalculationStats {
    pub(crate) fn record(&mut self, outcome: &FormulaResult<FormulaValue>) {
        self.cells_calculated += 1;
        if let Err(e) = outcome {
            self.errors += 1;
            if matches!(e, FormulaError::CircularReference(_)) {
                self.circular_references += 1;
            }
        }
    }
}

/// Results of one top-level evaluation, keyed by position
pub(crate) type Resolved = HashMap<Position, FormulaResult<FormulaValue>>;

/// [`EvaluationContext`] over a grid for one top-level evaluation
pub(crate) struct GridContext<'g> {
    grid: &'g Grid,
    /// Positions currently being resolved, innermost last
    resolving: RefCell<Vec<Position>>,
    /// Cells resolved during this evaluation
    resolved: RefCell<Resolved>,
    max_depth: usize,
}

impl<'g> GridContext<'g> {
    pub(crate) fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            resolving: RefCell::new(Vec::new()),
            resolved: RefCell::new(HashMap::new()),
            max_depth: grid.options().max_depth,
        }
    }

    /// Evaluate `pos` from its text, ignoring any value it already has
    pub(crate) fn evaluate_top(grid: &'g Grid, pos: Position, cell: &Cell) -> Resolved {
        let ctx = Self::new(grid);
        let outcome = ctx.resolve(pos, cell);
        debug!(
            cell = %pos,
            ok = outcome.is_ok(),
            resolved = ctx.resolved.borrow().len(),
            "evaluated cell"
        );
        let mut resolved = ctx.resolved.into_inner();
        // A refused evaluation still gives the cell its outcome
        resolved.entry(pos).or_insert(outcome);
        resolved
    }

    fn resolve(&self, pos: Position, cell: &Cell) -> FormulaResult<FormulaValue> {
        if self.resolving.borrow().len() >= self.max_depth {
            debug!(cell = %pos, depth = self.max_depth, "reference depth limit reached");
            return Err(FormulaError::RecursionLimit(self.max_depth));
        }

        self.resolving.borrow_mut().push(pos);
        let result = cell.compute(self);
        self.resolving.borrow_mut().pop();

        self.resolved.borrow_mut().insert(pos, result.clone());
        result
    }
}

impl EvaluationContext for GridContext<'_> {
    fn cell_value(&self, pos: Position) -> FormulaResult<Option<FormulaValue>> {
        if !self.grid.contains(pos) {
            return Err(FormulaError::Bounds(format!(
                "{} is outside the {}x{} grid",
                pos,
                self.grid.rows(),
                self.grid.cols()
            )));
        }

        let Some(cell) = self.grid.cell(pos) else {
            return Ok(None);
        };

        if self.resolving.borrow().contains(&pos) {
            debug!(cell = %pos, "circular reference detected");
            return Err(FormulaError::CircularReference(pos.to_string()));
        }

        if let Some(result) = self.resolved.borrow().get(&pos) {
            return result.clone().map(Some);
        }

        if let Some(outcome) = cell.outcome() {
            return outcome.clone().map(Some);
        }

        trace!(cell = %pos, "resolving referenced cell on demand");
        self.resolve(pos, cell).map(Some)
    }

    fn in_bounds(&self, pos: Position) -> bool {
        self.grid.contains(pos)
    }
}
