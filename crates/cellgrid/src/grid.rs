//! Sparse cell grid

use crate::calculation::{CalculationStats, GridContext, Resolved};
use crate::cell::Cell;
use crate::options::{GridOptions, RecalcMode};
use ahash::AHashMap;
use cellgrid_core::{CellRange, Error, Position, Result, DEFAULT_COLS, DEFAULT_ROWS};
use cellgrid_formula::DependencyGraph;
use tracing::{debug, info_span};

/// A fixed-extent grid of cells
///
/// Only created cells take up space. Positions are validated against the
/// extent before any storage is touched.
#[derive(Debug)]
pub struct Grid {
    rows: u32,
    cols: u32,
    /// Cells keyed by [`Position::pack`]
    cells: AHashMap<u64, Cell>,
    dependencies: DependencyGraph,
    options: GridOptions,
}

impl Grid {
    /// Create a 1000 x 1000 grid with default options
    pub fn new() -> Self {
        Self::with_size(DEFAULT_ROWS, DEFAULT_COLS)
    }

    /// Create a grid with the given extent
    pub fn with_size(rows: u32, cols: u32) -> Self {
        Self::with_options(rows, cols, GridOptions::default())
    }

    /// Create a grid with the given extent and options
    pub fn with_options(rows: u32, cols: u32, options: GridOptions) -> Self {
        Self {
            rows,
            cols,
            cells: AHashMap::new(),
            dependencies: DependencyGraph::new(),
            options,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Whether `pos` lies inside the grid
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                row: pos.row,
                col: pos.col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Parse an address and check it lies inside the grid
    pub fn parse_address(&self, text: &str) -> Result<Position> {
        let pos = cellgrid_core::parse_address(text)?;
        self.check_bounds(pos)?;
        Ok(pos)
    }

    /// Format a position inside the grid as an address
    pub fn format_address(&self, pos: Position) -> Result<String> {
        self.check_bounds(pos)?;
        Ok(cellgrid_core::format_address(pos))
    }

    // === Cell lifecycle ===

    /// Insert an empty cell at `pos` unless one exists, and return it
    pub fn create_cell(&mut self, pos: Position) -> Result<&mut Cell> {
        self.check_bounds(pos)?;

        if !self.cells.contains_key(&pos.pack()) {
            self.cells.insert(pos.pack(), Cell::new());
            // Cells that referred to the unset position can now resolve it;
            // the new cell itself stays unevaluated
            if self.options.recalc == RecalcMode::Automatic {
                let mut order = self.dependencies.get_recalc_order(&[pos]);
                order.retain(|p| *p != pos);
                self.recalculate_order(order);
            }
        }

        Ok(self.cells.entry(pos.pack()).or_default())
    }

    /// Store `cell` at `pos`, returning the cell it replaced
    pub fn set_cell(&mut self, pos: Position, mut cell: Cell) -> Result<Option<Cell>> {
        self.check_bounds(pos)?;

        // A result computed elsewhere may not hold here
        if cell.has_references() {
            cell.invalidate();
        }

        let previous = self.cells.insert(pos.pack(), cell);
        self.sync_dependencies(pos);
        self.after_edit(pos);
        Ok(previous)
    }

    /// Remove the cell at `pos`, returning it
    pub fn delete_cell(&mut self, pos: Position) -> Result<Option<Cell>> {
        self.check_bounds(pos)?;

        let removed = self.cells.remove(&pos.pack());
        if removed.is_some() {
            // Cells reading `pos` keep their edges and will see it as unset
            self.dependencies.clear_precedents(pos);
            if self.options.recalc == RecalcMode::Automatic {
                self.recalculate_from(pos);
            }
        }
        Ok(removed)
    }

    /// Look up the cell at `pos`; `Ok(None)` if none was created
    pub fn get_cell(&self, pos: Position) -> Result<Option<&Cell>> {
        self.check_bounds(pos)?;
        Ok(self.cell(pos))
    }

    /// Look up the cell at `pos` for mutation
    ///
    /// Text changed through the returned cell is picked up by the next
    /// [`Grid::evaluate_cell`] or [`Grid::recalculate`]; prefer
    /// [`Grid::set_raw`], which also updates dependents.
    pub fn get_cell_mut(&mut self, pos: Position) -> Result<Option<&mut Cell>> {
        self.check_bounds(pos)?;
        Ok(self.cells.get_mut(&pos.pack()))
    }

    /// Look up a cell by address
    pub fn cell_at(&self, address: &str) -> Result<Option<&Cell>> {
        let pos = self.parse_address(address)?;
        Ok(self.cell(pos))
    }

    pub(crate) fn cell(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos.pack())
    }

    /// Number of created cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over created cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        let mut entries: Vec<_> = self
            .cells
            .iter()
            .map(|(key, cell)| (Position::unpack(*key), cell))
            .collect();
        entries.sort_unstable_by_key(|(pos, _)| *pos);
        entries.into_iter()
    }

    // === Editing and evaluation ===

    /// Set the text of the cell at `pos`, creating it if needed, and evaluate it
    ///
    /// Formula errors end up on the cell; only an out-of-range `pos` fails.
    pub fn set_raw(&mut self, pos: Position, text: impl Into<String>) -> Result<&Cell> {
        self.check_bounds(pos)?;

        self.cells.entry(pos.pack()).or_default().set_raw(text);
        self.sync_dependencies(pos);
        self.after_edit(pos);

        Ok(self.cells.entry(pos.pack()).or_default())
    }

    /// [`Grid::set_raw`] with a textual address
    pub fn set_raw_at(&mut self, address: &str, text: impl Into<String>) -> Result<&Cell> {
        let pos = self.parse_address(address)?;
        self.set_raw(pos, text)
    }

    /// Evaluate the cell at `pos` from its current text
    ///
    /// Referenced cells that already have a computed value are used as they are.
    /// Returns `Ok(None)` if there is no cell at `pos`.
    pub fn evaluate_cell(&mut self, pos: Position) -> Result<Option<&Cell>> {
        self.check_bounds(pos)?;
        if self.cell(pos).is_none() {
            return Ok(None);
        }

        self.sync_dependencies(pos);
        self.evaluate_at(pos);
        Ok(self.cell(pos))
    }

    /// Re-evaluate every cell from scratch
    ///
    /// Also rebuilds the dependency graph, so edits made through
    /// [`Grid::get_cell_mut`] are fully accounted for afterwards.
    pub fn recalculate(&mut self) -> CalculationStats {
        let _span = info_span!("recalculate", cells = self.cells.len()).entered();

        let mut positions: Vec<Position> =
            self.cells.keys().map(|key| Position::unpack(*key)).collect();
        positions.sort_unstable();

        self.dependencies.clear();
        for &pos in &positions {
            self.sync_dependencies(pos);
        }

        let order = self.dependencies.get_recalc_order(&positions);
        let mut stats = self.recalculate_order(order);
        stats.formula_count = self.dependencies.formula_count();

        debug!(
            cells = stats.cells_calculated,
            errors = stats.errors,
            "recalculation finished"
        );
        stats
    }

    /// Cells that the cell at `pos` reads, in row-major order
    pub fn precedents(&self, pos: Position) -> Result<Vec<Position>> {
        self.check_bounds(pos)?;
        let mut result: Vec<_> = self.dependencies.get_precedents(pos).collect();
        result.sort_unstable();
        Ok(result)
    }

    /// Cells that read the cell at `pos`, in row-major order
    pub fn dependents(&self, pos: Position) -> Result<Vec<Position>> {
        self.check_bounds(pos)?;
        let mut result: Vec<_> = self.dependencies.get_dependents(pos).collect();
        result.sort_unstable();
        Ok(result)
    }

    // === Internals ===

    /// Apply the recalculation policy after the cell at `pos` changed
    fn after_edit(&mut self, pos: Position) {
        match self.options.recalc {
            RecalcMode::Automatic => {
                self.recalculate_from(pos);
            }
            RecalcMode::Manual => {
                if let Some(cell) = self.cells.get_mut(&pos.pack()) {
                    cell.invalidate();
                }
                self.evaluate_at(pos);
            }
        }
    }

    /// Re-evaluate `changed` and everything downstream of it
    fn recalculate_from(&mut self, changed: Position) -> CalculationStats {
        let order = self.dependencies.get_recalc_order(&[changed]);
        let stats = self.recalculate_order(order);

        debug!(
            cell = %changed,
            cells = stats.cells_calculated,
            "recalculated dependents"
        );
        stats
    }

    /// Invalidate every cell in `order`, then evaluate them in that order
    ///
    /// Cells already resolved on behalf of an earlier one are skipped.
    fn recalculate_order(&mut self, order: Vec<Position>) -> CalculationStats {
        // Invalidate first so nothing downstream is read stale
        for &pos in &order {
            if let Some(cell) = self.cells.get_mut(&pos.pack()) {
                cell.invalidate();
            }
        }

        let mut stats = CalculationStats::default();
        for pos in order {
            if self.cell(pos).is_some_and(|c| !c.is_established()) {
                let resolved = self.run_evaluation(pos);
                self.write_back(pos, resolved, &mut stats);
            }
        }
        stats
    }

    /// Evaluate the cell at `pos` alone and store the results
    fn evaluate_at(&mut self, pos: Position) {
        if self.cell(pos).is_none() {
            return;
        }
        let resolved = self.run_evaluation(pos);
        self.write_back(pos, resolved, &mut CalculationStats::default());
    }

    fn run_evaluation(&self, pos: Position) -> Resolved {
        match self.cell(pos) {
            Some(cell) => GridContext::evaluate_top(self, pos, cell),
            None => Resolved::new(),
        }
    }

    /// Store evaluation results: always for `target`, and for any other cell
    /// resolved on the way that has no value yet
    fn write_back(&mut self, target: Position, resolved: Resolved, stats: &mut CalculationStats) {
        for (pos, outcome) in resolved {
            if let Some(cell) = self.cells.get_mut(&pos.pack()) {
                if pos == target || !cell.is_established() {
                    stats.record(&outcome);
                    cell.establish(outcome);
                }
            }
        }
    }

    /// Rebuild the edges from `pos` to the cells it reads
    fn sync_dependencies(&mut self, pos: Position) {
        self.dependencies.clear_precedents(pos);

        let Some(cell) = self.cells.get(&pos.pack()) else {
            return;
        };

        for range in cell.references() {
            let Some(range) = self.clip(range) else {
                continue;
            };
            for precedent in range.cells() {
                self.dependencies.add_dependency(precedent, pos);
            }
        }
    }

    /// The part of `range` inside the grid
    fn clip(&self, range: &CellRange) -> Option<CellRange> {
        if !self.contains(range.start) {
            return None;
        }
        let end = Position::new(
            range.end.row.min(self.rows - 1),
            range.end.col.min(self.cols - 1),
        );
        Some(CellRange::new(range.start, end))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(address: &str) -> Position {
        Position::parse(address).unwrap()
    }

    #[test]
    fn test_bounds() {
        let mut grid = Grid::new();

        assert!(matches!(
            grid.get_cell(Position::new(1000, 0)),
            Err(Error::OutOfBounds { row: 1000, .. })
        ));
        assert!(grid.create_cell(Position::new(0, 1000)).is_err());
        assert!(grid.get_cell(Position::new(999, 999)).unwrap().is_none());
        assert!(grid.parse_address("ALM1").is_err());
        assert_eq!(grid.parse_address("ALL1000").unwrap(), Position::new(999, 999));
        assert!(grid.format_address(Position::new(1000, 0)).is_err());
    }

    #[test]
    fn test_create_cell_is_idempotent() {
        let mut grid = Grid::with_size(10, 10);

        grid.create_cell(pos("B2")).unwrap().set_raw("x");
        let cell = grid.create_cell(pos("B2")).unwrap();
        assert_eq!(cell.raw(), "x");
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_clip() {
        let grid = Grid::with_size(10, 10);

        let clipped = grid.clip(&CellRange::parse("A5:Z99").unwrap()).unwrap();
        assert_eq!(clipped, CellRange::parse("A5:J10").unwrap());
        assert!(grid.clip(&CellRange::parse("K1:K2").unwrap()).is_none());
    }

    #[test]
    fn test_dependencies_follow_edits() {
        let mut grid = Grid::with_size(10, 10);

        grid.set_raw(pos("C1"), "=A1+SUM(B1:B2)").unwrap();
        assert_eq!(
            grid.precedents(pos("C1")).unwrap(),
            vec![pos("A1"), pos("B1"), pos("B2")]
        );
        assert_eq!(grid.dependents(pos("B2")).unwrap(), vec![pos("C1")]);

        grid.set_raw(pos("C1"), "=A1").unwrap();
        assert!(grid.dependents(pos("B2")).unwrap().is_empty());
    }

    #[test]
    fn test_iter_is_row_major() {
        let mut grid = Grid::with_size(10, 10);
        for address in ["B2", "A2", "C1"] {
            grid.create_cell(pos(address)).unwrap();
        }

        let order: Vec<_> = grid.iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec![pos("C1"), pos("A2"), pos("B2")]);
    }

    #[test]
    fn test_grid_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grid>();
    }
}
