//! Tests for dependency tracking, recalculation policies and cycles

mod common;

use cellgrid::prelude::*;
use cellgrid::{DEFAULT_COLS, DEFAULT_ROWS};
use pretty_assertions::assert_eq;

fn computed(grid: &Grid, address: &str) -> String {
    grid.cell_at(address)
        .unwrap()
        .and_then(|cell| cell.computed())
        .unwrap_or_default()
        .to_string()
}

fn manual_grid() -> Grid {
    Grid::with_options(
        DEFAULT_ROWS,
        DEFAULT_COLS,
        GridOptions::new().with_recalc(RecalcMode::Manual),
    )
}

/// Test that edits flow to every transitive dependent
#[test]
fn test_automatic_recalculation() {
    common::init_tracing();
    let mut grid = Grid::new();

    grid.set_raw_at("A1", "2").unwrap();
    grid.set_raw_at("A2", "3").unwrap();
    grid.set_raw_at("A3", "=A1+A2").unwrap();
    grid.set_raw_at("A4", "=A3*10").unwrap();
    assert_eq!(computed(&grid, "A4"), "50");

    grid.set_raw_at("A1", "10").unwrap();
    assert_eq!(computed(&grid, "A3"), "13");
    assert_eq!(computed(&grid, "A4"), "130");
}

/// Test that a diamond-shaped dependency resolves with fresh values
#[test]
fn test_diamond_dependencies() {
    let mut grid = Grid::new();

    grid.set_raw_at("A1", "1").unwrap();
    grid.set_raw_at("B1", "=A1+1").unwrap();
    grid.set_raw_at("C1", "=A1*2").unwrap();
    grid.set_raw_at("D1", "=B1+C1").unwrap();
    assert_eq!(computed(&grid, "D1"), "4");

    grid.set_raw_at("A1", "5").unwrap();
    assert_eq!(computed(&grid, "D1"), "16");
}

/// Test that a formula entered before its inputs picks them up later
#[test]
fn test_reference_set_later() {
    let mut grid = Grid::new();

    grid.set_raw_at("B1", "=A1*3").unwrap();
    assert_eq!(computed(&grid, "B1"), "#REF!");

    grid.set_raw_at("A1", "4").unwrap();
    assert_eq!(computed(&grid, "B1"), "12");
}

/// Test that the manual policy only evaluates what it is asked to
#[test]
fn test_manual_recalculation() {
    common::init_tracing();
    let mut grid = manual_grid();

    grid.set_raw_at("A1", "1").unwrap();
    grid.set_raw_at("B1", "=A1+1").unwrap();
    assert_eq!(computed(&grid, "B1"), "2");

    // Dependents keep their stale value
    grid.set_raw_at("A1", "5").unwrap();
    assert_eq!(computed(&grid, "A1"), "5");
    assert_eq!(computed(&grid, "B1"), "2");

    let pos = grid.parse_address("B1").unwrap();
    let cell = grid.evaluate_cell(pos).unwrap().unwrap();
    assert_eq!(cell.computed(), Some("6"));

    grid.set_raw_at("A1", "7").unwrap();
    let stats = grid.recalculate();
    assert_eq!(computed(&grid, "B1"), "8");
    assert_eq!(
        stats,
        CalculationStats {
            formula_count: 1,
            cells_calculated: 2,
            circular_references: 0,
            errors: 0,
        }
    );
}

/// Test that a self reference is reported as circular
#[test]
fn test_self_reference() {
    common::init_tracing();
    let mut grid = Grid::new();

    let cell = grid.set_raw_at("A1", "=A1").unwrap();
    assert_eq!(cell.computed(), Some("#CIRC!"));
    assert!(matches!(
        cell.error(),
        Some(FormulaError::CircularReference(_))
    ));
    assert_eq!(cell.raw(), "=A1");
}

/// Test a two-cell cycle and breaking it
#[test]
fn test_two_cell_cycle() {
    let mut grid = Grid::new();

    grid.set_raw_at("A1", "=A2").unwrap();
    grid.set_raw_at("A2", "=A1").unwrap();
    grid.set_raw_at("B1", "=A1+1").unwrap();

    assert_eq!(computed(&grid, "A1"), "#CIRC!");
    assert_eq!(computed(&grid, "A2"), "#CIRC!");
    // Cells downstream of a cycle carry its error
    assert_eq!(computed(&grid, "B1"), "#CIRC!");

    grid.set_raw_at("A2", "5").unwrap();
    assert_eq!(computed(&grid, "A1"), "5");
    assert_eq!(computed(&grid, "B1"), "6");
}

/// Test that a full recalculation counts every cycle member
#[test]
fn test_cycle_statistics() {
    let mut grid = Grid::new();

    grid.set_raw_at("A1", "=B1+1").unwrap();
    grid.set_raw_at("B1", "=C1+1").unwrap();
    grid.set_raw_at("C1", "=A1+1").unwrap();
    grid.set_raw_at("D1", "42").unwrap();

    for address in ["A1", "B1", "C1"] {
        assert_eq!(computed(&grid, address), "#CIRC!", "{}", address);
    }

    let stats = grid.recalculate();
    assert_eq!(stats.formula_count, 3);
    assert_eq!(stats.cells_calculated, 4);
    assert_eq!(stats.circular_references, 3);
    assert_eq!(stats.errors, 3);
    assert_eq!(computed(&grid, "D1"), "42");
}

/// Test the reference depth limit
#[test]
fn test_depth_limit() {
    common::init_tracing();
    let options = GridOptions::new().with_max_depth(8);
    let mut grid = Grid::with_options(100, 10, options);

    // Edit through the cells directly so nothing is evaluated yet:
    // A1 = A2+1, A2 = A3+1, ..., A20 = 1
    for row in 0..20 {
        let text = if row == 19 {
            "1".to_string()
        } else {
            format!("=A{}+1", row + 2)
        };
        grid.create_cell(Position::new(row, 0))
            .unwrap()
            .set_raw(text);
    }

    let cell = grid.evaluate_cell(Position::new(0, 0)).unwrap().unwrap();
    assert_eq!(cell.computed(), Some("#DEPTH!"));
    assert_eq!(cell.error(), Some(&FormulaError::RecursionLimit(8)));

    // Dependency order never needs to go deep
    grid.recalculate();
    assert_eq!(computed(&grid, "A1"), "20");
}

/// Test that a cell refused by the depth limit still gets an outcome
#[test]
fn test_zero_depth_limit() {
    let options = GridOptions::new().with_max_depth(0);
    let mut grid = Grid::with_options(10, 10, options);

    let cell = grid.set_raw_at("A1", "1").unwrap();
    assert_eq!(cell.computed(), Some("#DEPTH!"));
    assert_eq!(cell.error(), Some(&FormulaError::RecursionLimit(0)));

    let stats = grid.recalculate();
    assert_eq!(stats.cells_calculated, 1);
    assert_eq!(stats.errors, 1);
}

/// Test that chains within the default limit resolve on demand
#[test]
fn test_deep_chain_within_limit() {
    let mut grid = Grid::with_size(100, 10);

    for row in 0..50 {
        let text = if row == 49 {
            "0".to_string()
        } else {
            format!("=A{}+1", row + 2)
        };
        grid.create_cell(Position::new(row, 0))
            .unwrap()
            .set_raw(text);
    }

    let cell = grid.evaluate_cell(Position::new(0, 0)).unwrap().unwrap();
    assert_eq!(cell.computed(), Some("49"));
    // Cells resolved on the way keep their values
    assert_eq!(computed(&grid, "A25"), "25");
}

/// Test editing the head of a very long reference chain
#[test]
fn test_long_chain_recalculation() {
    let mut grid = Grid::new();
    let len = 50_000u32;
    // Column-major so the chain spans many columns of the default grid
    let at = |i: u32| Position::new(i % DEFAULT_ROWS, i / DEFAULT_ROWS);

    grid.set_raw(at(0), "1").unwrap();
    for i in 1..len {
        let previous = at(i - 1).to_string();
        grid.set_raw(at(i), format!("={}+1", previous)).unwrap();
    }
    let last = at(len - 1);
    assert_eq!(grid.get_cell(last).unwrap().unwrap().computed(), Some("50000"));

    grid.set_raw(at(0), "2").unwrap();
    assert_eq!(grid.get_cell(last).unwrap().unwrap().computed(), Some("50001"));
}

/// Test that precedents and dependents track the latest text
#[test]
fn test_dependency_queries() {
    let mut grid = Grid::new();

    grid.set_raw_at("C1", "=A1+B1").unwrap();
    grid.set_raw_at("C2", "=SUM(A1:A3)").unwrap();

    let a1 = grid.parse_address("A1").unwrap();
    let c1 = grid.parse_address("C1").unwrap();
    let c2 = grid.parse_address("C2").unwrap();

    assert_eq!(grid.dependents(a1).unwrap(), vec![c1, c2]);
    assert_eq!(grid.precedents(c2).unwrap().len(), 3);

    grid.set_raw_at("C2", "7").unwrap();
    assert_eq!(grid.dependents(a1).unwrap(), vec![c1]);
    assert!(grid.precedents(c2).unwrap().is_empty());

    assert!(grid.dependents(Position::new(1000, 0)).is_err());
}
