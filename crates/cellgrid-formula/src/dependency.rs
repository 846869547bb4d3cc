//! Dependency tracking for formula calculation

use cellgrid_core::Position;
use std::collections::{HashMap, HashSet};

/// Dependency graph for formula cells
///
/// Tracks which cells depend on which other cells, enabling targeted
/// recalculation. Edges point from a precedent to the cells reading it.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Cell → Cells that depend on it (dependents)
    dependents: HashMap<Position, HashSet<Position>>,
    /// Cell → Cells it depends on (precedents)
    precedents: HashMap<Position, HashSet<Position>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: Position, dependent: Position) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Forget what `cell` reads, keeping the cells that read it
    ///
    /// Used when a cell's text changes: its dependents still refer to it.
    pub fn clear_precedents(&mut self, cell: Position) {
        if let Some(precedents) = self.precedents.remove(&cell) {
            for precedent in precedents {
                if let Some(deps) = self.dependents.get_mut(&precedent) {
                    deps.remove(&cell);
                    if deps.is_empty() {
                        self.dependents.remove(&precedent);
                    }
                }
            }
        }
    }

    /// Get cells that depend on the given cell
    pub fn get_dependents(&self, cell: Position) -> impl Iterator<Item = Position> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell depends on
    pub fn get_precedents(&self, cell: Position) -> impl Iterator<Item = Position> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get all cells that need to be recalculated when the given cells change
    ///
    /// The changed cells themselves are included. Every cell comes after the
    /// cells it depends on; members of a cycle appear in an arbitrary order.
    pub fn get_recalc_order(&self, changed: &[Position]) -> Vec<Position> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut in_stack = HashSet::new();

        // Depth-first over dependents with an explicit stack, so long chains
        // cannot exhaust the thread stack
        let mut stack = Vec::new();

        for &root in changed {
            if visited.contains(&root) {
                continue;
            }
            in_stack.insert(root);
            stack.push((root, self.get_dependents(root)));

            while let Some((cell, pending)) = stack.last_mut() {
                if let Some(next) = pending.next() {
                    // A dependent already on the stack closes a cycle; skip it
                    if !visited.contains(&next) && in_stack.insert(next) {
                        stack.push((next, self.get_dependents(next)));
                    }
                } else {
                    let cell = *cell;
                    stack.pop();
                    in_stack.remove(&cell);
                    visited.insert(cell);
                    result.push(cell);
                }
            }
        }

        // Post-order over dependents puts the last dependent first
        result.reverse();
        result
    }

    /// Number of cells with at least one precedent
    pub fn formula_count(&self) -> usize {
        self.precedents.values().filter(|p| !p.is_empty()).count()
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.precedents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A1: Position = Position::new(0, 0);
    const B1: Position = Position::new(0, 1);
    const C1: Position = Position::new(0, 2);
    const D1: Position = Position::new(0, 3);

    fn index_of(order: &[Position], pos: Position) -> usize {
        order.iter().position(|&p| p == pos).unwrap()
    }

    #[test]
    fn test_add_dependency() {
        let mut graph = DependencyGraph::new();

        graph.add_dependency(A1, B1);

        assert!(graph.get_dependents(A1).any(|c| c == B1));
        assert!(graph.get_precedents(B1).any(|c| c == A1));
        assert_eq!(graph.formula_count(), 1);
    }

    #[test]
    fn test_recalc_order_is_topological() {
        let mut graph = DependencyGraph::new();

        // B1 = A1, C1 = A1 + B1, D1 = C1
        graph.add_dependency(A1, B1);
        graph.add_dependency(A1, C1);
        graph.add_dependency(B1, C1);
        graph.add_dependency(C1, D1);

        let order = graph.get_recalc_order(&[A1]);
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], A1);
        assert!(index_of(&order, B1) < index_of(&order, C1));

        // Several changed cells share one order without duplicates
        let order = graph.get_recalc_order(&[C1, A1]);
        assert_eq!(order.len(), 4);
        assert!(index_of(&order, A1) < index_of(&order, B1));
        assert!(index_of(&order, C1) < index_of(&order, D1));
        assert!(index_of(&order, C1) < index_of(&order, D1));

        // Only downstream cells are affected
        assert_eq!(graph.get_recalc_order(&[C1]), vec![C1, D1]);
    }

    #[test]
    fn test_clear_precedents_keeps_dependents() {
        let mut graph = DependencyGraph::new();

        // B1 = A1, C1 = B1
        graph.add_dependency(A1, B1);
        graph.add_dependency(B1, C1);

        graph.clear_precedents(B1);

        assert_eq!(graph.get_precedents(B1).count(), 0);
        assert_eq!(graph.get_dependents(A1).count(), 0);
        assert_eq!(graph.get_dependents(B1).collect::<Vec<_>>(), vec![C1]);
        assert_eq!(graph.formula_count(), 1);
    }

    #[test]
    fn test_recalc_order_with_cycle() {
        let mut graph = DependencyGraph::new();

        // B1 = A1, C1 = B1, A1 = C1; D1 reads the cycle
        graph.add_dependency(A1, B1);
        graph.add_dependency(B1, C1);
        graph.add_dependency(C1, A1);
        graph.add_dependency(C1, D1);

        let order = graph.get_recalc_order(&[A1]);
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], A1);
        assert!(index_of(&order, C1) < index_of(&order, D1));

        // Self references terminate too
        let mut graph = DependencyGraph::new();
        graph.add_dependency(A1, A1);
        assert_eq!(graph.get_recalc_order(&[A1]), vec![A1]);
    }

    #[test]
    fn test_recalc_order_long_chain() {
        let mut graph = DependencyGraph::new();
        let cells: Vec<Position> = (0..100_000).map(|row| Position::new(row, 0)).collect();
        for pair in cells.windows(2) {
            graph.add_dependency(pair[0], pair[1]);
        }

        let order = graph.get_recalc_order(&[cells[0]]);
        assert_eq!(order, cells);
    }
}
