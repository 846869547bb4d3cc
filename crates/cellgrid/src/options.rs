//! Grid configuration

/// When dependents of an edited cell are recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecalcMode {
    /// Re-evaluate every transitive dependent after each edit
    #[default]
    Automatic,
    /// Only the edited cell is evaluated; dependents keep their last computed
    /// value until they are evaluated again or [`crate::Grid::recalculate`] runs
    Manual,
}

/// Options for a [`crate::Grid`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    /// Recalculation policy (default: automatic)
    pub recalc: RecalcMode,
    /// Maximum number of cells resolved on demand within one evaluation (default: 256)
    pub max_depth: usize,
}

impl GridOptions {
    /// Default maximum reference chain depth
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recalculation policy
    pub fn with_recalc(mut self, recalc: RecalcMode) -> Self {
        self.recalc = recalc;
        self
    }

    /// Set the maximum reference chain depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            recalc: RecalcMode::Automatic,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
