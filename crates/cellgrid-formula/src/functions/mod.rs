//! Built-in functions

pub mod logical;
pub mod math;

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::{EvaluationContext, FormulaValue};
use std::collections::HashMap;

/// Function implementation signature
#[derive(Clone, Copy)]
pub enum FunctionImpl {
    /// Receives every argument already evaluated, left to right
    Values(fn(&[FormulaValue], &dyn EvaluationContext) -> FormulaResult<FormulaValue>),
    /// Receives the argument expressions and evaluates only what it needs
    Lazy(fn(&[FormulaExpr], &dyn EvaluationContext) -> FormulaResult<FormulaValue>),
}

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register_math_functions();
        registry.register_logical_functions();

        registry
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Names of all registered functions, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }

    fn register_math_functions(&mut self) {
        // SUM
        self.register(FunctionDef {
            name: "SUM",
            min_args: 1,
            max_args: None,
            implementation: FunctionImpl::Values(math::fn_sum),
        });

        // AVERAGE
        self.register(FunctionDef {
            name: "AVERAGE",
            min_args: 1,
            max_args: None,
            implementation: FunctionImpl::Values(math::fn_average),
        });

        // MIN
        self.register(FunctionDef {
            name: "MIN",
            min_args: 1,
            max_args: None,
            implementation: FunctionImpl::Values(math::fn_min),
        });

        // MAX
        self.register(FunctionDef {
            name: "MAX",
            min_args: 1,
            max_args: None,
            implementation: FunctionImpl::Values(math::fn_max),
        });

        // COUNT
        self.register(FunctionDef {
            name: "COUNT",
            min_args: 1,
            max_args: None,
            implementation: FunctionImpl::Values(math::fn_count),
        });

        // ABS
        self.register(FunctionDef {
            name: "ABS",
            min_args: 1,
            max_args: Some(1),
            implementation: FunctionImpl::Values(math::fn_abs),
        });

        // ROUND
        self.register(FunctionDef {
            name: "ROUND",
            min_args: 1,
            max_args: Some(2),
            implementation: FunctionImpl::Values(math::fn_round),
        });
    }

    fn register_logical_functions(&mut self) {
        // IF evaluates only the branch it picks
        self.register(FunctionDef {
            name: "IF",
            min_args: 2,
            max_args: Some(3),
            implementation: FunctionImpl::Lazy(logical::fn_if),
        });

        self.register(FunctionDef {
            name: "AND",
            min_args: 1,
            max_args: None,
            implementation: FunctionImpl::Values(logical::fn_and),
        });

        self.register(FunctionDef {
            name: "OR",
            min_args: 1,
            max_args: None,
            implementation: FunctionImpl::Values(logical::fn_or),
        });

        self.register(FunctionDef {
            name: "NOT",
            min_args: 1,
            max_args: Some(1),
            implementation: FunctionImpl::Values(logical::fn_not),
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
