//! Formula evaluator
//!
//! Evaluates formula ASTs to produce values. Cell lookups go through an
//! [`EvaluationContext`], so the evaluator never owns or borrows a grid directly.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{FunctionImpl, FunctionRegistry};
use cellgrid_core::{CellRange, Position};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
    /// Rows of a range argument
    Array(Vec<Vec<FormulaValue>>),
    /// An unset cell inside a range
    Empty,
}

impl FormulaValue {
    /// Numeric value for arithmetic; only numbers and empty cells qualify
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Empty => Some(0.0),
            _ => None,
        }
    }

    /// Force conversion to number for arithmetic
    pub fn to_number(&self) -> FormulaResult<f64> {
        self.as_number()
            .ok_or_else(|| FormulaError::Type(format!("expected a number, got {}", self.kind())))
    }

    /// Truth value for conditions
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormulaValue::Boolean(b) => Some(*b),
            FormulaValue::Number(n) => Some(*n != 0.0),
            FormulaValue::Empty => Some(false),
            _ => None,
        }
    }

    /// Force conversion to a truth value
    pub fn to_bool(&self) -> FormulaResult<bool> {
        self.as_bool()
            .ok_or_else(|| FormulaError::Type(format!("expected a logical value, got {}", self.kind())))
    }

    /// Convert to the text shown in a cell
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Boolean(true) => "TRUE".to_string(),
            FormulaValue::Boolean(false) => "FALSE".to_string(),
            FormulaValue::Empty => String::new(),
            FormulaValue::Array(rows) => rows
                .first()
                .and_then(|row| row.first())
                .map(FormulaValue::as_string)
                .unwrap_or_default(),
        }
    }

    /// Short name of the value's kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FormulaValue::Number(_) => "number",
            FormulaValue::String(_) => "text",
            FormulaValue::Boolean(_) => "logical",
            FormulaValue::Array(_) => "range",
            FormulaValue::Empty => "empty",
        }
    }
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Format a number the way a cell displays it
///
/// Integral values print without a decimal point; everything else uses the
/// shortest text that round-trips.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Source of cell values during evaluation
pub trait EvaluationContext {
    /// Value of the cell at `pos`
    ///
    /// `Ok(None)` means the position is inside the grid but no cell exists there.
    /// Positions outside the grid and cells whose own evaluation failed are errors.
    fn cell_value(&self, pos: Position) -> FormulaResult<Option<FormulaValue>>;

    /// Whether `pos` lies inside the grid
    fn in_bounds(&self, _pos: Position) -> bool {
        true
    }

    /// Values of every cell in a range, row by row; unset cells are `Empty`
    fn range_values(&self, range: CellRange) -> FormulaResult<FormulaValue> {
        // `end` is the bottom-right corner, so it bounds the whole rectangle
        if !self.in_bounds(range.end) {
            return Err(FormulaError::Bounds(format!("{} is outside the grid", range)));
        }

        let mut rows = Vec::new();
        for row in range.start.row..=range.end.row {
            let mut values = Vec::new();
            for col in range.start.col..=range.end.col {
                let value = self.cell_value(Position::new(row, col))?;
                values.push(value.unwrap_or(FormulaValue::Empty));
            }
            rows.push(values);
        }

        Ok(FormulaValue::Array(rows))
    }
}

/// Context for expressions that never read other cells
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferences;

impl EvaluationContext for NoReferences {
    fn cell_value(&self, pos: Position) -> FormulaResult<Option<FormulaValue>> {
        Err(FormulaError::Bounds(format!("{} cannot be resolved here", pos)))
    }

    fn in_bounds(&self, _pos: Position) -> bool {
        false
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    match expr {
        // === Literals ===
        FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
        FormulaExpr::String(s) => Ok(FormulaValue::String(s.clone())),

        // === References ===
        FormulaExpr::CellRef(pos) => ctx
            .cell_value(*pos)?
            .ok_or_else(|| FormulaError::Bounds(format!("{} is not set", pos))),

        FormulaExpr::RangeRef(range) => ctx.range_values(*range),

        // === Operators ===
        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),

        FormulaExpr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, ctx),

        // === Functions ===
        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &dyn EvaluationContext,
) -> FormulaResult<FormulaValue> {
    // Evaluate operands first, left to right
    let left_val = evaluate(left, ctx)?;
    let right_val = evaluate(right, ctx)?;

    match op {
        // Arithmetic operators
        BinaryOperator::Add => finite(left_val.to_number()? + right_val.to_number()?),
        BinaryOperator::Subtract => finite(left_val.to_number()? - right_val.to_number()?),
        BinaryOperator::Multiply => finite(left_val.to_number()? * right_val.to_number()?),
        BinaryOperator::Divide => {
            let l = left_val.to_number()?;
            let r = right_val.to_number()?;
            if r == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            finite(l / r)
        }
        BinaryOperator::Power => finite(left_val.to_number()?.powf(right_val.to_number()?)),

        // Comparison operators
        BinaryOperator::Equal => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) == Ordering::Equal,
        )),
        BinaryOperator::NotEqual => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) != Ordering::Equal,
        )),
        BinaryOperator::LessThan => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) == Ordering::Less,
        )),
        BinaryOperator::LessEqual => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) != Ordering::Greater,
        )),
        BinaryOperator::GreaterThan => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) == Ordering::Greater,
        )),
        BinaryOperator::GreaterEqual => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) != Ordering::Less,
        )),
    }
}

/// Wrap an arithmetic result, rejecting infinities and NaN
pub(crate) fn finite(n: f64) -> FormulaResult<FormulaValue> {
    if n.is_finite() {
        Ok(FormulaValue::Number(n))
    } else {
        Err(FormulaError::Numeric(format!("result {} is not a finite number", n)))
    }
}

/// Compare two values for ordering
///
/// Same-kind values compare naturally (text case-insensitively, `FALSE < TRUE`);
/// mixed kinds order number < text < logical. Empty compares as 0.
pub fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Ordering {
    fn rank(v: &FormulaValue) -> u8 {
        match v {
            FormulaValue::Number(_) | FormulaValue::Empty => 0,
            FormulaValue::String(_) => 1,
            FormulaValue::Boolean(_) => 2,
            FormulaValue::Array(_) => 3,
        }
    }

    match (left, right) {
        (FormulaValue::String(l), FormulaValue::String(r)) => {
            l.to_lowercase().cmp(&r.to_lowercase())
        }
        (FormulaValue::Boolean(l), FormulaValue::Boolean(r)) => l.cmp(r),
        _ => match (left.as_number(), right.as_number()) {
            (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
            _ => rank(left).cmp(&rank(right)),
        },
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &FormulaExpr,
    ctx: &dyn EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let n = evaluate(operand, ctx)?.to_number()?;

    match op {
        UnaryOperator::Negate => Ok(FormulaValue::Number(-n)),
        UnaryOperator::Plus => Ok(FormulaValue::Number(n)),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &dyn EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let registry = get_function_registry();

    let func = registry
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    // Check argument count
    if args.len() < func.min_args {
        return Err(FormulaError::Arity {
            function: func.name.to_string(),
            expected: format!("at least {}", func.min_args),
            actual: args.len(),
        });
    }

    if let Some(max) = func.max_args {
        if args.len() > max {
            return Err(FormulaError::Arity {
                function: func.name.to_string(),
                expected: format!("at most {}", max),
                actual: args.len(),
            });
        }
    }

    match func.implementation {
        FunctionImpl::Lazy(f) => f(args, ctx),
        FunctionImpl::Values(f) => {
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                evaluated_args.push(evaluate(arg, ctx)?);
            }
            f(&evaluated_args, ctx)
        }
    }
}
