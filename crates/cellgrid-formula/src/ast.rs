//! Formula Abstract Syntax Tree types

use cellgrid_core::{CellRange, Position};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Numeric literal (integer and decimal literals both evaluate to f64)
    Number(f64),
    /// String literal
    String(String),

    // === References ===
    /// Single cell reference
    CellRef(Position),
    /// Range reference, only legal as a whole function argument
    RangeRef(CellRange),

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    // === Function call ===
    Function { name: String, args: Vec<FormulaExpr> },
}

impl FormulaExpr {
    /// Every cell or range this expression reads, in source order
    ///
    /// Single references come back as one-cell ranges. Ranges are not expanded,
    /// so a caller can clip them to its own extent first.
    pub fn references(&self) -> Vec<CellRange> {
        let mut refs = Vec::new();
        collect_references(self, &mut refs);
        refs
    }

    /// True if evaluating this expression never consults other cells
    pub fn is_self_contained(&self) -> bool {
        match self {
            FormulaExpr::Number(_) | FormulaExpr::String(_) => true,
            FormulaExpr::CellRef(_) | FormulaExpr::RangeRef(_) => false,
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.is_self_contained() && right.is_self_contained()
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.is_self_contained(),
            FormulaExpr::Function { args, .. } => args.iter().all(FormulaExpr::is_self_contained),
        }
    }
}

/// Walk an expression and push every referenced rectangle
pub fn collect_references(expr: &FormulaExpr, out: &mut Vec<CellRange>) {
    match expr {
        FormulaExpr::Number(_) | FormulaExpr::String(_) => {}
        FormulaExpr::CellRef(pos) => out.push(CellRange::single(*pos)),
        FormulaExpr::RangeRef(range) => out.push(*range),
        FormulaExpr::BinaryOp { left, right, .. } => {
            collect_references(left, out);
            collect_references(right, out);
        }
        FormulaExpr::UnaryOp { operand, .. } => collect_references(operand, out),
        FormulaExpr::Function { args, .. } => {
            for arg in args {
                collect_references(arg, out);
            }
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_keep_ranges_whole() {
        // =SUM(A1:B2) + C3
        let expr = FormulaExpr::BinaryOp {
            op: BinaryOperator::Add,
            left: Box::new(FormulaExpr::Function {
                name: "SUM".into(),
                args: vec![FormulaExpr::RangeRef(CellRange::new(
                    Position::new(0, 0),
                    Position::new(1, 1),
                ))],
            }),
            right: Box::new(FormulaExpr::CellRef(Position::new(2, 2))),
        };

        assert_eq!(
            expr.references(),
            vec![
                CellRange::new(Position::new(0, 0), Position::new(1, 1)),
                CellRange::single(Position::new(2, 2)),
            ]
        );
        assert!(!expr.is_self_contained());
    }

    #[test]
    fn test_self_contained() {
        let expr = FormulaExpr::UnaryOp {
            op: UnaryOperator::Negate,
            operand: Box::new(FormulaExpr::Function {
                name: "ABS".into(),
                args: vec![FormulaExpr::Number(3.0)],
            }),
        };
        assert!(expr.is_self_contained());
        assert!(expr.references().is_empty());
    }
}
