//! Logical functions

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{evaluate, EvaluationContext, FormulaValue};

/// IF(condition, value_if_true, [value_if_false])
///
/// Only the chosen branch is evaluated, so an error (or a cycle) in the other
/// branch does not affect the result.
pub fn fn_if(args: &[FormulaExpr], ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    let (condition, if_true) = match args {
        [condition, if_true, ..] => (condition, if_true),
        _ => {
            return Err(FormulaError::Arity {
                function: "IF".into(),
                expected: "at least 2".into(),
                actual: args.len(),
            })
        }
    };

    if evaluate(condition, ctx)?.to_bool()? {
        evaluate(if_true, ctx)
    } else {
        match args.get(2) {
            Some(if_false) => evaluate(if_false, ctx),
            None => Ok(FormulaValue::Boolean(false)),
        }
    }
}

/// Truth values of all arguments: scalars must be logical or numeric, ranges
/// contribute their logical and numeric cells only
fn logical_args(name: &str, args: &[FormulaValue]) -> FormulaResult<Vec<bool>> {
    let mut values = Vec::new();

    for arg in args {
        match arg {
            FormulaValue::Array(arr) => values.extend(
                arr.iter()
                    .flatten()
                    .filter(|v| matches!(v, FormulaValue::Boolean(_) | FormulaValue::Number(_)))
                    .filter_map(FormulaValue::as_bool),
            ),
            FormulaValue::Empty => {}
            other => values.push(other.to_bool()?),
        }
    }

    if values.is_empty() {
        return Err(FormulaError::Type(format!("{} has no logical values", name)));
    }

    Ok(values)
}

/// AND function
pub fn fn_and(args: &[FormulaValue], _ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    let values = logical_args("AND", args)?;
    Ok(FormulaValue::Boolean(values.into_iter().all(|b| b)))
}

/// OR function
pub fn fn_or(args: &[FormulaValue], _ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    let values = logical_args("OR", args)?;
    Ok(FormulaValue::Boolean(values.into_iter().any(|b| b)))
}

/// NOT function
pub fn fn_not(args: &[FormulaValue], _ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    match args.first() {
        Some(FormulaValue::Array(_)) | None => Err(FormulaError::Type(
            "NOT requires a single logical value".into(),
        )),
        Some(value) => Ok(FormulaValue::Boolean(!value.to_bool()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::NoReferences;

    fn b(v: bool) -> FormulaValue {
        FormulaValue::Boolean(v)
    }

    #[test]
    fn test_if() {
        let args = [
            FormulaExpr::Number(0.0),
            FormulaExpr::String("yes".into()),
            FormulaExpr::String("no".into()),
        ];
        assert_eq!(
            fn_if(&args, &NoReferences).unwrap(),
            FormulaValue::String("no".into())
        );
        assert_eq!(fn_if(&args[..2], &NoReferences).unwrap(), b(false));

        let text_condition = [FormulaExpr::String("maybe".into()), FormulaExpr::Number(1.0)];
        assert!(matches!(
            fn_if(&text_condition, &NoReferences),
            Err(FormulaError::Type(_))
        ));
    }

    #[test]
    fn test_and_or() {
        let n = FormulaValue::Number;
        assert_eq!(fn_and(&[b(true), n(1.0)], &NoReferences).unwrap(), b(true));
        assert_eq!(fn_and(&[b(true), n(0.0)], &NoReferences).unwrap(), b(false));
        assert_eq!(fn_or(&[b(false), n(2.0)], &NoReferences).unwrap(), b(true));
        assert_eq!(fn_or(&[b(false), n(0.0)], &NoReferences).unwrap(), b(false));

        // Text inside a range is skipped, but a range with nothing logical is an error
        let range = FormulaValue::Array(vec![vec![FormulaValue::String("x".into()), b(false)]]);
        assert_eq!(fn_or(&[range], &NoReferences).unwrap(), b(false));
        let texts = FormulaValue::Array(vec![vec![FormulaValue::String("x".into())]]);
        assert!(matches!(fn_and(&[texts], &NoReferences), Err(FormulaError::Type(_))));
    }

    #[test]
    fn test_not() {
        assert_eq!(fn_not(&[b(true)], &NoReferences).unwrap(), b(false));
        assert_eq!(fn_not(&[FormulaValue::Number(0.0)], &NoReferences).unwrap(), b(true));
        assert!(matches!(
            fn_not(&[FormulaValue::String("x".into())], &NoReferences),
            Err(FormulaError::Type(_))
        ));
    }
}
