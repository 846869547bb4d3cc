//! Math functions

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{finite, EvaluationContext, FormulaValue};

/// Collect the numbers the aggregate functions operate on
///
/// Numbers inside ranges count; text, logical and empty cells in a range are
/// skipped. Scalar arguments must be numeric (logical values count as 1/0).
fn numeric_args(args: &[FormulaValue]) -> FormulaResult<Vec<f64>> {
    let mut numbers = Vec::new();

    for arg in args {
        match arg {
            FormulaValue::Number(n) => numbers.push(*n),
            FormulaValue::Boolean(b) => numbers.push(if *b { 1.0 } else { 0.0 }),
            FormulaValue::Empty => {}
            FormulaValue::Array(arr) => {
                for row in arr {
                    for cell in row {
                        if let FormulaValue::Number(n) = cell {
                            numbers.push(*n);
                        }
                    }
                }
            }
            FormulaValue::String(s) => {
                return Err(FormulaError::Type(format!(
                    "text argument \"{}\" where a number is required",
                    s
                )))
            }
        }
    }

    Ok(numbers)
}

/// SUM function
pub fn fn_sum(args: &[FormulaValue], _ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    let sum: f64 = numeric_args(args)?.iter().sum();
    finite(sum)
}

/// AVERAGE function
pub fn fn_average(
    args: &[FormulaValue],
    _ctx: &dyn EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let numbers = numeric_args(args)?;

    if numbers.is_empty() {
        return Err(FormulaError::DivisionByZero);
    }

    let sum: f64 = numbers.iter().sum();
    finite(sum / numbers.len() as f64)
}

/// MIN function; 0 when there is nothing numeric
pub fn fn_min(args: &[FormulaValue], _ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    let min = numeric_args(args)?.into_iter().reduce(f64::min);
    Ok(FormulaValue::Number(min.unwrap_or(0.0)))
}

/// MAX function; 0 when there is nothing numeric
pub fn fn_max(args: &[FormulaValue], _ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    let max = numeric_args(args)?.into_iter().reduce(f64::max);
    Ok(FormulaValue::Number(max.unwrap_or(0.0)))
}

/// COUNT function: number of numeric values, never an error
pub fn fn_count(args: &[FormulaValue], _ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    let mut count = 0;

    for arg in args {
        match arg {
            FormulaValue::Number(_) => count += 1,
            FormulaValue::Array(arr) => {
                count += arr
                    .iter()
                    .flatten()
                    .filter(|v| matches!(v, FormulaValue::Number(_)))
                    .count();
            }
            _ => {}
        }
    }

    Ok(FormulaValue::Number(count as f64))
}

/// ABS function
pub fn fn_abs(args: &[FormulaValue], _ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = scalar_number(args.first())?;
    Ok(FormulaValue::Number(number.abs()))
}

/// ROUND(number, [num_digits]), half away from zero
pub fn fn_round(args: &[FormulaValue], _ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
    let number = scalar_number(args.first())?;
    let num_digits = match args.get(1) {
        Some(v) => scalar_number(Some(v))?.trunc() as i32,
        None => 0,
    };

    // For negative digits, we round to the left of the decimal point
    let multiplier = 10_f64.powi(num_digits);
    if multiplier == 0.0 {
        // Rounding to a place above any finite f64
        return Ok(FormulaValue::Number(0.0));
    }
    let scaled = number * multiplier;
    if !multiplier.is_finite() || !scaled.is_finite() {
        // Already exact at that many digits
        return finite(number);
    }

    finite(scaled.round() / multiplier)
}

fn scalar_number(arg: Option<&FormulaValue>) -> FormulaResult<f64> {
    match arg {
        Some(FormulaValue::Array(_)) => Err(FormulaError::Type(
            "range given where a single number is required".into(),
        )),
        Some(value) => value.to_number(),
        None => Ok(0.0),
    }
}
