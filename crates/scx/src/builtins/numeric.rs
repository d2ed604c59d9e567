//! Arithmetic and comparison builtins.
//!
//! If any operand is real the whole computation is done in `f64` and the
//! result is real; otherwise integers are used with overflow checks. The
//! derived functions (`abs`, `sqrt`, `expt`, `mean`) always compute in `f64`
//! and then [`normalize`] the result.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::value::Value;
use std::cmp::Ordering;

enum Operands {
    Ints(Vec<i64>),
    Reals(Vec<f64>),
}

fn number(op: &'static str, value: Value) -> Result<f64> {
    match value {
        Value::Int(n) => Ok(n as f64),
        Value::Real(x) => Ok(x),
        other => Err(Error::Type { op, expected: "a number", found: other.type_name() }),
    }
}

fn operands(op: &'static str, args: &[Value]) -> Result<Operands> {
    let mut real = false;
    for arg in args {
        match arg {
            Value::Int(_) => {}
            Value::Real(_) => real = true,
            other => {
                return Err(Error::Type { op, expected: "a number", found: other.type_name() });
            }
        }
    }

    if real {
        args.iter()
            .map(|&arg| number(op, arg))
            .collect::<Result<_>>()
            .map(Operands::Reals)
    } else {
        Ok(Operands::Ints(
            args.iter()
                .filter_map(|arg| match arg {
                    Value::Int(n) => Some(*n),
                    _ => None,
                })
                .collect(),
        ))
    }
}

/// Presents `x` as an integer when it is finite, integral and in range.
pub(crate) fn normalize(x: f64) -> Value {
    // `i64::MAX as f64` rounds up to 2^63, hence the strict upper bound.
    if x.is_finite() && x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Value::Int(x as i64)
    } else {
        Value::Real(x)
    }
}

pub(super) fn add(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    match operands("+", args)? {
        Operands::Ints(values) => values
            .iter()
            .try_fold(0_i64, |acc, &n| acc.checked_add(n))
            .map(Value::Int)
            .ok_or(Error::Overflow { op: "+" }),
        Operands::Reals(values) => Ok(Value::Real(values.iter().sum())),
    }
}

pub(super) fn sub(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    match operands("-", args)? {
        Operands::Ints(values) => match values.split_first() {
            None => Ok(Value::Int(0)),
            Some((&first, rest)) => rest
                .iter()
                .try_fold(first, |acc, &n| acc.checked_sub(n))
                .map(Value::Int)
                .ok_or(Error::Overflow { op: "-" }),
        },
        Operands::Reals(values) => match values.split_first() {
            None => Ok(Value::Real(0.0)),
            Some((&first, rest)) => Ok(Value::Real(rest.iter().fold(first, |acc, &x| acc - x))),
        },
    }
}

pub(super) fn mul(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    if args.is_empty() {
        return Ok(Value::Int(0));
    }

    match operands("*", args)? {
        Operands::Ints(values) => values
            .iter()
            .try_fold(1_i64, |acc, &n| acc.checked_mul(n))
            .map(Value::Int)
            .ok_or(Error::Overflow { op: "*" }),
        Operands::Reals(values) => Ok(Value::Real(values.iter().product())),
    }
}

pub(super) fn div(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    match operands("/", args)? {
        Operands::Ints(values) => {
            let Some((&first, rest)) = values.split_first() else {
                return Ok(Value::Int(0));
            };

            // Stays integral while every step divides exactly.
            let mut exact = Some(first);
            let mut real = first as f64;
            for &divisor in rest {
                if divisor == 0 {
                    return Err(Error::DivisionByZero);
                }
                exact = match exact {
                    Some(n) => match n.checked_rem(divisor) {
                        Some(0) => Some(n / divisor),
                        Some(_) => None,
                        None => return Err(Error::Overflow { op: "/" }),
                    },
                    None => None,
                };
                real /= divisor as f64;
            }
            Ok(exact.map_or(Value::Real(real), Value::Int))
        }
        Operands::Reals(values) => {
            let Some((&first, rest)) = values.split_first() else {
                return Ok(Value::Int(0));
            };

            let mut quotient = first;
            for &divisor in rest {
                if divisor == 0.0 {
                    return Err(Error::DivisionByZero);
                }
                quotient /= divisor;
            }
            Ok(Value::Real(quotient))
        }
    }
}

fn compare(op: &'static str, args: &[Value], test: fn(Ordering) -> bool) -> Result<Value> {
    let holds = match operands(op, args)? {
        Operands::Ints(values) => values.windows(2).all(|pair| test(pair[0].cmp(&pair[1]))),
        Operands::Reals(values) => values
            .windows(2)
            .all(|pair| pair[0].partial_cmp(&pair[1]).is_some_and(test)),
    };
    Ok(Value::Bool(holds))
}

pub(super) fn lt(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    compare("<", args, Ordering::is_lt)
}

pub(super) fn le(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    compare("<=", args, Ordering::is_le)
}

pub(super) fn gt(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    compare(">", args, Ordering::is_gt)
}

pub(super) fn ge(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    compare(">=", args, Ordering::is_ge)
}

pub(super) fn num_eq(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    compare("=", args, Ordering::is_eq)
}

pub(super) fn abs(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    Ok(normalize(number("abs", args[0])?.abs()))
}

pub(super) fn sqrt(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let x = number("sqrt", args[0])?;
    if x < 0.0 {
        return Err(Error::Domain { op: "sqrt", value: x });
    }
    Ok(normalize(x.sqrt()))
}

pub(super) fn expt(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let base = number("expt", args[0])?;
    let exponent = number("expt", args[1])?;
    Ok(normalize(base.powf(exponent)))
}

pub(super) fn mean(_ctx: &mut Context, args: &[Value]) -> Result<Value> {
    let mut sum = 0.0;
    for &arg in args {
        sum += number("mean", arg)?;
    }
    Ok(normalize(sum / args.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(2.0), Value::Int(2));
        assert_eq!(normalize(-0.0), Value::Int(0));
        assert_eq!(normalize(2.5), Value::Real(2.5));
        assert_eq!(normalize(1e300), Value::Real(1e300));
        assert!(matches!(normalize(f64::NAN), Value::Real(x) if x.is_nan()));
        assert_eq!(normalize(f64::INFINITY), Value::Real(f64::INFINITY));
    }
}
