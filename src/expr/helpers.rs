//! Built-in helper functions reachable from expression calls.
//!
//! Grounded on the original engine's `report_env.globals` registrations
//! (`SUM`, `COUNT`, `AVG`, `avg`, `total`, `str`) plus three formatting
//! helpers (`format_mask`, `format_number`, `display_format`) that the
//! original applies automatically via its Jinja `finalize` hook rather
//! than as callables — exposed here as ordinary helpers so an expression
//! can invoke them directly.

use crate::expr::error::{ExprError, ExprResult};
use crate::value::Value;

fn numeric_list(value: &Value) -> Vec<f64> {
    match value {
        Value::List(items) => items.iter().map(|v| v.numeric_or_zero()).collect(),
        other => vec![other.numeric_or_zero()],
    }
}

/// `SUM(list)` — sums a list of numbers, or a single scalar treated as a
/// one-element list (a helper called against `values(field)` output).
pub fn sum(args: &[Value]) -> ExprResult<Value> {
    let values = args
        .first()
        .ok_or_else(|| ExprError::HelperError("SUM".into(), "expected one argument".into()))?;
    let total: f64 = numeric_list(values).into_iter().sum();
    Ok(Value::Float(total))
}

/// `COUNT(list)` — length of a list, or 1 for a scalar.
pub fn count(args: &[Value]) -> ExprResult<Value> {
    let values = args
        .first()
        .ok_or_else(|| ExprError::HelperError("COUNT".into(), "expected one argument".into()))?;
    let n = match values {
        Value::List(items) => items.len(),
        _ => 1,
    };
    Ok(Value::Integer(n as i64))
}

/// `AVG(list)` — arithmetic mean, zero for an empty list.
pub fn avg(args: &[Value]) -> ExprResult<Value> {
    let values = args
        .first()
        .ok_or_else(|| ExprError::HelperError("AVG".into(), "expected one argument".into()))?;
    let nums = numeric_list(values);
    if nums.is_empty() {
        return Ok(Value::Float(0.0));
    }
    let total: f64 = nums.iter().sum();
    Ok(Value::Float(total / nums.len() as f64))
}

/// `total(records, field)` — sums `field` across a list of records,
/// treating missing/null as zero. Mirrors the original's `total(op, field)`
/// helper restricted to its default `sum` operator.
pub fn total(args: &[Value]) -> ExprResult<Value> {
    if args.len() != 2 {
        return Err(ExprError::HelperError(
            "total".into(),
            "expected (records, field)".into(),
        ));
    }
    let records = match &args[0] {
        Value::List(items) => items,
        other => {
            return Err(ExprError::HelperError(
                "total".into(),
                format!("expected a list of records, got {other}"),
            ))
        }
    };
    let field = args[1].to_string();
    let sum: f64 = records
        .iter()
        .map(|rec| rec.get(&field).map(|v| v.numeric_or_zero()).unwrap_or(0.0))
        .sum();
    Ok(Value::Float(sum))
}

/// `str(value)` — stringify using the same `Display` rules as interpolation.
pub fn str_helper(args: &[Value]) -> ExprResult<Value> {
    let value = args
        .first()
        .ok_or_else(|| ExprError::HelperError("str".into(), "expected one argument".into()))?;
    Ok(Value::String(value.to_string()))
}

/// `format_number(value, decimals)` — fixed-point numeric formatting.
pub fn format_number(args: &[Value]) -> ExprResult<Value> {
    let value = args.first().ok_or_else(|| {
        ExprError::HelperError("format_number".into(), "expected (value, decimals)".into())
    })?;
    let decimals = args
        .get(1)
        .and_then(|v| v.as_f64())
        .map(|f| f as usize)
        .unwrap_or(2);
    let n = value
        .as_f64()
        .ok_or_else(|| ExprError::TypeError(format!("{value} is not numeric")))?;
    Ok(Value::String(format!("{n:.decimals$}")))
}

/// `format_mask(value, mask)` — positional digit mask, `#` consumes one
/// digit of the stringified value from the right (e.g. mask `"###-##"`
/// over `12345` yields `"123-45"`).
pub fn format_mask(args: &[Value]) -> ExprResult<Value> {
    if args.len() != 2 {
        return Err(ExprError::HelperError(
            "format_mask".into(),
            "expected (value, mask)".into(),
        ));
    }
    let digits: Vec<char> = args[0].to_string().chars().filter(|c| c.is_ascii_digit()).collect();
    let mask = args[1].to_string();
    let mut digit_iter = digits.iter().rev();
    let mut out: Vec<char> = Vec::with_capacity(mask.len());
    for ch in mask.chars().rev() {
        if ch == '#' {
            out.push(*digit_iter.next().unwrap_or(&'0'));
        } else {
            out.push(ch);
        }
    }
    out.reverse();
    Ok(Value::String(out.into_iter().collect()))
}

/// `display_format(value, kind, fmt)` — dispatches to numeric or
/// date/time formatting, mirroring the original's `finalize()` hook
/// which reads a `Text`'s own `display_format` attribute.
pub fn display_format(args: &[Value]) -> ExprResult<Value> {
    if args.len() != 3 {
        return Err(ExprError::HelperError(
            "display_format".into(),
            "expected (value, kind, format)".into(),
        ));
    }
    let kind = args[1].to_string();
    match kind.as_str() {
        "Numeric" => format_number(&[args[0].clone(), Value::Integer(2)]).or_else(|_| {
            Ok(Value::String(args[0].to_string()))
        }),
        "DateTime" => match &args[0] {
            Value::Date(d) => Ok(Value::String(d.format(&args[2].to_string()).to_string())),
            Value::DateTime(d) => Ok(Value::String(d.format(&args[2].to_string()).to_string())),
            other => Ok(Value::String(other.to_string())),
        },
        _ => Ok(Value::String(args[0].to_string())),
    }
}
