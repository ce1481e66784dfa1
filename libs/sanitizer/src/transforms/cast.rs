//! Type casts and null/empty coalescing.
//!
//! These operate on the whole value. Null passes through every cast so that
//! optional fields stay optional; unparseable strings pass through as well.

use serde_json::{Number, Value};

use super::arg;

pub fn int(value: Value, _args: &[String]) -> Value {
    let converted = match &value {
        Value::Number(n) if n.is_i64() || n.is_u64() => None,
        Value::Number(n) => n.as_f64().and_then(truncate),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(truncate))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };

    converted.map(Value::from).unwrap_or(value)
}

fn truncate(n: f64) -> Option<i64> {
    let truncated = n.trunc();
    (truncated.is_finite() && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64)
        .then_some(truncated as i64)
}

pub fn float(value: Value, _args: &[String]) -> Value {
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(value)
}

const TRUTHY: &[&str] = &["1", "true", "yes", "on", "y"];
const FALSY: &[&str] = &["0", "false", "no", "off", "n", ""];

/// Registered as `bool`.
pub fn boolean(value: Value, _args: &[String]) -> Value {
    let converted = match &value {
        Value::Number(n) => Some(n.as_f64().is_some_and(|n| n != 0.0)),
        Value::String(s) => {
            let normalized = s.trim().to_ascii_lowercase();
            if TRUTHY.contains(&normalized.as_str()) {
                Some(true)
            } else if FALSY.contains(&normalized.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    };

    converted.map(Value::Bool).unwrap_or(value)
}

pub fn string(value: Value, _args: &[String]) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => other,
    }
}

/// Wraps a non-array value in a one-element array; null becomes `[]`.
pub fn array(value: Value, _args: &[String]) -> Value {
    match value {
        Value::Array(_) => value,
        Value::Null => Value::Array(Vec::new()),
        other => Value::Array(vec![other]),
    }
}

pub fn empty_to_null(value: Value, _args: &[String]) -> Value {
    if matches!(&value, Value::String(s) if s.trim().is_empty()) {
        Value::Null
    } else {
        value
    }
}

/// `default:value` replaces null or `""` with `value`. Without an argument
/// the value is left alone.
pub fn default_value(value: Value, args: &[String]) -> Value {
    let is_blank = match &value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    };

    match arg(args, 0) {
        Some(fallback) if is_blank => Value::String(fallback.to_string()),
        _ => value,
    }
}
