//! Built-in transform catalog.
//!
//! Every built-in is total: values of an unexpected type and missing or
//! malformed arguments leave the value unchanged instead of failing.
//!
//! Arrays are handled per transform. String shaping ([`text`]) and
//! formatting ([`format`]) transforms map element-wise over arrays, nested
//! arrays included. Casts and coalescing ([`cast`]) always see the whole value.
//! Objects are never descended into.

use serde_json::Value;

use crate::TransformRegistry;

pub mod cast;
pub mod format;
pub mod text;

/// Names of every built-in transform, in registration order.
pub const BUILTIN_NAMES: &[&str] = &[
    "trim",
    "ltrim",
    "rtrim",
    "lower",
    "upper",
    "ucfirst",
    "lcfirst",
    "ucwords",
    "capitalize",
    "squish",
    "strip_tags",
    "escape",
    "digits",
    "alpha",
    "alpha_num",
    "slug",
    "snake",
    "kebab",
    "camel",
    "int",
    "float",
    "bool",
    "string",
    "array",
    "empty_to_null",
    "default",
    "limit",
    "mask",
    "number_format",
    "date",
];

pub fn register_builtins(registry: &TransformRegistry) {
    registry.register("trim", text::trim);
    registry.register("ltrim", text::ltrim);
    registry.register("rtrim", text::rtrim);
    registry.register("lower", text::lower);
    registry.register("upper", text::upper);
    registry.register("ucfirst", text::ucfirst);
    registry.register("lcfirst", text::lcfirst);
    registry.register("ucwords", text::ucwords);
    registry.register("capitalize", text::capitalize);
    registry.register("squish", text::squish);
    registry.register("strip_tags", text::strip_tags);
    registry.register("escape", text::escape);
    registry.register("digits", text::digits);
    registry.register("alpha", text::alpha);
    registry.register("alpha_num", text::alpha_num);
    registry.register("slug", text::slug);
    registry.register("snake", text::snake);
    registry.register("kebab", text::kebab);
    registry.register("camel", text::camel);

    registry.register("int", cast::int);
    registry.register("float", cast::float);
    registry.register("bool", cast::boolean);
    registry.register("string", cast::string);
    registry.register("array", cast::array);
    registry.register("empty_to_null", cast::empty_to_null);
    registry.register("default", cast::default_value);

    registry.register("limit", format::limit);
    registry.register("mask", format::mask);
    registry.register("number_format", format::number_format);
    registry.register("date", format::date);
}

/// Applies `f` to every string in `value`, descending into arrays.
pub(crate) fn map_strings<F>(value: Value, f: &F) -> Value
where
    F: Fn(&str) -> String,
{
    match value {
        Value::String(s) => Value::String(f(&s)),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| map_strings(item, f)).collect())
        }
        other => other,
    }
}

/// Like [`map_strings`], but `f` may decline to transform an element.
pub(crate) fn map_scalars<F>(value: Value, f: &F) -> Value
where
    F: Fn(&Value) -> Option<Value>,
{
    match value {
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| map_scalars(item, f)).collect())
        }
        object @ Value::Object(_) => object,
        scalar => f(&scalar).unwrap_or(scalar),
    }
}

pub(crate) fn arg(args: &[String], index: usize) -> Option<&str> {
    args.get(index).map(String::as_str)
}

/// Numeric view of a value: numbers, and strings holding a number.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
