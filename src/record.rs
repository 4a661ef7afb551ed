//! Records produced by the parsers and how their values compare

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde_json::{Number, Value};

/// One parsed row, keyed by header name in header order
pub type Record = IndexMap<String, Value>;

/// Rank of each JSON type when values of different types are compared
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Exact value of an integral JSON number
fn as_integer(number: &Number) -> Option<i128> {
    number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from))
}

/// Natural ordering of record values, used when sorting by the x-axis.
///
/// Values of the same type compare by content (numbers numerically, strings by code point).
/// Values of different types compare by type rank. Arrays and objects are not ordered among
/// themselves.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (as_integer(a), as_integer(b)) {
            // integers beyond 2^53 lose precision as f64
            (Some(a), Some(b)) => a.cmp(&b),
            _ => {
                let a = a.as_f64().unwrap_or(f64::NAN);
                let b = b.as_f64().unwrap_or(f64::NAN);
                a.total_cmp(&b)
            }
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Renders a value the way it appears in the input (strings without quotes)
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
