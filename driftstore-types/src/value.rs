//! Helpers over raw attribute values.
//!
//! Attribute values travel as [`serde_json::Value`]. Two operations on them
//! need to be identical on every replica: the canonical string that feeds
//! the version hash, and the ordering used by comparison-based merge
//! strategies and query filters.

use std::cmp::Ordering;

use serde_json::Value;

/// The canonical string form of a value, used when hashing a version.
///
/// This is compact JSON. `serde_json`'s default map type keeps object keys
/// sorted, so the output is deterministic for structurally equal values
/// regardless of insertion order.
#[must_use]
pub fn canonical(value: &Value) -> String {
    serde_json::to_string(value).expect("json value serializes to json")
}

/// Compares two values, when they are comparable.
///
/// Values of the same kind compare naturally: booleans, numbers (integers
/// compared exactly, mixed integer/float compared as floats), strings, and
/// arrays (lexicographic, element-wise). Objects compare by canonical string.
/// Two nulls are equal. Values of different kinds are not comparable and
/// yield `None`.
#[must_use]
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(xi), Some(yi)) => Some(xi.cmp(&yi)),
            _ => x.as_f64().partial_cmp(&y.as_f64()),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Array(x), Value::Array(y)) => {
            for (xe, ye) in x.iter().zip(y.iter()) {
                match compare(xe, ye)? {
                    Ordering::Equal => continue,
                    ord => return Some(ord),
                }
            }
            Some(x.len().cmp(&y.len()))
        }
        (Value::Object(_), Value::Object(_)) => Some(canonical(a).cmp(&canonical(b))),
        _ => None,
    }
}
