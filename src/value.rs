//! Helpers over the dynamic value type used throughout rendering.
//!
//! Template data, scope bindings and filter results are all
//! [`serde_json::Value`]: a closed tagged union of null, bool, number,
//! string, sequence and mapping. The crate enables `preserve_order`, so
//! mappings iterate in insertion order.

use serde_json::{Number, Value};

/// Human-readable type name used in diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Truthiness shared by every conditional directive.
///
/// `null`, `false`, numeric zero, the empty string and the empty sequence
/// are falsey. Everything else, including any mapping, is truthy.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use vtpl::value::is_truthy;
///
/// assert!(!is_truthy(&json!(0)));
/// assert!(!is_truthy(&json!("")));
/// assert!(is_truthy(&json!("0")));
/// assert!(is_truthy(&json!([0])));
/// ```
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Stringify a value for output.
///
/// Null renders as the empty string; sequences and mappings render as
/// compact JSON.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Build a number value, collapsing integral floats to integers.
///
/// Non-finite results have no JSON representation and become null.
pub fn number(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Value::Number(Number::from(f as i64))
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Structural equality that compares numbers by value, so `1 == 1.0`.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(k, x)| ys.get(k).is_some_and(|y| loose_eq(x, y)))
        }
        _ => a == b,
    }
}
