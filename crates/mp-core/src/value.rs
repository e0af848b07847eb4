// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON value helpers: canonical equality and field probing.

use serde_json::{Map, Value};

/// JSON-ish equality used by the truth layer.
///
/// Strings compare whitespace-trimmed, numbers compare by numeric value
/// (so `1` equals `1.0`), everything else compares structurally.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.trim() == y.trim(),
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(p), Some(q)) => p == q,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Return the first value under the listed keys that is not null, an empty
/// string, an empty list, or an empty mapping.
#[must_use]
pub fn pick_first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| obj.get(*k).filter(|v| !is_emptyish(v)))
}

fn is_emptyish(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}
