// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deterministic human-readable stringification of arbitrary JSON values.
//!
//! This is what turns an opaque database object into `Interaction` text when
//! no obvious text field exists. Limits bound every level of the recursion so
//! large blobs never flood a prompt.

use serde_json::Value;

/// Caps applied at every recursion level of [`safe_stringify_with`].
#[derive(Debug, Clone, Copy)]
pub struct StringifyLimits {
    /// Maximum mapping entries rendered before `…`.
    pub max_keys: usize,
    /// Maximum list entries rendered before `…`.
    pub max_list: usize,
    /// Maximum characters per string before ellipsis truncation.
    pub max_str: usize,
}

impl Default for StringifyLimits {
    fn default() -> Self {
        Self {
            max_keys: 20,
            max_list: 20,
            max_str: 500,
        }
    }
}

/// Truncate to at most `max` characters, the last one being `…` when the
/// input was longer. Char-boundary safe.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// [`safe_stringify_with`] under the default limits.
#[must_use]
pub fn safe_stringify(value: &Value) -> String {
    safe_stringify_with(value, StringifyLimits::default())
}

/// Deterministically render a JSON value as a compact human-readable string.
///
/// Scalars render as their textual form (`null` as the empty string), lists
/// as `[v1, v2]` with a trailing ` …` past `max_list` entries, mappings as
/// `k1: v1; k2: v2` with a `…` entry past `max_keys`. Mapping keys iterate
/// in their canonical (sorted) order.
///
/// # Examples
///
/// ```
/// use serde_json::json;
///
/// let doc = json!({"role": "developer", "city": "Harare"});
/// assert_eq!(mp_core::safe_stringify(&doc), "city: Harare; role: developer");
/// ```
#[must_use]
pub fn safe_stringify_with(value: &Value, limits: StringifyLimits) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => truncate_chars(s, limits.max_str),
        Value::Array(items) => {
            let rendered: Vec<String> = items
                .iter()
                .take(limits.max_list)
                .map(|v| safe_stringify_with(v, limits))
                .collect();
            let suffix = if items.len() > limits.max_list { " …" } else { "" };
            format!("[{}]{}", rendered.join(", "), suffix)
        }
        Value::Object(map) => {
            let mut parts: Vec<String> = Vec::with_capacity(map.len().min(limits.max_keys + 1));
            for (i, (k, v)) in map.iter().enumerate() {
                if i >= limits.max_keys {
                    parts.push("…".to_string());
                    break;
                }
                parts.push(format!("{k}: {}", safe_stringify_with(v, limits)));
            }
            parts.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars() {
        assert_eq!(safe_stringify(&json!(null)), "");
        assert_eq!(safe_stringify(&json!(true)), "true");
        assert_eq!(safe_stringify(&json!(42)), "42");
        assert_eq!(safe_stringify(&json!(1.5)), "1.5");
        assert_eq!(safe_stringify(&json!("hi")), "hi");
    }

    #[test]
    fn long_strings_truncate_with_ellipsis() {
        let long = "x".repeat(600);
        let out = safe_stringify(&json!(long));
        assert_eq!(out.chars().count(), 500);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn lists_cap_and_mark_overflow() {
        let items: Vec<i64> = (0..25).collect();
        let out = safe_stringify(&json!(items));
        assert!(out.starts_with("[0, 1, "));
        assert!(out.ends_with("] …"));
        assert!(!out.contains("24"));
    }

    #[test]
    fn mappings_cap_and_mark_overflow() {
        let mut obj = serde_json::Map::new();
        for i in 0..25 {
            obj.insert(format!("k{i:02}"), json!(i));
        }
        let out = safe_stringify(&Value::Object(obj));
        assert!(out.starts_with("k00: 0; "));
        assert!(out.ends_with("; …"));
    }

    #[test]
    fn limits_apply_recursively() {
        let nested = json!({"outer": {"inner": "y".repeat(600)}});
        let out = safe_stringify_with(
            &nested,
            StringifyLimits {
                max_str: 10,
                ..StringifyLimits::default()
            },
        );
        assert_eq!(out, format!("outer: inner: {}…", "y".repeat(9)));
    }

    #[test]
    fn truncate_chars_is_char_boundary_safe() {
        let s = "héllo wörld";
        let out = truncate_chars(s, 5);
        assert_eq!(out.chars().count(), 5);
        assert!(out.ends_with('…'));
    }
}
