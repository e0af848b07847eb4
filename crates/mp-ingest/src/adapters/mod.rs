// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-shape adapters.
//!
//! Each adapter converts a single raw record into one [`Interaction`]
//! deterministically and without I/O; weak text is repaired later by the
//! coalescer, never here.
//!
//! [`Interaction`]: mp_core::Interaction

pub mod doc_store;
pub mod kv_tree;
pub mod relational;

/// Timestamp fields probed, camelCase first (document-store convention).
pub(crate) const TS_FIELDS: [&str; 6] = [
    "updatedAt",
    "updated_at",
    "createdAt",
    "created_at",
    "timestamp",
    "date",
];

/// Text fields probed on document-store docs, most specific first.
pub(crate) const TEXT_FIELDS: [&str; 9] = [
    "text",
    "message",
    "content",
    "description",
    "notes",
    "summary",
    "title",
    "name",
    "status",
];

use mp_core::safe_stringify;
use serde_json::Value;

/// Render a picked text field: strings pass through, anything else is
/// stringified compactly.
pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => safe_stringify(other),
    }
}

/// Render an id field that may be a string or a number.
pub(crate) fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
