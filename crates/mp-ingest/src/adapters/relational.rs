// SPDX-License-Identifier: MIT OR Apache-2.0
//! Relational-row adapter.
//!
//! Same structure as the document-store adapter, but rows also surface
//! `action`/`event` columns as text and remember their table.

use chrono::{DateTime, Utc};
use mp_core::{hash_prefix_id, origin, parse_ts, pick_first, safe_stringify, Interaction};
use serde_json::{json, Map, Value};

use super::{id_of, text_of};

/// Text columns probed on rows; extends the document probe set with
/// audit-log style columns.
const ROW_TEXT_FIELDS: [&str; 11] = [
    "text",
    "message",
    "content",
    "description",
    "notes",
    "summary",
    "title",
    "name",
    "status",
    "action",
    "event",
];

/// Timestamp columns, snake_case first (relational convention).
const ROW_TS_FIELDS: [&str; 6] = [
    "updated_at",
    "created_at",
    "timestamp",
    "date",
    "updatedAt",
    "createdAt",
];

/// Convert one table row into an [`Interaction`].
#[must_use]
pub fn row_to_interaction(
    row: &Map<String, Value>,
    table: Option<&str>,
    source: Option<&str>,
    row_id: Option<&str>,
    now: DateTime<Utc>,
) -> Interaction {
    let raw = Value::Object(row.clone());
    let ts = pick_first(row, &ROW_TS_FIELDS)
        .and_then(parse_ts)
        .unwrap_or(now);
    let text = pick_first(row, &ROW_TEXT_FIELDS)
        .map(text_of)
        .unwrap_or_else(|| safe_stringify(&raw));
    let id = row_id
        .map(str::to_string)
        .or_else(|| row.get("id").and_then(id_of))
        .or_else(|| row.get("_id").and_then(id_of))
        .unwrap_or_else(|| hash_prefix_id(&raw));
    let source = source
        .map(str::to_string)
        .or_else(|| table.map(|t| format!("table:{t}")));

    let mut meta = Map::new();
    if let Some(t) = table {
        meta.insert("table".to_string(), json!(t));
    }

    Interaction {
        id: Some(id),
        ts,
        kind: origin::RELATIONAL.to_string(),
        text,
        source,
        data: Some(raw),
        meta,
    }
}

/// Convert a batch of rows: a list, or a `row_id -> row` mapping.
#[must_use]
pub fn rows_to_interactions(
    rows: &Value,
    table: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<Interaction> {
    match rows {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|row| row_to_interaction(row, table, None, None, now))
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(row_id, row)| row.as_object().map(|r| (row_id, r)))
            .map(|(row_id, row)| {
                let source = table.map(|t| format!("table:{t}:{row_id}"));
                row_to_interaction(row, table, source.as_deref(), Some(row_id), now)
            })
            .collect(),
        _ => Vec::new(),
    }
}
