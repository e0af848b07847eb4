// SPDX-License-Identifier: MIT OR Apache-2.0
//! KV-tree adapter: real-time key/value tree snapshots.

use chrono::{DateTime, Utc};
use mp_core::{hash_prefix_id, origin, parse_ts, pick_first, safe_stringify, Interaction};
use serde_json::{json, Map, Value};

use super::TS_FIELDS;

/// Convert one tree node into an [`Interaction`].
///
/// Only mapping nodes can carry a timestamp; everything is stringified for
/// text. Non-mapping payloads are wrapped as `{"value": ...}` in `data`.
#[must_use]
pub fn node_to_interaction(
    value: &Value,
    path: Option<&str>,
    node_id: Option<&str>,
    now: DateTime<Utc>,
) -> Interaction {
    let ts = value
        .as_object()
        .and_then(|m| pick_first(m, &TS_FIELDS))
        .and_then(parse_ts)
        .unwrap_or(now);
    let text = safe_stringify(value);
    let id = node_id
        .map(str::to_string)
        .or_else(|| path.map(|p| p.replace('/', "_")))
        .unwrap_or_else(|| hash_prefix_id(&json!({"path": path, "value": value})));
    let data = if value.is_object() {
        value.clone()
    } else {
        json!({"value": value})
    };

    Interaction {
        id: Some(id),
        ts,
        kind: origin::KV_TREE.to_string(),
        text,
        source: path.map(|p| format!("kv:{p}")),
        data: Some(data),
        meta: Map::new(),
    }
}

/// Convert a whole snapshot into interactions.
///
/// Lists yield one node per index (`path/idx`), mappings one per key
/// (`path/key`, key doubling as node id), scalars a single node at the
/// given path.
#[must_use]
pub fn tree_to_interactions(
    snapshot: &Value,
    base_path: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<Interaction> {
    let child = |segment: &str| match base_path {
        Some(base) => format!("{base}/{segment}"),
        None => segment.to_string(),
    };
    match snapshot {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, v)| node_to_interaction(v, Some(&child(&idx.to_string())), None, now))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| node_to_interaction(v, Some(&child(key)), Some(key), now))
            .collect(),
        scalar => vec![node_to_interaction(scalar, base_path, None, now)],
    }
}
