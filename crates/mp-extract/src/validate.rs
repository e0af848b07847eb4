// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-item validation and normalization of raw extractor output.
//!
//! One malformed item never fails the batch: anything missing its required
//! `key`/`item`/`name`, or carrying an out-of-range confidence, is dropped
//! and the rest of the response survives.

use chrono::{DateTime, Utc};
use mp_core::{normalize_key, parse_ts, Entity, EntityType, Fact, OpenLoop, PassportUpdate, Preference};
use serde_json::Value;
use tracing::warn;

const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Normalize a parsed extractor response into a [`PassportUpdate`].
///
/// Every surviving item is stamped with `source_id`; timestamps fall back to
/// the injected `now` when absent or unparseable.
pub(crate) fn validate_update(raw: &Value, source_id: &str, now: DateTime<Utc>) -> PassportUpdate {
    let mut update = PassportUpdate::default();
    let mut dropped = 0usize;

    for item in items(raw, "facts") {
        match keyed_entry(item, now) {
            Some((key, value, ts, confidence)) => update.facts.push(Fact {
                key,
                value,
                ts,
                confidence,
                source: source_id.to_string(),
            }),
            None => dropped += 1,
        }
    }

    for item in items(raw, "prefs") {
        match keyed_entry(item, now) {
            Some((key, value, ts, confidence)) => update.prefs.push(Preference {
                key,
                value,
                ts,
                confidence,
                source: source_id.to_string(),
            }),
            None => dropped += 1,
        }
    }

    for item in items(raw, "entities") {
        match entity_entry(item) {
            Some(entity) => update.entities.push(entity),
            None => dropped += 1,
        }
    }

    for item in items(raw, "open_loops") {
        match item
            .get("item")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(text) => update.open_loops.push(OpenLoop {
                item: text.to_string(),
                ts: item.get("ts").and_then(parse_ts).unwrap_or(now),
                source: source_id.to_string(),
            }),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(source_id, dropped, "dropped malformed extractor items");
    }
    update
}

fn items<'a>(raw: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|a| a.iter())
        .unwrap_or_default()
}

type KeyedEntry = (String, Value, DateTime<Utc>, f64);

fn keyed_entry(item: &Value, now: DateTime<Utc>) -> Option<KeyedEntry> {
    let key = normalize_key(item.get("key")?.as_str()?);
    if key.is_empty() {
        return None;
    }
    let confidence = match item.get("confidence") {
        Some(c) => match c.as_f64() {
            // Numeric but out of range: malformed, drop the item.
            Some(v) if !(0.0..=1.0).contains(&v) => return None,
            Some(v) => v,
            None => DEFAULT_CONFIDENCE,
        },
        None => DEFAULT_CONFIDENCE,
    };
    let value = item.get("value").cloned().unwrap_or(Value::Null);
    let ts = item.get("ts").and_then(parse_ts).unwrap_or(now);
    Some((key, value, ts, confidence))
}

fn entity_entry(item: &Value) -> Option<Entity> {
    let name = item.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    // Unknown type strings degrade to `other` rather than dropping the item.
    let kind = item
        .get("type")
        .and_then(|t| serde_json::from_value::<EntityType>(t.clone()).ok())
        .unwrap_or(EntityType::Other);

    let mut entity = Entity::new(name, kind);
    if let Some(aliases) = item.get("aliases").and_then(Value::as_array) {
        for alias in aliases.iter().filter_map(Value::as_str) {
            entity.push_alias(alias);
        }
    }
    Some(entity)
}
