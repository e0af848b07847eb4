// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document-store adapter: nested-field NoSQL documents.

use chrono::{DateTime, Utc};
use mp_core::{hash_prefix_id, origin, parse_ts, pick_first, safe_stringify, Interaction};
use serde_json::{Map, Value};

use super::{id_of, text_of, TEXT_FIELDS, TS_FIELDS};

/// Convert a document into an [`Interaction`].
///
/// Text comes from the first meaningful text-ish field, else a compact
/// stringification of the whole document. The id falls back from the
/// caller-supplied `doc_id` through `id`/`_id` fields to a hash prefix.
#[must_use]
pub fn doc_to_interaction(
    doc: &Map<String, Value>,
    source: Option<&str>,
    doc_id: Option<&str>,
    now: DateTime<Utc>,
) -> Interaction {
    let raw = Value::Object(doc.clone());
    let ts = pick_first(doc, &TS_FIELDS)
        .and_then(parse_ts)
        .unwrap_or(now);
    let text = pick_first(doc, &TEXT_FIELDS)
        .map(text_of)
        .unwrap_or_else(|| safe_stringify(&raw));
    let id = doc_id
        .map(str::to_string)
        .or_else(|| doc.get("id").and_then(id_of))
        .or_else(|| doc.get("_id").and_then(id_of))
        .unwrap_or_else(|| hash_prefix_id(&raw));

    Interaction {
        id: Some(id),
        ts,
        kind: origin::DOC_STORE.to_string(),
        text,
        source: source.map(str::to_string),
        data: Some(raw),
        meta: Map::new(),
    }
}

/// Convert a `doc_id -> doc` batch; each id becomes the interaction id and
/// the source pointer is scoped to the collection path.
#[must_use]
pub fn doc_map_to_interactions(
    docs: &Map<String, Value>,
    collection_path: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<Interaction> {
    docs.iter()
        .filter_map(|(doc_id, doc)| doc.as_object().map(|d| (doc_id, d)))
        .map(|(doc_id, doc)| {
            let source = collection_path.map(|c| format!("docstore:{c}/{doc_id}"));
            doc_to_interaction(doc, source.as_deref(), Some(doc_id), now)
        })
        .collect()
}

/// Convert an ordered list of docs; the source pointer is scoped to the
/// collection path and ids fall back to per-doc rules.
#[must_use]
pub fn doc_list_to_interactions(
    docs: &[Value],
    collection_path: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<Interaction> {
    let source = collection_path.map(|c| format!("docstore:{c}"));
    docs.iter()
        .filter_map(Value::as_object)
        .map(|doc| doc_to_interaction(doc, source.as_deref(), None, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 3, 10, 0, 0).unwrap()
    }

    fn doc(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn picks_text_field_and_timestamp() {
        let d = doc(json!({
            "message": "moved to Bulawayo",
            "updatedAt": "2026-02-01T08:00:00Z",
            "noise": 1
        }));
        let it = doc_to_interaction(&d, None, None, at());
        assert_eq!(it.text, "moved to Bulawayo");
        assert_eq!(it.ts, Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap());
        assert_eq!(it.kind, "document-store");
    }

    #[test]
    fn falls_back_to_stringify_when_no_text_field() {
        let d = doc(json!({"count": 3, "done": false}));
        let it = doc_to_interaction(&d, None, None, at());
        assert_eq!(it.text, "count: 3; done: false");
    }

    #[test]
    fn missing_timestamp_uses_injected_now() {
        let d = doc(json!({"text": "hi"}));
        assert_eq!(doc_to_interaction(&d, None, None, at()).ts, at());
    }

    #[test]
    fn id_fallback_chain() {
        let with_id = doc(json!({"id": "abc", "_id": "shadowed"}));
        assert_eq!(doc_to_interaction(&with_id, None, None, at()).id.unwrap(), "abc");

        let with_under = doc(json!({"_id": 42}));
        assert_eq!(doc_to_interaction(&with_under, None, None, at()).id.unwrap(), "42");

        let bare = doc(json!({"text": "x"}));
        let hashed = doc_to_interaction(&bare, None, None, at()).id.unwrap();
        assert_eq!(hashed.len(), 16);

        let forced = doc_to_interaction(&with_id, None, Some("forced"), at());
        assert_eq!(forced.id.unwrap(), "forced");
    }

    #[test]
    fn map_batch_scopes_pointer_and_uses_keys_as_ids() {
        let batch = doc(json!({"d1": {"text": "one"}, "d2": {"text": "two"}}));
        let its = doc_map_to_interactions(&batch, Some("apps/main"), at());
        assert_eq!(its.len(), 2);
        assert_eq!(its[0].id.as_deref(), Some("d1"));
        assert_eq!(its[0].source.as_deref(), Some("docstore:apps/main/d1"));
    }

    #[test]
    fn list_batch_scopes_pointer_to_collection() {
        let docs = vec![json!({"text": "one"}), json!({"text": "two"})];
        let its = doc_list_to_interactions(&docs, Some("apps/main"), at());
        assert_eq!(its.len(), 2);
        assert_eq!(its[1].source.as_deref(), Some("docstore:apps/main"));
    }

    #[test]
    fn raw_payload_is_retained() {
        let d = doc(json!({"text": "hi", "secret": 9}));
        let it = doc_to_interaction(&d, None, None, at());
        assert_eq!(it.data.unwrap()["secret"], 9);
    }
}
