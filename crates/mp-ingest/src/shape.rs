// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input-shape classification.
//!
//! Polymorphic inputs are classified exactly once by a pure function; the
//! coalescer then dispatches on the tag. Priority: the explicit hint
//! argument, then a `_hint` field on the mapping, then heuristics.

use serde_json::{Map, Value};

/// Caller-supplied shape hint for mapping inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeHint {
    /// `{path, value}` key/value-tree envelope.
    KvTree,
    /// `{table, row}` relational envelope.
    Relational,
    /// Document-store document or batch.
    DocStore,
}

impl ShapeHint {
    /// Parse a hint string. Legacy vendor vocabulary is accepted alongside
    /// the canonical tags; anything else yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "kv-tree" | "kvtree" | "rtdb" => Some(Self::KvTree),
            "relational" | "supabase" | "sql" => Some(Self::Relational),
            "document-store" | "docstore" | "firestore" => Some(Self::DocStore),
            _ => None,
        }
    }
}

/// The computed shape of one input value.
#[derive(Debug, Clone, PartialEq)]
pub enum InputShape<'a> {
    /// A free-form transcript string.
    Transcript(&'a str),
    /// A heterogeneous list; each element dispatches independently.
    List(&'a [Value]),
    /// `{path, value|data}` envelope.
    KvTreeEnvelope(&'a Map<String, Value>),
    /// `{table, row|data}` envelope.
    RelationalEnvelope(&'a Map<String, Value>),
    /// Mapping of `doc_id -> doc` (every value itself a mapping).
    DocStoreBatch(&'a Map<String, Value>),
    /// A single document.
    DocStoreSingle(&'a Map<String, Value>),
    /// A mapping carrying an unrecognized hint; handled generically.
    GenericMap(&'a Map<String, Value>),
    /// A bare scalar or null.
    Scalar(&'a Value),
}

/// Classify one input value.
///
/// The batch-vs-single heuristic ("every value is a mapping") can
/// misclassify a single document whose fields are all nested objects; pass
/// a hint or a `_hint` field to override the family, noting that a `_hint`
/// field itself makes the mapping read as a single document.
#[must_use]
pub fn classify<'a>(input: &'a Value, hint: Option<&str>) -> InputShape<'a> {
    match input {
        Value::String(s) => InputShape::Transcript(s),
        Value::Array(items) => InputShape::List(items),
        Value::Object(map) => classify_mapping(map, hint),
        other => InputShape::Scalar(other),
    }
}

fn classify_mapping<'a>(map: &'a Map<String, Value>, hint: Option<&str>) -> InputShape<'a> {
    let raw_hint = hint.or_else(|| map.get("_hint").and_then(Value::as_str));
    if let Some(raw) = raw_hint {
        return match ShapeHint::parse(raw) {
            Some(ShapeHint::KvTree) => InputShape::KvTreeEnvelope(map),
            Some(ShapeHint::Relational) => InputShape::RelationalEnvelope(map),
            Some(ShapeHint::DocStore) => doc_store_shape(map),
            // Unrecognized hints demote the mapping to generic handling.
            None => InputShape::GenericMap(map),
        };
    }
    if looks_like_kv_envelope(map) {
        return InputShape::KvTreeEnvelope(map);
    }
    if looks_like_relational_envelope(map) {
        return InputShape::RelationalEnvelope(map);
    }
    doc_store_shape(map)
}

fn doc_store_shape(map: &Map<String, Value>) -> InputShape<'_> {
    if !map.is_empty() && map.values().all(Value::is_object) {
        InputShape::DocStoreBatch(map)
    } else {
        InputShape::DocStoreSingle(map)
    }
}

fn looks_like_kv_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key("path") && (map.contains_key("value") || map.contains_key("data"))
}

fn looks_like_relational_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key("table") && (map.contains_key("row") || map.contains_key("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: &Value) -> &Map<String, Value> {
        v.as_object().unwrap()
    }

    #[test]
    fn strings_are_transcripts() {
        assert!(matches!(classify(&json!("hello"), None), InputShape::Transcript("hello")));
    }

    #[test]
    fn kv_envelope_by_heuristic() {
        let v = json!({"path": "/users/u1", "value": {"name": "Ada"}});
        assert_eq!(classify(&v, None), InputShape::KvTreeEnvelope(obj(&v)));
    }

    #[test]
    fn relational_envelope_by_heuristic() {
        let v = json!({"table": "events", "row": {"action": "login"}});
        assert_eq!(classify(&v, None), InputShape::RelationalEnvelope(obj(&v)));
    }

    #[test]
    fn all_mapping_values_means_batch() {
        let v = json!({"d1": {"a": 1}, "d2": {"b": 2}});
        assert_eq!(classify(&v, None), InputShape::DocStoreBatch(obj(&v)));
    }

    #[test]
    fn mixed_values_mean_single_doc() {
        let v = json!({"title": "note", "body": {"a": 1}});
        assert_eq!(classify(&v, None), InputShape::DocStoreSingle(obj(&v)));
    }

    #[test]
    fn empty_mapping_is_a_single_doc() {
        let v = json!({});
        assert_eq!(classify(&v, None), InputShape::DocStoreSingle(obj(&v)));
    }

    #[test]
    fn explicit_hint_beats_envelope_heuristics() {
        let v = json!({"path": "/x", "value": 1});
        assert_eq!(classify(&v, Some("document-store")), InputShape::DocStoreSingle(obj(&v)));
    }

    #[test]
    fn hint_field_is_honored() {
        let v = json!({"_hint": "kv-tree", "anything": 1});
        assert_eq!(classify(&v, None), InputShape::KvTreeEnvelope(obj(&v)));
    }

    #[test]
    fn hint_argument_beats_hint_field() {
        let v = json!({"_hint": "kv-tree", "table": "t", "row": {}});
        assert_eq!(classify(&v, Some("relational")), InputShape::RelationalEnvelope(obj(&v)));
    }

    #[test]
    fn unrecognized_hint_goes_generic() {
        let v = json!({"_hint": "bogus", "a": 1});
        assert_eq!(classify(&v, None), InputShape::GenericMap(obj(&v)));
    }

    #[test]
    fn legacy_vendor_hints_parse() {
        assert_eq!(ShapeHint::parse("rtdb"), Some(ShapeHint::KvTree));
        assert_eq!(ShapeHint::parse("supabase"), Some(ShapeHint::Relational));
        assert_eq!(ShapeHint::parse(" Firestore "), Some(ShapeHint::DocStore));
    }

    #[test]
    fn scalars_classify_as_scalar() {
        assert!(matches!(classify(&json!(42), None), InputShape::Scalar(_)));
        assert!(matches!(classify(&json!(null), None), InputShape::Scalar(_)));
    }
}
