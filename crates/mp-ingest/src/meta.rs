// SPDX-License-Identifier: MIT OR Apache-2.0
//! Caller-supplied ingest metadata.

use mp_core::SourceKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Optional metadata accompanying one ingest call.
///
/// Recognized keys steer id/source/timestamp assignment; anything else is
/// carried through into [`Interaction::meta`] untouched via `extra`.
///
/// [`Interaction::meta`]: mp_core::Interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestMeta {
    /// Stable user identifier to stamp onto the passport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_key: Option<String>,

    /// Human-readable source pointer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Alias for `source` kept for callers that spell it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_pointer: Option<String>,

    /// Fixes the SourceRef id instead of deriving a short token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    /// Fixes the SourceRef kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SourceKind>,

    /// Overrides the interaction origin tag.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Fixes the interaction id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Timestamp for inputs that carry none of their own (string or unix).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,

    /// Table name for relational rows lacking an envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Collection path scoping document-store batch pointers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_path: Option<String>,

    /// Unrecognized keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IngestMeta {
    /// The effective source pointer (`source` wins over `source_pointer`).
    #[must_use]
    pub fn pointer(&self) -> Option<&str> {
        self.source.as_deref().or(self.source_pointer.as_deref())
    }

    /// Serialize into the map stored on [`Interaction::meta`].
    ///
    /// [`Interaction::meta`]: mp_core::Interaction
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unrecognized_keys_survive_the_round_trip() {
        let meta: IngestMeta = serde_json::from_value(json!({
            "user_key": "u1",
            "session": "s-77",
            "weight": 2
        }))
        .unwrap();
        assert_eq!(meta.user_key.as_deref(), Some("u1"));
        assert_eq!(meta.extra["session"], json!("s-77"));
        let map = meta.to_map();
        assert_eq!(map["weight"], json!(2));
        assert!(!map.contains_key("source_id"));
    }

    #[test]
    fn pointer_prefers_source() {
        let meta = IngestMeta {
            source: Some("a".into()),
            source_pointer: Some("b".into()),
            ..IngestMeta::default()
        };
        assert_eq!(meta.pointer(), Some("a"));
    }
}
