// SPDX-License-Identifier: MIT OR Apache-2.0
//! The canonical input unit consumed by the extractor.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::stringify::truncate_chars;

/// Well-known origin tags for [`Interaction::kind`].
///
/// The field stays a free-form string so new origins don't require a schema
/// change; these are the tags the built-in adapters emit.
pub mod origin {
    /// Free-form transcript text.
    pub const TRANSCRIPT: &str = "transcript";
    /// Document-oriented NoSQL document.
    pub const DOC_STORE: &str = "document-store";
    /// Real-time key/value tree node.
    pub const KV_TREE: &str = "kv-tree";
    /// Relational row envelope.
    pub const RELATIONAL: &str = "relational";
    /// Anything the classifier could not place.
    pub const UNKNOWN: &str = "unknown";
}

/// Canonical internal representation of any ingested input.
///
/// The extractor only ever sees [`Interaction::short_text`] plus minimal
/// metadata; raw payloads stay in [`Interaction::data`] for hashing and
/// evidence and never reach a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Interaction {
    /// Optional stable identifier (doc id, tree path, hash prefix).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Timestamp of the underlying event, best-effort, UTC.
    pub ts: DateTime<Utc>,

    /// Origin tag; see [`origin`] for the tags adapters emit.
    #[serde(rename = "type")]
    pub kind: String,

    /// Human-readable text used for extraction. Non-empty after coalescence.
    pub text: String,

    /// Human-readable source pointer, e.g. `docstore:/applications/abc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Raw input payload, kept for hashing and evidence only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Free-form metadata carried alongside (never sent to a model).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl Interaction {
    /// Truncated text safe for prompt inclusion: at most `max_chars`
    /// characters, ellipsis-terminated when cut.
    #[must_use]
    pub fn short_text(&self, max_chars: usize) -> String {
        truncate_chars(&self.text, max_chars)
    }
}
