// SPDX-License-Identifier: MIT OR Apache-2.0
//! mp-core
//!
//! The stable contract for Memory Passport: the [`Passport`] aggregate and
//! its entry types, the [`Interaction`] input unit, and the canonical JSON
//! utilities (hashing, equality, stringification, key and timestamp
//! normalization) everything downstream builds on.
//!
//! If you only take one dependency, take this one.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Canonical JSON hashing and short provenance tokens.
pub mod hash;
/// The canonical input unit consumed by the extractor.
pub mod interaction;
/// Key normalization for the truth layer.
pub mod key;
/// Deterministic human-readable stringification.
pub mod stringify;
/// Best-effort timestamp parsing.
pub mod time;
/// JSON value equality and field probing.
pub mod value;

pub use hash::{hash_prefix_id, sha256_hex, sha256_json, short_source_id};
pub use interaction::{origin, Interaction};
pub use key::{key_ident, normalize_key};
pub use stringify::{safe_stringify, safe_stringify_with, truncate_chars, StringifyLimits};
pub use time::parse_ts;
pub use value::{pick_first, values_equal};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current passport schema version embedded in every serialized passport.
pub const PASSPORT_VERSION: &str = "1.0";

fn default_version() -> String {
    PASSPORT_VERSION.to_string()
}

fn default_confidence() -> f64 {
    0.7
}

// ---------------------------------------------------------------------------
// Facts and preferences
// ---------------------------------------------------------------------------

/// A current belief about the user: what is true now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Fact {
    /// Normalized key, e.g. `role`, `location_city`.
    pub key: String,

    /// Current value. Scalars preferred; any JSON value accepted.
    pub value: Value,

    /// When this fact became true, UTC.
    pub ts: DateTime<Utc>,

    /// Extraction confidence in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Id of the [`SourceRef`] this fact came from.
    pub source: String,
}

/// A stable preference: what the user likes or wants.
///
/// Identical in shape to [`Fact`]; kept as its own type because the two are
/// merged into separate lists and rendered as separate sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Preference {
    /// Normalized key, e.g. `tone`, `language`.
    pub key: String,

    /// Preferred value.
    pub value: Value,

    /// When this preference was observed, UTC.
    pub ts: DateTime<Utc>,

    /// Extraction confidence in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Id of the [`SourceRef`] this preference came from.
    pub source: String,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Category of a named entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A human being.
    Person,
    /// A company, team, or institution.
    Organization,
    /// A named body of work.
    Project,
    /// A product or service.
    Product,
    /// A geographic place.
    Place,
    /// A tool or piece of software.
    Tool,
    /// A skill or competency.
    Skill,
    /// An abstract concept.
    Concept,
    /// Anything that fits none of the above.
    #[default]
    Other,
}

impl EntityType {
    /// The serialized snake_case tag; also the deterministic sort key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Project => "project",
            Self::Product => "product",
            Self::Place => "place",
            Self::Tool => "tool",
            Self::Skill => "skill",
            Self::Concept => "concept",
            Self::Other => "other",
        }
    }
}

/// A named entity with its aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Entity {
    /// Canonical display name. Non-empty.
    pub name: String,

    /// Entity category.
    #[serde(rename = "type", default)]
    pub kind: EntityType,

    /// Alternate spellings, ordered first-seen, case-insensitively unique.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Entity {
    /// Create an entity with no aliases.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntityType) -> Self {
        Self {
            name: name.into(),
            kind,
            aliases: Vec::new(),
        }
    }

    /// Append an alias, trimming whitespace and keeping the list
    /// case-insensitively unique. Blank aliases are ignored.
    pub fn push_alias(&mut self, alias: &str) {
        let trimmed = alias.trim();
        if trimmed.is_empty() {
            return;
        }
        let ident = trimmed.to_lowercase();
        if self.aliases.iter().any(|a| a.to_lowercase() == ident) {
            return;
        }
        self.aliases.push(trimmed.to_string());
    }
}

// ---------------------------------------------------------------------------
// Open loops and contradictions
// ---------------------------------------------------------------------------

/// An unresolved item: a question, TODO, or missing detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct OpenLoop {
    /// The unresolved item text. Non-empty.
    pub item: String,

    /// When the loop was observed, UTC.
    pub ts: DateTime<Utc>,

    /// Id of the [`SourceRef`] this loop came from.
    pub source: String,
}

/// Immutable record of a value transition under one key.
///
/// Appended whenever two non-equal values are seen for the same key; the
/// roles are always assigned so that `ts_old <= ts_new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Contradiction {
    /// The fact or preference key that changed.
    pub key: String,
    /// Previous value.
    pub old: Value,
    /// New value.
    pub new: Value,
    /// Timestamp of the old value.
    pub ts_old: DateTime<Utc>,
    /// Timestamp of the new value.
    pub ts_new: DateTime<Utc>,
    /// Source id of the old value.
    pub source_old: String,
    /// Source id of the new value.
    pub source_new: String,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Origin family of a [`SourceRef`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Free-form transcript text.
    Transcript,
    /// Document-oriented NoSQL document.
    DocumentStore,
    /// Real-time key/value tree snapshot.
    KvTree,
    /// Relational row envelope.
    Relational,
    /// Chat log.
    Chat,
    /// Form submission.
    Form,
    /// Unclassified input.
    #[default]
    Unknown,
}

/// Provenance record attached to the passport.
///
/// Identity for linking (`Fact::source` etc.) uses the short [`SourceRef::id`];
/// integrity uses the full canonical [`SourceRef::hash`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SourceRef {
    /// Short token stable within one passport, e.g. `t4821230`.
    pub id: String,

    /// Origin family.
    #[serde(default)]
    pub kind: SourceKind,

    /// Timestamp of the source payload, UTC.
    pub ts: DateTime<Utc>,

    /// Hex SHA-256 over the canonical JSON of the raw payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Human-readable source pointer, e.g. `docstore:/applications/abc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

// ---------------------------------------------------------------------------
// Passport
// ---------------------------------------------------------------------------

/// Portable cognitive snapshot: the stable contract between ingestion and
/// downstream context injection.
///
/// Created empty by the caller and mutated only through
/// [`Passport::upsert_source`] and the resolver's merge. `updated_at`
/// refreshes on every completed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Passport {
    /// Passport schema version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Last mutation time, UTC.
    pub updated_at: DateTime<Utc>,

    /// Optional stable user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_key: Option<String>,

    /// Current beliefs, at most one per normalized key.
    #[serde(default)]
    pub facts: Vec<Fact>,

    /// Stable preferences, at most one per normalized key.
    #[serde(default)]
    pub prefs: Vec<Preference>,

    /// Named entities, unique under name/alias equivalence.
    #[serde(default)]
    pub entities: Vec<Entity>,

    /// Unresolved items, unique under collapsed-lowercase text.
    #[serde(default)]
    pub open_loops: Vec<OpenLoop>,

    /// Append-only ledger of resolved value transitions.
    #[serde(default)]
    pub contradictions: Vec<Contradiction>,

    /// Provenance records, unique by id.
    #[serde(default)]
    pub sources: Vec<SourceRef>,

    /// Free-form metadata (non-memory).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl Passport {
    /// Create an empty passport stamped now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: default_version(),
            updated_at: Utc::now(),
            user_key: None,
            facts: Vec::new(),
            prefs: Vec::new(),
            entities: Vec::new(),
            open_loops: Vec::new(),
            contradictions: Vec::new(),
            sources: Vec::new(),
            meta: Map::new(),
        }
    }

    /// Create an empty passport for a known user.
    #[must_use]
    pub fn for_user(user_key: impl Into<String>) -> Self {
        Self {
            user_key: Some(user_key.into()),
            ..Self::new()
        }
    }

    /// Add or replace a source by id, keeping the list unique.
    pub fn upsert_source(&mut self, src: SourceRef) {
        if let Some(existing) = self.sources.iter_mut().find(|s| s.id == src.id) {
            *existing = src;
        } else {
            self.sources.push(src);
        }
    }

    /// Refresh `updated_at` to now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Refresh `updated_at` to an injected instant (test-friendly).
    pub fn touch_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Default for Passport {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Extractor update
// ---------------------------------------------------------------------------

/// One extractor result for a single interaction: the candidate update the
/// resolver merges into a passport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PassportUpdate {
    /// Candidate facts.
    #[serde(default)]
    pub facts: Vec<Fact>,
    /// Candidate preferences.
    #[serde(default)]
    pub prefs: Vec<Preference>,
    /// Candidate entities.
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Candidate open loops.
    #[serde(default)]
    pub open_loops: Vec<OpenLoop>,
}

impl PassportUpdate {
    /// True when the update carries nothing to merge.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
            && self.prefs.is_empty()
            && self.entities.is_empty()
            && self.open_loops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upsert_source_replaces_by_id() {
        let mut p = Passport::new();
        p.upsert_source(SourceRef {
            id: "t1".into(),
            kind: SourceKind::Transcript,
            ts: Utc::now(),
            hash: Some("aa".into()),
            source: None,
        });
        p.upsert_source(SourceRef {
            id: "t1".into(),
            kind: SourceKind::Transcript,
            ts: Utc::now(),
            hash: Some("bb".into()),
            source: None,
        });
        assert_eq!(p.sources.len(), 1);
        assert_eq!(p.sources[0].hash.as_deref(), Some("bb"));
    }

    #[test]
    fn entity_alias_dedupe_is_case_insensitive() {
        let mut e = Entity::new("SozoGraph", EntityType::Project);
        e.push_alias("Sozo Graph");
        e.push_alias("  sozo graph ");
        e.push_alias("");
        assert_eq!(e.aliases, vec!["Sozo Graph"]);
    }

    #[test]
    fn fact_confidence_defaults_on_parse() {
        let f: Fact = serde_json::from_value(json!({
            "key": "role",
            "value": "developer",
            "ts": "2026-02-03T10:00:00Z",
            "source": "t1"
        }))
        .unwrap();
        assert_eq!(f.confidence, 0.7);
    }

    #[test]
    fn entity_type_default_is_other() {
        let e: Entity = serde_json::from_value(json!({"name": "Rust"})).unwrap();
        assert_eq!(e.kind, EntityType::Other);
    }

    #[test]
    fn source_kind_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(SourceKind::DocumentStore).unwrap(),
            json!("document-store")
        );
        assert_eq!(serde_json::to_value(SourceKind::KvTree).unwrap(), json!("kv-tree"));
    }
}
