// SPDX-License-Identifier: MIT OR Apache-2.0
//! The ingest coalescer: polymorphic input to paired interactions + sources.
//!
//! Single-pass and pure; the only ambient input is the injected `now` used
//! when a payload carries no timestamp of its own. No branch can fail: an
//! unrecognizable input degrades to the generic handling, never to an error.

use chrono::{DateTime, Utc};
use mp_core::{
    hash_prefix_id, origin, parse_ts, safe_stringify, sha256_json, short_source_id, Interaction,
    SourceKind, SourceRef,
};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::adapters::{doc_store, kv_tree, relational};
use crate::meta::IngestMeta;
use crate::shape::{classify, InputShape};

/// The coalescer's result: interactions and their provenance records,
/// paired index-wise (`interactions[i]` originated from `sources[i]`).
#[derive(Debug, Clone, Default)]
pub struct CoalesceOutput {
    /// Canonicalized input units, in arrival order.
    pub interactions: Vec<Interaction>,
    /// One provenance record per interaction.
    pub sources: Vec<SourceRef>,
}

impl CoalesceOutput {
    fn push(&mut self, interaction: Interaction, source: SourceRef) {
        self.interactions.push(interaction);
        self.sources.push(source);
    }

    fn absorb(&mut self, other: CoalesceOutput) {
        self.interactions.extend(other.interactions);
        self.sources.extend(other.sources);
    }
}

/// [`coerce_to_interactions_at`] with `now = Utc::now()`.
#[must_use]
pub fn coerce_to_interactions(
    input: &Value,
    hint: Option<&str>,
    meta: &IngestMeta,
) -> CoalesceOutput {
    coerce_to_interactions_at(input, hint, meta, Utc::now())
}

/// Convert arbitrary input into paired interactions and source refs.
///
/// Does not call any external service; fallback summarization happens later
/// in [`crate::apply_fallback_summaries`].
#[must_use]
pub fn coerce_to_interactions_at(
    input: &Value,
    hint: Option<&str>,
    meta: &IngestMeta,
    now: DateTime<Utc>,
) -> CoalesceOutput {
    let mut out = CoalesceOutput::default();

    match classify(input, hint) {
        InputShape::Transcript(text) => {
            let ts = meta.ts.as_ref().and_then(parse_ts).unwrap_or(now);
            let meta_map = meta.to_map();
            let payload = json!({"text": text, "meta": meta_map.clone()});
            let pointer = meta.pointer().map(str::to_string);
            let interaction = Interaction {
                id: meta.id.clone(),
                ts,
                kind: meta
                    .origin
                    .clone()
                    .unwrap_or_else(|| origin::TRANSCRIPT.to_string()),
                text: text.to_string(),
                source: pointer.clone(),
                data: None,
                meta: meta_map,
            };
            let source = make_source_ref(
                source_id(meta, 't', &payload),
                meta.kind.unwrap_or(SourceKind::Transcript),
                &payload,
                ts,
                pointer,
            );
            out.push(interaction, source);
        }

        InputShape::List(items) => {
            let base = meta.source_id.as_deref().unwrap_or("h").to_string();
            for (idx, sub) in items.iter().enumerate() {
                let mut sub_meta = meta.clone();
                // Per-index suffix keeps downstream ids stable per element.
                sub_meta.source_id = Some(format!("{base}_{idx}"));
                out.absorb(coerce_to_interactions_at(sub, hint, &sub_meta, now));
            }
        }

        InputShape::KvTreeEnvelope(map) => {
            let path = map
                .get("path")
                .and_then(Value::as_str)
                .or_else(|| meta.pointer())
                .map(str::to_string);
            let value = map
                .get("value")
                .or_else(|| map.get("data"))
                .cloned()
                .unwrap_or(Value::Null);
            let interaction = kv_tree::node_to_interaction(&value, path.as_deref(), None, now);
            let envelope = Value::Object(map.clone());
            let source = make_source_ref(
                source_id(meta, 'r', &envelope),
                SourceKind::KvTree,
                &envelope,
                interaction.ts,
                interaction.source.clone(),
            );
            out.push(interaction, source);
        }

        InputShape::RelationalEnvelope(map) => {
            let table = map
                .get("table")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| meta.table.clone());
            let row = map
                .get("row")
                .or_else(|| map.get("data"))
                .cloned()
                .unwrap_or_else(|| Value::Object(map.clone()));
            let row_map = match row {
                Value::Object(m) => m,
                other => {
                    let mut wrapped = Map::new();
                    wrapped.insert("value".to_string(), other);
                    wrapped
                }
            };
            let interaction =
                relational::row_to_interaction(&row_map, table.as_deref(), None, None, now);
            let envelope = Value::Object(map.clone());
            let source = make_source_ref(
                source_id(meta, 's', &envelope),
                SourceKind::Relational,
                &envelope,
                interaction.ts,
                interaction.source.clone(),
            );
            out.push(interaction, source);
        }

        InputShape::DocStoreBatch(map) => {
            let collection = meta.pointer().or(meta.collection_path.as_deref());
            for interaction in doc_store::doc_map_to_interactions(map, collection, now) {
                let payload = interaction.data.clone().unwrap_or(Value::Null);
                let source = make_source_ref(
                    source_id(meta, 'f', &payload),
                    SourceKind::DocumentStore,
                    &payload,
                    interaction.ts,
                    interaction.source.clone(),
                );
                out.push(interaction, source);
            }
        }

        InputShape::DocStoreSingle(map) => {
            let doc_id = map
                .get("id")
                .and_then(crate::adapters::id_of)
                .or_else(|| meta.id.clone());
            let interaction =
                doc_store::doc_to_interaction(map, meta.pointer(), doc_id.as_deref(), now);
            let payload = Value::Object(map.clone());
            let source = make_source_ref(
                source_id(meta, 'f', &payload),
                SourceKind::DocumentStore,
                &payload,
                interaction.ts,
                interaction.source.clone(),
            );
            out.push(interaction, source);
        }

        InputShape::GenericMap(map) => {
            let payload = Value::Object(map.clone());
            let ts = map.get("ts").and_then(parse_ts).unwrap_or(now);
            let pointer = meta.pointer().map(str::to_string);
            let interaction = Interaction {
                id: meta
                    .id
                    .clone()
                    .or_else(|| map.get("id").and_then(crate::adapters::id_of))
                    .or_else(|| Some(hash_prefix_id(&payload))),
                ts,
                kind: meta
                    .origin
                    .clone()
                    .unwrap_or_else(|| origin::UNKNOWN.to_string()),
                text: safe_stringify(&payload),
                source: pointer.clone(),
                data: Some(payload.clone()),
                meta: meta.to_map(),
            };
            let source = make_source_ref(
                source_id(meta, 'u', &payload),
                meta.kind.unwrap_or(SourceKind::Unknown),
                &payload,
                ts,
                pointer,
            );
            out.push(interaction, source);
        }

        InputShape::Scalar(value) => {
            let ts = meta.ts.as_ref().and_then(parse_ts).unwrap_or(now);
            let wrapped = json!({"value": value});
            let payload = json!({"value": value, "meta": meta.to_map()});
            let pointer = meta.pointer().map(str::to_string);
            let interaction = Interaction {
                id: meta.id.clone().or_else(|| Some(hash_prefix_id(&wrapped))),
                ts,
                kind: meta
                    .origin
                    .clone()
                    .unwrap_or_else(|| origin::UNKNOWN.to_string()),
                text: safe_stringify(value),
                source: pointer.clone(),
                data: Some(wrapped),
                meta: meta.to_map(),
            };
            let source = make_source_ref(
                source_id(meta, 'x', &payload),
                meta.kind.unwrap_or(SourceKind::Unknown),
                &payload,
                ts,
                pointer,
            );
            out.push(interaction, source);
        }
    }

    debug!(
        interactions = out.interactions.len(),
        "coalesced input into interactions"
    );
    out
}

fn source_id(meta: &IngestMeta, kind_letter: char, payload: &Value) -> String {
    meta.source_id
        .clone()
        .unwrap_or_else(|| short_source_id(kind_letter, payload))
}

fn make_source_ref(
    id: String,
    kind: SourceKind,
    payload: &Value,
    ts: DateTime<Utc>,
    pointer: Option<String>,
) -> SourceRef {
    SourceRef {
        id,
        kind,
        ts,
        hash: Some(sha256_json(payload)),
        source: pointer,
    }
}
