// SPDX-License-Identifier: MIT OR Apache-2.0
//! mp-ingest
//!
//! Turns heterogeneous, weakly-structured records (transcripts,
//! document-store docs, KV-tree snapshots, relational rows) into the
//! canonical [`Interaction`] stream plus provenance [`SourceRef`]s, and
//! records those sources on the passport.
//!
//! [`Interaction`]: mp_core::Interaction
//! [`SourceRef`]: mp_core::SourceRef
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Per-shape adapters.
pub mod adapters;
/// Polymorphic input to interactions + sources.
pub mod coalesce;
/// Caller-supplied ingest metadata.
pub mod meta;
/// Input-shape classification.
pub mod shape;
/// Weak-text detection and fallback summarization.
pub mod summarize;

pub use coalesce::{coerce_to_interactions, coerce_to_interactions_at, CoalesceOutput};
pub use meta::IngestMeta;
pub use shape::{classify, InputShape, ShapeHint};
pub use summarize::{
    apply_fallback_summaries, is_text_too_weak, SummarizeError, Summarizer,
    UNSTRUCTURED_FALLBACK,
};

use chrono::{DateTime, Utc};
use mp_core::{Interaction, Passport, SourceRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Ingestion knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Rewrite weak interaction text via the fallback summarizer.
    pub enable_fallback_summarizer: bool,
    /// Character bound applied to interaction text before extraction.
    pub max_interaction_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enable_fallback_summarizer: true,
            max_interaction_chars: 4000,
        }
    }
}

/// Upsert coalesced sources onto the passport, returning the id actually
/// stored for each (index-aligned with the input).
///
/// Two distinct payloads landing on the same short token get a
/// disambiguating `_2`/`_3`… suffix; re-ingesting the same payload replaces
/// its record in place.
pub fn attach_sources(passport: &mut Passport, sources: Vec<SourceRef>) -> Vec<String> {
    sources
        .into_iter()
        .map(|src| upsert_disambiguated(passport, src))
        .collect()
}

fn upsert_disambiguated(passport: &mut Passport, mut src: SourceRef) -> String {
    let base = src.id.clone();
    let mut attempt = 1usize;
    loop {
        match passport.sources.iter().position(|s| s.id == src.id) {
            None => {
                let id = src.id.clone();
                passport.sources.push(src);
                return id;
            }
            Some(i) if passport.sources[i].hash == src.hash => {
                let id = src.id.clone();
                passport.sources[i] = src;
                return id;
            }
            Some(_) => {
                attempt += 1;
                src.id = format!("{base}_{attempt}");
            }
        }
    }
}

/// One-stop ingest: coalesce, bound/repair text, record provenance.
///
/// Returns the updated passport together with the interactions, ready for
/// the extraction step. Bad input shapes never fail this call; only a
/// summarizer transport error can.
///
/// # Errors
///
/// Propagates [`SummarizeError`] from the wired summarizer.
pub async fn ingest(
    passport: Passport,
    input: &Value,
    hint: Option<&str>,
    meta: &IngestMeta,
    cfg: &IngestConfig,
    summarizer: Option<&dyn Summarizer>,
) -> Result<(Passport, Vec<Interaction>), SummarizeError> {
    ingest_at(passport, input, hint, meta, cfg, summarizer, Utc::now()).await
}

/// [`ingest`] with an injected `now` for deterministic tests.
///
/// # Errors
///
/// Propagates [`SummarizeError`] from the wired summarizer.
pub async fn ingest_at(
    mut passport: Passport,
    input: &Value,
    hint: Option<&str>,
    meta: &IngestMeta,
    cfg: &IngestConfig,
    summarizer: Option<&dyn Summarizer>,
    now: DateTime<Utc>,
) -> Result<(Passport, Vec<Interaction>), SummarizeError> {
    let CoalesceOutput {
        interactions,
        sources,
    } = coerce_to_interactions_at(input, hint, meta, now);

    let interactions = apply_fallback_summaries(interactions, cfg, summarizer).await?;

    if passport.user_key.is_none() {
        passport.user_key = meta.user_key.clone();
    }
    let source_count = sources.len();
    attach_sources(&mut passport, sources);
    passport.touch_at(now);

    info!(
        interactions = interactions.len(),
        sources = source_count,
        "ingested input"
    );
    Ok((passport, interactions))
}
