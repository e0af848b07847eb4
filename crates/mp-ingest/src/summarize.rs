// SPDX-License-Identifier: MIT OR Apache-2.0
//! Weak-text detection and optional fallback summarization.
//!
//! Deterministic stringification sometimes produces text too thin to extract
//! from. When a summarizer is wired in, such interactions get their `text`
//! rewritten; `data` is never modified.

use async_trait::async_trait;
use mp_core::{truncate_chars, Interaction};
use serde_json::{json, Value};
use tracing::debug;

use crate::IngestConfig;

/// Literal used when a summarizer yields nothing usable.
pub const UNSTRUCTURED_FALLBACK: &str = "Database object (unstructured).";

/// Minimum trimmed length below which text is considered too weak.
const MIN_TEXT_CHARS: usize = 30;

/// Minimum alphanumeric-to-total ratio for usable text.
const MIN_ALNUM_RATIO: f64 = 0.35;

/// Error surfaced by a [`Summarizer`] implementation.
#[derive(Debug, thiserror::Error)]
#[error("summarizer failed: {0}")]
pub struct SummarizeError(pub String);

/// A remote service that turns an opaque object into a few lines of prose.
///
/// Implementations must never resolve to a blank string; return
/// [`UNSTRUCTURED_FALLBACK`] when the model has nothing to say.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `payload` into 2–8 lines of plain text.
    async fn summarize(
        &self,
        payload: &Value,
        source_hint: &str,
        source_pointer: Option<&str>,
        ts_iso: &str,
    ) -> Result<String, SummarizeError>;
}

/// Decide whether text is too weak to hand to the extractor: empty, shorter
/// than 30 chars after trimming, or mostly non-alphanumeric.
#[must_use]
pub fn is_text_too_weak(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() {
        return true;
    }
    let total = t.chars().count();
    if total < MIN_TEXT_CHARS {
        return true;
    }
    let alnum = t.chars().filter(|c| c.is_alphanumeric()).count();
    (alnum as f64) / (total as f64) < MIN_ALNUM_RATIO
}

/// Bound every interaction's text, then rewrite the ones still too weak.
///
/// Truncation to `cfg.max_interaction_chars` always happens; summarization
/// requires the feature flag and a wired summarizer. The raw `data` payload
/// (when present) is what gets summarized, never the weak text alone.
pub async fn apply_fallback_summaries(
    mut interactions: Vec<Interaction>,
    cfg: &IngestConfig,
    summarizer: Option<&dyn Summarizer>,
) -> Result<Vec<Interaction>, SummarizeError> {
    for interaction in &mut interactions {
        if interaction.text.chars().count() > cfg.max_interaction_chars {
            interaction.text = truncate_chars(&interaction.text, cfg.max_interaction_chars);
        }

        let wants_summary = cfg.enable_fallback_summarizer && is_text_too_weak(&interaction.text);
        if let (true, Some(summarizer)) = (wants_summary, summarizer) {
            let payload = interaction
                .data
                .clone()
                .unwrap_or_else(|| json!({"text": interaction.text}));
            let improved = summarizer
                .summarize(
                    &payload,
                    &interaction.kind,
                    interaction.source.as_deref(),
                    &interaction.ts.to_rfc3339(),
                )
                .await?;
            if !improved.trim().is_empty() {
                debug!(id = ?interaction.id, "rewrote weak interaction text");
                interaction.text = truncate_chars(&improved, cfg.max_interaction_chars);
            }
        }

        // The extractor contract requires non-empty text no matter what.
        if interaction.text.trim().is_empty() {
            interaction.text = UNSTRUCTURED_FALLBACK.to_string();
        }
    }
    Ok(interactions)
}
