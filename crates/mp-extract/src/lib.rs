// SPDX-License-Identifier: MIT OR Apache-2.0
//! mp-extract
//!
//! Turns one [`Interaction`] into a candidate [`PassportUpdate`] by calling
//! a generative model with a fixed "beliefs, not quotes" prompt and a JSON
//! schema echo, then validating and normalizing the response item by item.
//!
//! Only [`Interaction::short_text`] ever reaches the model; raw payloads do
//! not.
//!
//! [`Interaction`]: mp_core::Interaction
//! [`Interaction::short_text`]: mp_core::Interaction::short_text
//! [`PassportUpdate`]: mp_core::PassportUpdate
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// The model-client seam and its HTTP implementation.
pub mod client;
/// Fixed prompt text.
pub mod prompts;
/// Model-backed fallback summarizer.
pub mod summarizer;
mod validate;

pub use client::{GeminiClient, GenerationOptions, ModelClient, ModelError, DEFAULT_MODEL};
pub use summarizer::FallbackSummarizer;

use chrono::{DateTime, Utc};
use mp_core::{Interaction, PassportUpdate};
use serde_json::Value;
use tracing::debug;

/// Default character bound on prompt text.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 4000;

/// Errors from one extraction attempt.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The model answered, but not with parseable JSON. Fatal for the
    /// current interaction; the raw text is attached for diagnostics.
    #[error("extractor returned invalid JSON: {reason}\n{raw}")]
    InvalidJson {
        /// Parse error detail.
        reason: String,
        /// Verbatim model output.
        raw: String,
    },

    /// The model transport failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Model-backed extractor producing candidate passport updates.
#[derive(Debug, Clone)]
pub struct Extractor<C> {
    client: C,
    max_prompt_chars: usize,
}

impl<C: ModelClient> Extractor<C> {
    /// Wrap a model client with the default prompt bound.
    pub fn new(client: C) -> Self {
        Self {
            client,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }

    /// Override the character bound applied to interaction text.
    #[must_use]
    pub fn with_max_prompt_chars(mut self, max_prompt_chars: usize) -> Self {
        self.max_prompt_chars = max_prompt_chars;
        self
    }

    /// [`Extractor::extract_at`] stamped now.
    ///
    /// # Errors
    ///
    /// See [`ExtractError`].
    pub async fn extract(
        &self,
        interaction: &Interaction,
        source_id: &str,
    ) -> Result<PassportUpdate, ExtractError> {
        self.extract_at(interaction, source_id, Utc::now()).await
    }

    /// Extract candidate facts/prefs/entities/open loops from one
    /// interaction, stamping every surviving item with `source_id`.
    ///
    /// # Errors
    ///
    /// [`ExtractError::Model`] on transport failure,
    /// [`ExtractError::InvalidJson`] when the response is not JSON. Either
    /// way the passport is untouched for this interaction; item-level
    /// problems are handled by dropping the item, not by failing.
    pub async fn extract_at(
        &self,
        interaction: &Interaction,
        source_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PassportUpdate, ExtractError> {
        let user = prompts::extractor_user_prompt(
            source_id,
            &interaction.kind,
            &interaction.ts.to_rfc3339(),
            &interaction.short_text(self.max_prompt_chars),
        );
        let options = GenerationOptions {
            temperature: 0.2,
            json_response: true,
        };
        let raw = self
            .client
            .generate(prompts::EXTRACTOR_SYSTEM_PROMPT, &user, &options)
            .await?;

        let parsed: Value =
            serde_json::from_str(raw.trim()).map_err(|err| ExtractError::InvalidJson {
                reason: err.to_string(),
                raw: raw.clone(),
            })?;

        let update = validate::validate_update(&parsed, source_id, now);
        debug!(
            source_id,
            facts = update.facts.len(),
            prefs = update.prefs.len(),
            entities = update.entities.len(),
            open_loops = update.open_loops.len(),
            "extracted update"
        );
        Ok(update)
    }
}
