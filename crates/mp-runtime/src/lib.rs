// SPDX-License-Identifier: MIT OR Apache-2.0
//! mp-runtime
//!
//! The [`Engine`] facade: one call takes heterogeneous input all the way to
//! an updated passport: coalesce, record provenance, repair weak text,
//! extract per interaction, and merge **in arrival order** (the
//! temporal-truth guarantee).
//!
//! The engine is synchronous from the caller's perspective apart from two
//! awaited remote calls per interaction at most: extraction and optional
//! fallback summarization. It never merges out of order.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Tracing initialization helpers.
pub mod telemetry;

use chrono::{DateTime, Utc};
use mp_config::{load_config, ConfigError, EngineConfig};
use mp_core::{Interaction, Passport};
use mp_extract::{
    ExtractError, Extractor, FallbackSummarizer, GeminiClient, ModelClient, ModelError,
};
use mp_ingest::{
    apply_fallback_summaries, attach_sources, coerce_to_interactions_at, CoalesceOutput,
    IngestMeta, SummarizeError, Summarizer,
};
use mp_render::{export_context, DEFAULT_HEADER};
use mp_resolve::{merge_passport_update_at, ResolveStats};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Errors surfaced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Model client misconfiguration or transport failure.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Extraction failed for the current interaction. Merges from prior
    /// interactions are retained on the passport.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Fallback summarization failed.
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

/// What one ingest call produced.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The canonicalized interactions, in arrival order.
    pub interactions: Vec<Interaction>,
    /// One merge summary per interaction, same order.
    pub stats: Vec<ResolveStats>,
}

/// The assembled pipeline.
pub struct Engine {
    extractor: Extractor<Arc<dyn ModelClient>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    config: EngineConfig,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Wire the pipeline from explicit clients (one for extraction, one for
    /// summarization). Useful for tests and custom backends.
    #[must_use]
    pub fn from_clients(
        config: EngineConfig,
        extractor_client: Arc<dyn ModelClient>,
        summarizer_client: Arc<dyn ModelClient>,
    ) -> Self {
        let extractor = Extractor::new(extractor_client)
            .with_max_prompt_chars(config.ingest.max_interaction_chars);
        let summarizer: Arc<dyn Summarizer> =
            Arc::new(FallbackSummarizer::new(summarizer_client));
        Self {
            extractor,
            summarizer: Some(summarizer),
            config,
        }
    }

    /// Wire the pipeline with one shared client for both roles.
    #[must_use]
    pub fn new(config: EngineConfig, client: Arc<dyn ModelClient>) -> Self {
        Self::from_clients(config, Arc::clone(&client), client)
    }

    /// Build HTTP clients for the configured models from an API key.
    ///
    /// # Errors
    ///
    /// [`ModelError::MissingApiKey`] when the key is blank; construction
    /// fails immediately, nothing partial is returned.
    pub fn from_api_key(config: EngineConfig, api_key: &str) -> Result<Self, EngineError> {
        let mut extract = GeminiClient::new(api_key, &config.extractor_model)?;
        let mut fallback = GeminiClient::new(api_key, &config.fallback_model)?;
        if let Some(base) = &config.api_base {
            extract = extract.with_api_base(base.clone());
            fallback = fallback.with_api_base(base.clone());
        }
        Ok(Self::from_clients(config, Arc::new(extract), Arc::new(fallback)))
    }

    /// Load configuration from an optional TOML file, then build the HTTP
    /// clients. Advisory config warnings are logged.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] for unreadable/invalid config,
    /// [`EngineError::Model`] for a blank API key.
    pub fn from_config_path(path: Option<&Path>, api_key: &str) -> Result<Self, EngineError> {
        let (config, warnings) = load_config(path)?;
        for warning in &warnings {
            warn!(%warning, "config warning");
        }
        Self::from_api_key(config, api_key)
    }

    /// Drop the fallback summarizer; weak text is then extracted as-is.
    #[must_use]
    pub fn without_summarizer(mut self) -> Self {
        self.summarizer = None;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ingest any supported input into the passport.
    ///
    /// # Errors
    ///
    /// See [`Engine::ingest_at`].
    pub async fn ingest(
        &self,
        passport: &mut Passport,
        input: &Value,
        hint: Option<&str>,
        meta: &IngestMeta,
    ) -> Result<IngestOutcome, EngineError> {
        self.ingest_at(passport, input, hint, meta, Utc::now()).await
    }

    /// [`Engine::ingest`] with an injected `now` for deterministic tests.
    ///
    /// Interactions are extracted and merged strictly in arrival order; each
    /// merge is all-or-nothing. On error the passport keeps every merge that
    /// completed before the failing interaction.
    ///
    /// # Errors
    ///
    /// [`EngineError::Summarize`] if the fallback summarizer transport
    /// fails, [`EngineError::Extract`] if extraction fails for an
    /// interaction.
    #[instrument(skip_all, fields(hint = hint.unwrap_or("auto")))]
    pub async fn ingest_at(
        &self,
        passport: &mut Passport,
        input: &Value,
        hint: Option<&str>,
        meta: &IngestMeta,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, EngineError> {
        let CoalesceOutput {
            interactions,
            sources,
        } = coerce_to_interactions_at(input, hint, meta, now);

        if passport.user_key.is_none() {
            passport.user_key = meta.user_key.clone();
        }
        let source_ids = attach_sources(passport, sources);
        passport.touch_at(now);

        let interactions =
            apply_fallback_summaries(interactions, &self.config.ingest, self.summarizer.as_deref())
                .await?;

        let mut stats = Vec::with_capacity(interactions.len());
        for (interaction, source_id) in interactions.iter().zip(&source_ids) {
            let update = self.extractor.extract_at(interaction, source_id, now).await?;
            let (merged, merge_stats) =
                merge_passport_update_at(std::mem::take(passport), update, now);
            *passport = merged;
            stats.push(merge_stats);
        }

        info!(
            interactions = interactions.len(),
            facts = passport.facts.len(),
            "ingest complete"
        );
        Ok(IngestOutcome {
            interactions,
            stats,
        })
    }

    /// Render the passport as a context briefing under the configured (or
    /// supplied) character budget.
    #[must_use]
    pub fn export_context(&self, passport: &Passport, budget_chars: Option<usize>) -> String {
        export_context(
            passport,
            budget_chars.unwrap_or(self.config.context_budget_chars),
            DEFAULT_HEADER,
        )
    }
}
