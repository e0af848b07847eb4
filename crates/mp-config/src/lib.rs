// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading and validation for the Memory Passport engine.
//!
//! Provides [`EngineConfig`] (model names, context budget, and the embedded
//! ingest knobs) with TOML loading, semantic validation, and advisory
//! [`ConfigWarning`]s. Environment-variable wiring stays the caller's
//! concern.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use mp_ingest::IngestConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found or unreadable.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The context budget is below the renderer's clamp floor.
    TinyContextBudget {
        /// Configured budget in characters.
        chars: usize,
    },
    /// The interaction bound is unusually large for prompt inclusion.
    LargeInteractionBound {
        /// Configured bound in characters.
        chars: usize,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::TinyContextBudget { chars } => {
                write!(f, "context budget {chars} is below the render floor of 400 and will be clamped")
            }
            ConfigWarning::LargeInteractionBound { chars } => {
                write!(f, "max_interaction_chars {chars} is unusually large for a prompt")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Default model for both extraction and fallback summarization.
pub const DEFAULT_MODEL: &str = "gemini-3-flash";

/// Default context budget handed to the renderer.
pub const DEFAULT_CONTEXT_BUDGET: usize = 3000;

/// Bound above which [`ConfigWarning::LargeInteractionBound`] fires.
const LARGE_INTERACTION_THRESHOLD: usize = 100_000;

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_budget() -> usize {
    DEFAULT_CONTEXT_BUDGET
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Model used for structured extraction.
    #[serde(default = "default_model")]
    pub extractor_model: String,

    /// Model used for fallback summarization of opaque objects.
    #[serde(default = "default_model")]
    pub fallback_model: String,

    /// Override for the model API base URL (tests, proxies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Default character budget for rendered context.
    #[serde(default = "default_budget")]
    pub context_budget_chars: usize,

    /// Ingestion knobs.
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extractor_model: default_model(),
            fallback_model: default_model(),
            api_base: None,
            context_budget_chars: default_budget(),
            ingest: IngestConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate semantics, returning advisory warnings on success.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ValidationError`] listing every problem found.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut reasons = Vec::new();
        if self.extractor_model.trim().is_empty() {
            reasons.push("extractor_model must not be blank".to_string());
        }
        if self.fallback_model.trim().is_empty() {
            reasons.push("fallback_model must not be blank".to_string());
        }
        if self.ingest.max_interaction_chars == 0 {
            reasons.push("ingest.max_interaction_chars must be positive".to_string());
        }
        if !reasons.is_empty() {
            return Err(ConfigError::ValidationError { reasons });
        }

        let mut warnings = Vec::new();
        if self.context_budget_chars < 400 {
            warnings.push(ConfigWarning::TinyContextBudget {
                chars: self.context_budget_chars,
            });
        }
        if self.ingest.max_interaction_chars > LARGE_INTERACTION_THRESHOLD {
            warnings.push(ConfigWarning::LargeInteractionBound {
                chars: self.ingest.max_interaction_chars,
            });
        }
        Ok(warnings)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an [`EngineConfig`] from an optional TOML file path.
///
/// `None` yields the validated defaults. Returns the config together with
/// any advisory warnings.
///
/// # Errors
///
/// [`ConfigError::FileNotFound`], [`ConfigError::ParseError`], or
/// [`ConfigError::ValidationError`].
pub fn load_config(path: Option<&Path>) -> Result<(EngineConfig, Vec<ConfigWarning>), ConfigError> {
    let config = match path {
        None => EngineConfig::default(),
        Some(p) => {
            let text = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            toml::from_str(&text).map_err(|err| ConfigError::ParseError {
                reason: err.to_string(),
            })?
        }
    };
    let warnings = config.validate()?;
    Ok((config, warnings))
}
