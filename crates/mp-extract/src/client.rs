// SPDX-License-Identifier: MIT OR Apache-2.0
//! The model-client seam and its HTTP implementation.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Default extractor/summarizer model.
pub const DEFAULT_MODEL: &str = "gemini-3-flash";

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-request generation knobs.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Constrain the response to JSON.
    pub json_response: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            json_response: false,
        }
    }
}

/// Errors from the model transport.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No API key was supplied at construction.
    #[error("model API key is missing")]
    MissingApiKey,

    /// The HTTP request itself failed.
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("model returned status {code}: {body}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response parsed but carried no text.
    #[error("model response carried no text")]
    EmptyResponse,
}

/// A request/response generative backend.
///
/// Implementations must be cheap to share; the engine holds one behind an
/// `Arc` and uses it for both extraction and fallback summarization.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate text for a system + user prompt pair.
    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelError>;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for Arc<T> {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelError> {
        (**self).generate(system, user, options).await
    }
}

/// `generateContent`-style HTTP client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Build a client for `model`.
    ///
    /// # Errors
    ///
    /// [`ModelError::MissingApiKey`] when the key is empty; misconfiguration
    /// is fatal at construction, not at first use.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ModelError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key,
            model: model.into(),
        })
    }

    /// Point the client at a different API base (tests, proxies).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// The configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelError> {
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let mut generation_config = json!({"temperature": options.temperature});
        if options.json_response {
            generation_config["responseMimeType"] = json!("application/json");
        }
        let body = json!({
            "systemInstruction": {"parts": [{"text": system}]},
            "contents": [{"role": "user", "parts": [{"text": user}]}],
            "generationConfig": generation_config,
        });

        debug!(model = %self.model, json = options.json_response, "calling model");
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        let text = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(text)
    }
}
