// SPDX-License-Identifier: MIT OR Apache-2.0
//! Model-backed implementation of the fallback summarizer seam.

use async_trait::async_trait;
use mp_core::safe_stringify;
use mp_ingest::{SummarizeError, Summarizer, UNSTRUCTURED_FALLBACK};
use serde_json::Value;

use crate::client::{GenerationOptions, ModelClient, ModelError};
use crate::prompts;

/// Summarizes opaque objects through a [`ModelClient`].
///
/// Never resolves to a blank string: an empty model answer becomes the
/// [`UNSTRUCTURED_FALLBACK`] literal.
#[derive(Debug, Clone)]
pub struct FallbackSummarizer<C> {
    client: C,
}

impl<C: ModelClient> FallbackSummarizer<C> {
    /// Wrap a model client.
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: ModelClient> Summarizer for FallbackSummarizer<C> {
    async fn summarize(
        &self,
        payload: &Value,
        source_hint: &str,
        source_pointer: Option<&str>,
        ts_iso: &str,
    ) -> Result<String, SummarizeError> {
        let object_json =
            serde_json::to_string_pretty(payload).unwrap_or_else(|_| safe_stringify(payload));
        let user = prompts::summarizer_user_prompt(
            source_hint,
            source_pointer.unwrap_or(""),
            ts_iso,
            &object_json,
        );
        let options = GenerationOptions {
            temperature: 0.2,
            json_response: false,
        };

        match self
            .client
            .generate(prompts::SUMMARIZER_SYSTEM_PROMPT, &user, &options)
            .await
        {
            Ok(text) => {
                let trimmed = text.trim();
                Ok(if trimmed.is_empty() {
                    UNSTRUCTURED_FALLBACK.to_string()
                } else {
                    trimmed.to_string()
                })
            }
            Err(ModelError::EmptyResponse) => Ok(UNSTRUCTURED_FALLBACK.to_string()),
            Err(err) => Err(SummarizeError(err.to_string())),
        }
    }
}
