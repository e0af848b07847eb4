// SPDX-License-Identifier: MIT OR Apache-2.0
//! HTTP-level tests for the Gemini-style client against a mock server.

use mp_extract::{GeminiClient, GenerationOptions, ModelClient, ModelError};
use mp_ingest::{Summarizer, UNSTRUCTURED_FALLBACK};
use mp_extract::FallbackSummarizer;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn candidates(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {"content": {"parts": [{"text": text}]}}
        ]
    })
}

#[tokio::test]
async fn posts_generate_content_and_reads_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-3-flash:generateContent"))
        .and(query_param("key", "secret"))
        .and(body_partial_json(json!({
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates("{\"facts\": []}")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("secret", "gemini-3-flash")
        .unwrap()
        .with_api_base(server.uri());
    let options = GenerationOptions {
        temperature: 0.2,
        json_response: true,
    };
    let text = client.generate("system", "user", &options).await.unwrap();
    assert_eq!(text, "{\"facts\": []}");
}

#[tokio::test]
async fn multiple_parts_are_concatenated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                {"content": {"parts": [{"text": "hello "}, {"text": "world"}]}}
            ]
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k", "m").unwrap().with_api_base(server.uri());
    let text = client
        .generate("s", "u", &GenerationOptions::default())
        .await
        .unwrap();
    assert_eq!(text, "hello world");
}

#[tokio::test]
async fn non_success_status_surfaces_code_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k", "m").unwrap().with_api_base(server.uri());
    let err = client
        .generate("s", "u", &GenerationOptions::default())
        .await
        .unwrap_err();
    match err {
        ModelError::Status { code, body } => {
            assert_eq!(code, 429);
            assert!(body.contains("quota"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_candidate_text_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates("   ")))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k", "m").unwrap().with_api_base(server.uri());
    let err = client
        .generate("s", "u", &GenerationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::EmptyResponse));
}

#[tokio::test]
async fn summarizer_turns_empty_answers_into_the_fallback_literal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates("")))
        .mount(&server)
        .await;

    let client = GeminiClient::new("k", "m").unwrap().with_api_base(server.uri());
    let summarizer = FallbackSummarizer::new(client);
    let text = summarizer
        .summarize(&json!({"x": 1}), "kv-tree", None, "2026-02-03T10:00:00+00:00")
        .await
        .unwrap();
    assert_eq!(text, UNSTRUCTURED_FALLBACK);
}

#[tokio::test]
async fn summarizer_trims_model_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidates("\n  A profile snapshot for an active user.\n")),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::new("k", "m").unwrap().with_api_base(server.uri());
    let summarizer = FallbackSummarizer::new(client);
    let text = summarizer
        .summarize(&json!({"s": 1}), "kv-tree", Some("kv:/users/u1"), "2026-02-03T10:00:00+00:00")
        .await
        .unwrap();
    assert_eq!(text, "A profile snapshot for an active user.");
}
