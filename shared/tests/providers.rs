//! Provider client tests against a mocked chat-completions endpoint.

use httpmock::prelude::*;
use shared::ai_client::{AiProvider, HuggingFaceProvider, OpenAiProvider, ProviderError};

#[tokio::test]
async fn openai_provider_returns_completion_content() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"choices":[{"message":{"role":"assistant","content":"{\"technicalQuestions\":[]}"}}]}"#);
        })
        .await;

    let provider = OpenAiProvider::new("test-key", &server.base_url(), "gpt-test");
    let answer = provider.generate("prompt", 0.7).await.unwrap();
    assert_eq!(answer, "{\"technicalQuestions\":[]}");

    mock.assert_async().await;
}

#[tokio::test]
async fn openai_provider_without_key_fails_before_any_request() {
    let server = MockServer::start_async().await;
    let provider = OpenAiProvider::new("", &server.base_url(), "gpt-test");
    let err = provider.generate("prompt", 0.7).await.unwrap_err();
    assert!(matches!(err, ProviderError::MissingKey));
}

#[tokio::test]
async fn http_error_status_is_surfaced() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(503).body("overloaded");
        })
        .await;

    let provider = OpenAiProvider::new("test-key", &server.base_url(), "gpt-test");
    let err = provider.generate("prompt", 0.7).await.unwrap_err();
    assert!(matches!(err, ProviderError::Http(503)));
}

#[tokio::test]
async fn empty_completion_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#);
        })
        .await;

    let provider = OpenAiProvider::new("test-key", &server.base_url(), "gpt-test");
    let err = provider.generate("prompt", 0.7).await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyCompletion));
}

#[tokio::test]
async fn huggingface_provider_works_without_a_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .json_body_partial(r#"{"model":"test/model","stream":false}"#);
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#);
        })
        .await;

    let provider = HuggingFaceProvider::new("", &server.base_url(), "test/model");
    let answer = provider.generate("prompt", 0.6).await.unwrap();
    assert_eq!(answer, "ok");

    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_provider_body_is_a_parse_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body("not json");
        })
        .await;

    let provider = HuggingFaceProvider::new("key", &server.base_url(), "test/model");
    let err = provider.generate("prompt", 0.6).await.unwrap_err();
    assert!(matches!(err, ProviderError::Parse(_)));
}
