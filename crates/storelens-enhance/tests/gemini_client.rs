//! `GeminiClient` against a `wiremock` stand-in for the Gemini API.

use serde_json::json;
use storelens_enhance::{EnhanceError, GeminiClient, TextModel};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

fn test_client(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key", "gemini-test")
        .expect("failed to build test client")
        .with_base_url(&server.uri())
}

#[tokio::test]
async fn sends_instruction_and_sampling_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "be brief"}]},
            "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
            "generationConfig": {"maxOutputTokens": 400, "topK": 40}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "  Hi there. "}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = test_client(&server).complete("be brief", "hello").await.unwrap();

    assert_eq!(reply, "Hi there.");
}

#[tokio::test]
async fn multi_part_candidates_are_concatenated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "[1,"}, {"text": "2]"}]}}]
        })))
        .mount(&server)
        .await;

    let reply = test_client(&server).complete("s", "p").await.unwrap();

    assert_eq!(reply, "[1,2]");
}

#[tokio::test]
async fn api_error_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server).complete("s", "p").await.unwrap_err();

    match err {
        EnhanceError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn blocked_prompt_without_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server).complete("s", "p").await.unwrap_err();

    assert!(matches!(err, EnhanceError::EmptyResponse));
}

#[tokio::test]
async fn non_json_success_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server).complete("s", "p").await.unwrap_err();

    assert!(matches!(err, EnhanceError::Deserialize { .. }));
}
