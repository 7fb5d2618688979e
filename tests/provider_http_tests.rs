// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parley::error::{ApiError, ParleyError};
use parley::llm::providers::{OpenAiProvider, OpenRouterProvider};
use parley::llm::{stream_with_callback, AiProvider, ChatMessage, ProviderInfo};

const COMPLETIONS: &str = "/v1/chat/completions";

fn openai(server: &MockServer, stream: bool) -> OpenAiProvider {
    OpenAiProvider::new(ProviderInfo::new(
        "OpenAI",
        format!("{}{}", server.uri(), COMPLETIONS),
        stream,
    ))
}

fn history() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("Be brief."),
        ChatMessage::user("Hello"),
    ]
}

fn sse(events: &[&str]) -> String {
    events
        .iter()
        .map(|event| format!("data: {}\n\n", event))
        .collect()
}

fn delta(text: &str) -> String {
    json!({"choices": [{"index": 0, "delta": {"content": text}}]}).to_string()
}

#[tokio::test]
async fn test_send_message_returns_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(header("authorization", "Bearer sk-test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "stream": false,
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi!"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = openai(&server, false)
        .send_message(&history(), "sk-test-key", "gpt-4o-mini")
        .await
        .unwrap();

    assert_eq!(reply, "Hi!");
}

#[tokio::test]
async fn test_stream_message_yields_fragments_in_order() {
    let server = MockServer::start().await;
    let first = delta("Hel");
    let second = delta("lo");
    let body = sse(&[&first, &second, "[DONE]"]);
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let provider = openai(&server, true);
    let mut chunks = Vec::new();
    let reply = stream_with_callback(&provider, &history(), "sk-test-key", "gpt-4o-mini", |c| {
        chunks.push(c.to_string())
    })
    .await
    .unwrap();

    assert_eq!(chunks, vec!["Hel", "lo"]);
    assert_eq!(reply, "Hello");
}

#[tokio::test]
async fn test_stream_without_done_ends_in_error() {
    let server = MockServer::start().await;
    let first = delta("partial");
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse(&[&first])),
        )
        .mount(&server)
        .await;

    let provider = openai(&server, true);
    let stream = provider
        .stream_message(&history(), "sk-test-key", "gpt-4o-mini")
        .await
        .unwrap();
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), "partial");
    assert!(matches!(
        items[1],
        Err(ParleyError::Api(ApiError::StreamError(_)))
    ));
}

#[tokio::test]
async fn test_in_band_stream_error() {
    let server = MockServer::start().await;
    let first = delta("a");
    let error = json!({"error": {"message": "overloaded", "code": 503}}).to_string();
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse(&[&first, &error])),
        )
        .mount(&server)
        .await;

    let provider = openai(&server, true);
    let mut seen = Vec::new();
    let err = stream_with_callback(&provider, &history(), "sk-test-key", "m", |c| {
        seen.push(c.to_string())
    })
    .await
    .unwrap_err();

    assert_eq!(seen, vec!["a"]);
    assert!(err.to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
        })))
        .mount(&server)
        .await;

    let err = openai(&server, false)
        .send_message(&history(), "sk-wrong-key", "gpt-4o-mini")
        .await
        .unwrap_err();

    assert!(matches!(err, ParleyError::Api(ApiError::AuthenticationFailed)));
}

#[tokio::test]
async fn test_rate_limit_uses_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_string("slow down"),
        )
        .mount(&server)
        .await;

    let err = openai(&server, true)
        .stream_message(&history(), "sk-test-key", "gpt-4o-mini")
        .await
        .err()
        .expect("stream should not open");

    assert!(matches!(err, ParleyError::Api(ApiError::RateLimited(7))));
}

#[tokio::test]
async fn test_blank_key_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = openai(&server, false);
    let err = tokio_test::assert_err!(provider.send_message(&history(), "  ", "gpt-4o-mini").await);

    assert!(matches!(err, ParleyError::Api(ApiError::AuthenticationFailed)));
}

#[tokio::test]
async fn test_openrouter_sends_attribution_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-or-key"))
        .and(header("x-title", "parley"))
        .and(header("http-referer", "https://example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "routed"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::new(ProviderInfo::new(
        "OpenRouter",
        format!("{}/api/v1/chat/completions", server.uri()),
        false,
    ))
    .with_site_url("https://example.org");

    let reply = provider
        .send_message(&history(), "sk-or-key", "openai/gpt-4o-mini")
        .await
        .unwrap();

    assert_eq!(reply, "routed");
}
