// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat-completions wire format shared by the OpenAI-style providers

use std::collections::VecDeque;
use std::fmt;

use futures::{stream, Stream, StreamExt};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ParleyError, Result};
use crate::llm::message::ChatMessage;
use crate::llm::provider::ChunkStream;

/// Wait used when a 429 carries no usable Retry-After header
const DEFAULT_RETRY_SECS: u32 = 60;

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub stream: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, history: &'a [ChatMessage], stream: bool) -> Self {
        Self {
            model,
            messages: history
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ResponseChoice>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    /// OpenAI sends a string code, OpenRouter a numeric one
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
}

/// Refuse to call out without a key
pub(crate) fn require_api_key(api_key: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(ApiError::AuthenticationFailed.into());
    }
    Ok(())
}

/// Send a prepared request and turn non-2xx answers into [`ApiError`]s
pub(crate) async fn send_checked(request: RequestBuilder, body: &ChatRequest<'_>) -> Result<Response> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        let retry_after = parse_retry_after_seconds(response.headers());
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status, "provider returned an error response");
        return Err(parse_error(status, &body, retry_after));
    }
    Ok(response)
}

/// Extract the reply text from a non-streaming response
pub(crate) async fn read_completion(response: Response) -> Result<String> {
    let body: ChatResponse = response
        .json()
        .await
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::InvalidResponse("No choices in response".to_string()))?;

    Ok(choice.message.content.unwrap_or_default())
}

fn transport_error(e: reqwest::Error) -> ParleyError {
    if e.is_connect() || e.is_timeout() {
        ApiError::Network(e.to_string()).into()
    } else {
        ParleyError::Http(e)
    }
}

/// Map an error response to the matching [`ApiError`]
pub(crate) fn parse_error(status: u16, body: &str, retry_after: Option<u64>) -> ParleyError {
    let retry = retry_after
        .map(|secs| u32::try_from(secs).unwrap_or(u32::MAX))
        .unwrap_or(DEFAULT_RETRY_SECS);

    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return match status {
            401 | 403 => ApiError::AuthenticationFailed.into(),
            429 => ApiError::RateLimited(retry).into(),
            _ => server_error(status, body),
        };
    };

    let message = envelope.error.message;
    let code = match &envelope.error.code {
        Some(serde_json::Value::String(code)) => code.clone(),
        _ => envelope.error.error_type.clone().unwrap_or_default(),
    };

    match code.as_str() {
        "invalid_api_key" | "authentication_error" => ApiError::AuthenticationFailed.into(),
        "rate_limit_exceeded" => ApiError::RateLimited(retry).into(),
        "model_not_found" => ApiError::ModelNotFound(message).into(),
        _ => match status {
            401 | 403 => ApiError::AuthenticationFailed.into(),
            429 => ApiError::RateLimited(retry).into(),
            404 => ApiError::ModelNotFound(message).into(),
            _ => server_error(status, message),
        },
    }
}

/// Numeric Retry-After header (seconds)
pub(crate) fn parse_retry_after_seconds(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
}

pub(crate) fn server_error(status: u16, message: impl Into<String>) -> ParleyError {
    ParleyError::Api(ApiError::ServerError {
        status,
        message: message.into(),
    })
}

struct SseState<S> {
    bytes: std::pin::Pin<Box<S>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String>>,
    done: bool,
    finished: bool,
}

impl<S> SseState<S> {
    /// Consume every complete line in the buffer
    fn drain_lines(&mut self) {
        while !self.finished {
            let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            // Decode whole lines only, so a character split across frames survives
            let line = match std::str::from_utf8(&raw[..line_end]) {
                Ok(line) => line.trim().to_string(),
                Err(e) => {
                    self.pending.push_back(Err(ApiError::StreamError(format!(
                        "invalid UTF-8 in stream: {}",
                        e
                    ))
                    .into()));
                    self.finished = true;
                    break;
                }
            };

            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim_start();

            if data == "[DONE]" {
                self.done = true;
                self.finished = true;
                break;
            }

            // Error events would also parse as an empty chunk, so check them first
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(data) {
                self.pending
                    .push_back(Err(ApiError::StreamError(envelope.error.message).into()));
                self.finished = true;
            } else if let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) {
                let text = chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .unwrap_or_default();
                if !text.is_empty() {
                    self.pending.push_back(Ok(text));
                }
            } else {
                tracing::debug!(line = %data, "skipping unparseable stream event");
            }
        }
    }
}

/// Decode an SSE byte stream into reply fragments.
///
/// The stream ends cleanly at `data: [DONE]`. A transport error, an in-band
/// error event or the body ending before `[DONE]` yields one `Err` and stops.
pub(crate) fn sse_chunks<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let state = SseState {
        bytes: Box::pin(bytes),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        done: false,
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(bytes)) => {
                    state.buffer.extend_from_slice(bytes.as_ref());
                    state.drain_lines();
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state
                        .pending
                        .push_back(Err(ApiError::StreamError(e.to_string()).into()));
                }
                None => {
                    state.buffer.push(b'\n');
                    state.drain_lines();
                    if !state.done && !state.finished {
                        state.pending.push_back(Err(ApiError::StreamError(
                            "stream ended before completion".to_string(),
                        )
                        .into()));
                    }
                    state.finished = true;
                }
            }
        }
    }))
}
