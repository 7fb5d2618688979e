// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock AI provider for testing
//!
//! Provides a configurable implementation of [`AiProvider`] that can be
//! registered like any other provider without making network calls.

use async_trait::async_trait;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ApiError, Result};
use crate::llm::message::ChatMessage;
use crate::llm::provider::{AiProvider, ChunkStream, ProviderInfo};

/// Fragment size used when a plain text reply is streamed
const CHUNK_CHARS: usize = 10;

/// A mock provider
#[derive(Clone)]
pub struct MockProvider {
    info: ProviderInfo,
    /// Configured responses, consumed in order; the last one repeats
    responses: Arc<Mutex<Vec<MockResponse>>>,
    call_count: Arc<AtomicUsize>,
    recorded_calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// A pre-configured reply
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockResponse {
    /// Reply delivered as these fragments
    Chunks(Vec<String>),
    /// The request fails before any data arrives
    Error(String),
    /// Some fragments arrive, then the stream breaks
    BrokenStream { chunks: Vec<String>, error: String },
}

/// Arguments of one provider call
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub history: Vec<ChatMessage>,
    pub api_key: String,
    pub model: String,
    pub streamed: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_name("mock")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            info: ProviderInfo::new(name, "mock://", false),
            responses: Arc::new(Mutex::new(vec![MockResponse::Chunks(vec![
                "Mock response".to_string(),
            ])])),
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_calls: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Set the stream flag reported by `info()`
    pub fn streaming(mut self, stream: bool) -> Self {
        self.info.stream = stream;
        self
    }

    /// Reply with `text`, split into small fragments when streamed
    pub fn with_response(self, text: impl Into<String>) -> Self {
        let chars: Vec<char> = text.into().chars().collect();
        let chunks = chars
            .chunks(CHUNK_CHARS)
            .map(|c| c.iter().collect())
            .collect();
        self.with_responses(vec![MockResponse::Chunks(chunks)])
    }

    /// Reply with exactly these fragments
    pub fn with_chunks<S: Into<String>>(self, chunks: Vec<S>) -> Self {
        let chunks = chunks.into_iter().map(Into::into).collect();
        self.with_responses(vec![MockResponse::Chunks(chunks)])
    }

    /// Fail every call with an upstream error
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.with_responses(vec![MockResponse::Error(message.into())])
    }

    /// Deliver `chunks`, then break the stream with `error`
    pub fn with_broken_stream<S: Into<String>>(self, chunks: Vec<S>, error: impl Into<String>) -> Self {
        self.with_responses(vec![MockResponse::BrokenStream {
            chunks: chunks.into_iter().map(Into::into).collect(),
            error: error.into(),
        }])
    }

    /// Replace the whole response script
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *lock(&self.responses) = responses;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        lock(&self.recorded_calls).clone()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        lock(&self.recorded_calls).last().cloned()
    }

    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        lock(&self.recorded_calls).clear();
    }

    fn next_response(&self, history: &[ChatMessage], api_key: &str, model: &str, streamed: bool) -> MockResponse {
        lock(&self.recorded_calls).push(RecordedCall {
            history: history.to_vec(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            streamed,
        });

        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let responses = lock(&self.responses);
        match responses.len() {
            0 => MockResponse::Chunks(vec![]),
            len => responses[count.min(len - 1)].clone(),
        }
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    fn info(&self) -> &ProviderInfo {
        &self.info
    }

    async fn send_message(
        &self,
        history: &[ChatMessage],
        api_key: &str,
        model: &str,
    ) -> Result<String> {
        match self.next_response(history, api_key, model, false) {
            MockResponse::Chunks(chunks) => Ok(chunks.concat()),
            MockResponse::Error(message) | MockResponse::BrokenStream { error: message, .. } => {
                Err(ApiError::ServerError {
                    status: 500,
                    message,
                }
                .into())
            }
        }
    }

    async fn stream_message(
        &self,
        history: &[ChatMessage],
        api_key: &str,
        model: &str,
    ) -> Result<ChunkStream> {
        let items: Vec<Result<String>> = match self.next_response(history, api_key, model, true) {
            MockResponse::Chunks(chunks) => chunks.into_iter().map(Ok).collect(),
            MockResponse::Error(message) => {
                return Err(ApiError::ServerError {
                    status: 500,
                    message,
                }
                .into())
            }
            MockResponse::BrokenStream { chunks, error } => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(ApiError::StreamError(error).into())))
                .collect(),
        };
        Ok(Box::pin(stream::iter(items)))
    }
}
