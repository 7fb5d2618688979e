// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! AI provider trait and related types
//!
//! Every back-end offers a blocking request that returns the whole reply and
//! a streaming request that yields text fragments as they arrive.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;
use crate::llm::message::ChatMessage;

/// Descriptive metadata for a registered provider. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Unique key in the registry
    pub name: String,

    /// Chat-completions URL the provider posts to
    pub endpoint: String,

    /// Whether the chat layer should prefer streaming replies
    pub stream: bool,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, stream: bool) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            stream,
        }
    }
}

/// Lazy, finite sequence of reply fragments in arrival order.
/// An `Err` item means the stream broke; nothing follows it.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Main trait for AI back-ends
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Metadata the provider was registered with
    fn info(&self) -> &ProviderInfo;

    /// Shorthand for `info().name`
    fn name(&self) -> &str {
        &self.info().name
    }

    /// Send the conversation and wait for the complete reply
    async fn send_message(
        &self,
        history: &[ChatMessage],
        api_key: &str,
        model: &str,
    ) -> Result<String>;

    /// Send the conversation and stream the reply.
    ///
    /// Errors that happen before any data arrives (bad key, unknown model)
    /// are returned here; errors after that are yielded by the stream.
    async fn stream_message(
        &self,
        history: &[ChatMessage],
        api_key: &str,
        model: &str,
    ) -> Result<ChunkStream>;
}

/// Drive [`AiProvider::stream_message`] to completion, calling `on_chunk`
/// for each fragment in order. Returns the concatenated reply.
pub async fn stream_with_callback<F>(
    provider: &dyn AiProvider,
    history: &[ChatMessage],
    api_key: &str,
    model: &str,
    mut on_chunk: F,
) -> Result<String>
where
    F: FnMut(&str),
{
    let mut stream = provider.stream_message(history, api_key, model).await?;
    let mut reply = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        on_chunk(&chunk);
        reply.push_str(&chunk);
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ParleyError};
    use crate::llm::mock_provider::MockProvider;

    #[test]
    fn test_provider_info_json() {
        let info = ProviderInfo::new("OpenAI", "https://example.test", true);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["name"], "OpenAI");
        assert_eq!(json["stream"], true);
    }

    #[tokio::test]
    async fn test_stream_with_callback_preserves_order() {
        let provider = MockProvider::new().with_chunks(vec!["Hel", "lo", " world"]);
        let mut seen = Vec::new();

        let reply = stream_with_callback(&provider, &[ChatMessage::user("hi")], "key", "m", |c| {
            seen.push(c.to_string())
        })
        .await
        .unwrap();

        assert_eq!(seen, vec!["Hel", "lo", " world"]);
        assert_eq!(reply, "Hello world");
    }

    #[tokio::test]
    async fn test_stream_with_callback_reports_break() {
        let provider = MockProvider::new().with_broken_stream(vec!["partial"], "connection reset");
        let mut seen = Vec::new();

        let err = stream_with_callback(&provider, &[], "key", "m", |c| seen.push(c.to_string()))
            .await
            .unwrap_err();

        assert_eq!(seen, vec!["partial"]);
        assert!(matches!(err, ParleyError::Api(ApiError::StreamError(_))));
    }

    #[tokio::test]
    async fn test_stream_with_callback_empty_reply() {
        let provider = MockProvider::new().with_chunks(Vec::<String>::new());
        let mut calls = 0;
        let reply = stream_with_callback(&provider, &[], "key", "m", |_| calls += 1)
            .await
            .unwrap();
        assert_eq!(calls, 0);
        assert!(reply.is_empty());
    }
}
