// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OpenAI chat-completions provider

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::llm::message::ChatMessage;
use crate::llm::provider::{AiProvider, ChunkStream, ProviderInfo};
use crate::llm::providers::common::{self, ChatRequest};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiProvider {
    client: Client,
    info: ProviderInfo,
}

impl OpenAiProvider {
    /// Create a provider; an empty endpoint means the public OpenAI API
    pub fn new(mut info: ProviderInfo) -> Self {
        if info.endpoint.trim().is_empty() {
            info.endpoint = OPENAI_API_URL.to_string();
        }
        Self {
            client: Client::new(),
            info,
        }
    }

    /// Point at a different chat-completions URL, keeping name and stream flag
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.info.endpoint = endpoint.into();
        self
    }

    fn post(&self, api_key: &str) -> reqwest::RequestBuilder {
        self.client
            .post(&self.info.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn info(&self) -> &ProviderInfo {
        &self.info
    }

    async fn send_message(
        &self,
        history: &[ChatMessage],
        api_key: &str,
        model: &str,
    ) -> Result<String> {
        common::require_api_key(api_key)?;
        tracing::debug!(provider = %self.info.name, model, messages = history.len(), "sending chat request");

        let body = ChatRequest::new(model, history, false);
        let response = common::send_checked(self.post(api_key), &body).await?;
        common::read_completion(response).await
    }

    async fn stream_message(
        &self,
        history: &[ChatMessage],
        api_key: &str,
        model: &str,
    ) -> Result<ChunkStream> {
        common::require_api_key(api_key)?;
        tracing::debug!(provider = %self.info.name, model, messages = history.len(), "opening chat stream");

        let body = ChatRequest::new(model, history, true);
        let response = common::send_checked(self.post(api_key), &body).await?;
        Ok(common::sse_chunks(response.bytes_stream()))
    }
}
