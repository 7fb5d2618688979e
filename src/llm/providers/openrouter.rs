// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OpenRouter API provider implementation
//!
//! OpenRouter speaks the OpenAI chat-completions dialect and accepts two
//! optional attribution headers used for its public rankings.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::llm::message::ChatMessage;
use crate::llm::provider::{AiProvider, ChunkStream, ProviderInfo};
use crate::llm::providers::common::{self, ChatRequest};

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const DEFAULT_SITE_NAME: &str = "parley";

pub struct OpenRouterProvider {
    client: Client,
    info: ProviderInfo,
    site_url: Option<String>,
    site_name: Option<String>,
}

impl OpenRouterProvider {
    /// Create a provider; an empty endpoint means the public OpenRouter API
    pub fn new(mut info: ProviderInfo) -> Self {
        if info.endpoint.trim().is_empty() {
            info.endpoint = OPENROUTER_API_URL.to_string();
        }
        Self {
            client: Client::new(),
            info,
            site_url: None,
            site_name: Some(DEFAULT_SITE_NAME.to_string()),
        }
    }

    /// Set the site URL sent as `HTTP-Referer`
    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    /// Set the site name sent as `X-Title`
    pub fn with_site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = Some(name.into());
        self
    }

    fn post(&self, api_key: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(&self.info.endpoint)
            .header("Authorization", format!("Bearer {}", api_key));

        if let Some(ref site_url) = self.site_url {
            req = req.header("HTTP-Referer", site_url);
        }
        if let Some(ref site_name) = self.site_name {
            req = req.header("X-Title", site_name);
        }
        req
    }
}

#[async_trait]
impl AiProvider for OpenRouterProvider {
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
        tracing::debug!(provider = %self.info.name, model, "sending chat request");

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
        tracing::debug!(provider = %self.info.name, model, "opening chat stream");

        let body = ChatRequest::new(model, history, true);
        let response = common::send_checked(self.post(api_key), &body).await?;
        Ok(common::sse_chunks(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_new() {
        let provider = OpenRouterProvider::new(ProviderInfo::new("OpenRouter", "", false));
        assert_eq!(provider.info().endpoint, OPENROUTER_API_URL);
        assert_eq!(provider.site_name.as_deref(), Some(DEFAULT_SITE_NAME));
        assert!(provider.site_url.is_none());
    }

    #[test]
    fn test_provider_with_site_info() {
        let provider = OpenRouterProvider::new(ProviderInfo::new("OpenRouter", "", true))
            .with_site_url("https://example.com")
            .with_site_name("My App");
        assert_eq!(provider.site_url, Some("https://example.com".to_string()));
        assert_eq!(provider.site_name, Some("My App".to_string()));
    }

    #[test]
    fn test_provider_name() {
        let provider = OpenRouterProvider::new(ProviderInfo::new("OpenRouter Stream", "", true));
        assert_eq!(provider.name(), "OpenRouter Stream");
    }
}
