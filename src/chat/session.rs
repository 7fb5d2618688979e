// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat session management
//!
//! A session owns the conversation history and the injected provider
//! registry. Provider calls work on a [`PreparedRequest`] snapshot, so a
//! spawned task never touches the session itself.

use std::sync::Arc;

use crate::chat::record::ChatRecord;
use crate::error::{ParleyError, Result};
use crate::flow::builtin::ApiKeySetup;
use crate::llm::message::ChatMessage;
use crate::llm::provider::{stream_with_callback, AiProvider, ChunkStream};
use crate::llm::registry::ProviderRegistry;

/// Everything a provider call needs, detached from the session
#[derive(Clone)]
pub struct PreparedRequest {
    pub provider: Arc<dyn AiProvider>,
    pub history: Vec<ChatMessage>,
    pub api_key: String,
    pub model: String,
    /// Whether the reply should be streamed
    pub stream: bool,
}

impl PreparedRequest {
    pub async fn send(&self) -> Result<String> {
        self.provider
            .send_message(&self.history, &self.api_key, &self.model)
            .await
    }

    pub async fn open_stream(&self) -> Result<ChunkStream> {
        self.provider
            .stream_message(&self.history, &self.api_key, &self.model)
            .await
    }

    /// Stream or send depending on [`PreparedRequest::stream`]. A sent reply
    /// reaches `on_chunk` once, whole.
    pub async fn run<F>(&self, mut on_chunk: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        if self.stream {
            return stream_with_callback(
                self.provider.as_ref(),
                &self.history,
                &self.api_key,
                &self.model,
                on_chunk,
            )
            .await;
        }
        let reply = self.send().await?;
        on_chunk(&reply);
        Ok(reply)
    }
}

impl std::fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("provider", &self.provider.name())
            .field("messages", &self.history.len())
            .field("model", &self.model)
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

/// State for one interactive conversation
pub struct ChatSession {
    registry: ProviderRegistry,
    provider_name: Option<String>,
    api_key: Option<String>,
    model: String,
    system_prompt: Option<String>,
    /// User preference; the provider's own stream flag must also be set
    prefer_stream: bool,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(registry: ProviderRegistry, model: impl Into<String>) -> Self {
        Self {
            registry,
            provider_name: None,
            api_key: None,
            model: model.into(),
            system_prompt: None,
            prefer_stream: true,
            history: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_streaming(mut self, prefer_stream: bool) -> Self {
        self.prefer_stream = prefer_stream;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider_name.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Switch provider; unknown names leave the session unchanged
    pub fn select_provider(&mut self, name: &str) -> Result<()> {
        self.registry.require(name)?;
        tracing::debug!(provider = name, "provider selected");
        self.provider_name = Some(name.to_string());
        Ok(())
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = Some(api_key.into());
    }

    /// Apply the result of the API key setup flow
    pub fn configure(&mut self, setup: &ApiKeySetup) -> Result<()> {
        self.select_provider(&setup.provider)?;
        self.set_api_key(setup.api_key.clone());
        Ok(())
    }

    /// Currently selected provider
    pub fn provider(&self) -> Result<Arc<dyn AiProvider>> {
        let name = self
            .provider_name
            .as_deref()
            .ok_or_else(|| ParleyError::Config("No provider selected. Press Ctrl+K to set one up.".to_string()))?;
        self.registry.require(name)
    }

    /// Whether the next request would stream
    pub fn will_stream(&self) -> bool {
        self.prefer_stream && self.provider().map(|p| p.info().stream).unwrap_or(false)
    }

    /// Append a user message and snapshot what the provider call needs.
    /// Nothing is appended if the session is not ready.
    pub fn prepare(&mut self, text: &str) -> Result<PreparedRequest> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParleyError::InvalidInput("message is empty".to_string()));
        }
        let provider = self.provider()?;
        let api_key = self.api_key.clone().ok_or_else(|| {
            ParleyError::Config(format!(
                "No API key for {}. Press Ctrl+K to enter one.",
                provider.name()
            ))
        })?;

        self.history.push(ChatMessage::user(text));
        Ok(self.snapshot(provider, api_key))
    }

    /// Snapshot for a throwaway exchange that does not touch the history
    pub fn probe(&self, text: &str) -> Result<PreparedRequest> {
        let provider = self.provider()?;
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| ParleyError::Config(format!("No API key for {}", provider.name())))?;
        let mut request = self.snapshot(provider, api_key);
        request.history = vec![ChatMessage::user(text)];
        Ok(request)
    }

    fn snapshot(&self, provider: Arc<dyn AiProvider>, api_key: String) -> PreparedRequest {
        let mut history = Vec::with_capacity(self.history.len() + 1);
        if let Some(ref prompt) = self.system_prompt {
            history.push(ChatMessage::system(prompt.clone()));
        }
        history.extend(self.history.iter().cloned());

        let stream = self.prefer_stream && provider.info().stream;
        PreparedRequest {
            provider,
            history,
            api_key,
            model: self.model.clone(),
            stream,
        }
    }

    /// Record the assistant's completed reply
    pub fn record_reply(&mut self, reply: impl Into<String>) {
        self.history.push(ChatMessage::assistant(reply));
    }

    /// Send `text` and wait for the whole reply
    pub async fn send(&mut self, text: &str) -> Result<String> {
        let request = self.prepare(text)?;
        let reply = request.send().await?;
        self.record_reply(reply.clone());
        Ok(reply)
    }

    /// Send `text` and stream the reply through `on_chunk`
    pub async fn stream<F>(&mut self, text: &str, on_chunk: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let request = self.prepare(text)?;
        let reply = stream_with_callback(
            request.provider.as_ref(),
            &request.history,
            &request.api_key,
            &request.model,
            on_chunk,
        )
        .await?;
        self.record_reply(reply.clone());
        Ok(reply)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Snapshot the conversation as a transcript record
    pub fn to_record(&self, title: impl Into<String>) -> ChatRecord {
        ChatRecord::new(
            title,
            self.provider_name.clone().unwrap_or_default(),
            self.model.clone(),
        )
        .with_messages(self.history.clone())
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("provider", &self.provider_name)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("messages", &self.history.len())
            .finish()
    }
}
