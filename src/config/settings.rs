// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for Parley
//!
//! Handles loading and saving settings from ~/.parley/settings.json

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::llm::registry::{OPENAI, OPENAI_STREAM, OPENROUTER, OPENROUTER_STREAM};

mod io;

/// Main settings structure, stored in ~/.parley/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Defaults for new sessions
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Credentials keyed by provider name
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderCredentials>,

    /// Provider descriptor file; the built-in list is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers_file: Option<PathBuf>,
}

/// Default settings for new sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// Provider selected at startup
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model passed to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Stream replies when the provider supports it
    #[serde(default = "default_stream")]
    pub stream: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// How to find the API key for one provider
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key, overriding the family default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_provider() -> String {
    OPENAI.to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_stream() -> bool {
    true
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            stream: default_stream(),
            system_prompt: None,
        }
    }
}

impl Settings {
    /// Environment variable checked for a provider family's key
    pub fn default_api_key_env(provider: &str) -> Option<&'static str> {
        match provider {
            OPENAI | OPENAI_STREAM => Some("OPENAI_API_KEY"),
            OPENROUTER | OPENROUTER_STREAM => Some("OPENROUTER_API_KEY"),
            _ => None,
        }
    }

    /// Get the API key for a provider, checking env var first.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        let credentials = self.providers.get(provider);
        let env_name = credentials
            .and_then(|c| c.api_key_env.as_deref())
            .or_else(|| Self::default_api_key_env(provider));

        // Priority: env var > config file.
        env_name
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| credentials.and_then(|c| c.api_key.clone()))
    }

    /// Store a key in the settings file entry for `provider`
    pub fn remember_api_key(&mut self, provider: &str, api_key: impl Into<String>) {
        self.providers
            .entry(provider.to_string())
            .or_default()
            .api_key = Some(api_key.into());
    }
}
