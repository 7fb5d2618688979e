// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Provider registry
//!
//! Maps provider names to live provider instances. Registries are built
//! explicitly and passed to whoever needs them; there is no global one.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ParleyError, Result};
use crate::llm::provider::{AiProvider, ProviderInfo};
use crate::llm::providers::{OpenAiProvider, OpenRouterProvider};

pub const OPENAI: &str = "OpenAI";
pub const OPENAI_STREAM: &str = "OpenAI Stream";
pub const OPENROUTER: &str = "OpenRouter";
pub const OPENROUTER_STREAM: &str = "OpenRouter Stream";

/// Every provider name the registry knows how to build
pub const KNOWN_PROVIDERS: [&str; 4] = [OPENAI, OPENAI_STREAM, OPENROUTER, OPENROUTER_STREAM];

/// One entry of the providers file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,

    /// Empty means the family's public URL
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub stream: bool,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, stream: bool) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            stream,
        }
    }
}

/// Name to provider mapping
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn AiProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from descriptors, skipping unknown names
    pub fn from_descriptors(descriptors: &[ProviderDescriptor]) -> Self {
        let mut registry = Self::new();
        registry.load_from_descriptors(descriptors);
        registry
    }

    /// Parse a JSON descriptor array
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<ProviderDescriptor> = serde_json::from_str(json)?;
        Ok(Self::from_descriptors(&descriptors))
    }

    /// Read a JSON descriptor array from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ParleyError::Config(format!(
                "Failed to read providers file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// All four known families at their default endpoints
    pub fn builtin() -> Self {
        let descriptors: Vec<ProviderDescriptor> = KNOWN_PROVIDERS
            .iter()
            .map(|name| ProviderDescriptor::new(*name, "", false))
            .collect();
        Self::from_descriptors(&descriptors)
    }

    /// Add every recognised descriptor. Returns how many were added.
    /// A later descriptor with the same name replaces an earlier one.
    pub fn load_from_descriptors(&mut self, descriptors: &[ProviderDescriptor]) -> usize {
        let mut added = 0;
        for descriptor in descriptors {
            match Self::resolve(descriptor) {
                Some(provider) => {
                    if self.register(provider).is_some() {
                        tracing::debug!(name = %descriptor.name, "provider descriptor replaced an earlier one");
                    }
                    added += 1;
                }
                None => {
                    tracing::debug!(name = %descriptor.name, "skipping unknown provider descriptor");
                }
            }
        }
        tracing::debug!(added, total = self.providers.len(), "loaded provider descriptors");
        added
    }

    /// Build the provider a descriptor names, if its name is a known family.
    /// The `Stream` variants always stream.
    pub fn resolve(descriptor: &ProviderDescriptor) -> Option<Arc<dyn AiProvider>> {
        let info = |stream_variant: bool| {
            ProviderInfo::new(
                descriptor.name.clone(),
                descriptor.endpoint.clone(),
                descriptor.stream || stream_variant,
            )
        };

        let provider: Arc<dyn AiProvider> = match descriptor.name.as_str() {
            OPENAI => Arc::new(OpenAiProvider::new(info(false))),
            OPENAI_STREAM => Arc::new(OpenAiProvider::new(info(true))),
            OPENROUTER => Arc::new(OpenRouterProvider::new(info(false))),
            OPENROUTER_STREAM => Arc::new(OpenRouterProvider::new(info(true))),
            _ => return None,
        };
        Some(provider)
    }

    /// Insert a provider under its own name, returning the one it replaced
    pub fn register(&mut self, provider: Arc<dyn AiProvider>) -> Option<Arc<dyn AiProvider>> {
        self.providers.insert(provider.name().to_string(), provider)
    }

    /// Every registered provider, in no particular order
    pub fn get_all(&self) -> Vec<Arc<dyn AiProvider>> {
        self.providers.values().cloned().collect()
    }

    /// Exact-name lookup
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn AiProvider>> {
        self.providers.get(name).cloned()
    }

    /// Like [`ProviderRegistry::get_by_name`] but a miss is an
    /// [`ParleyError::UnsupportedProvider`]
    pub fn require(&self, name: &str) -> Result<Arc<dyn AiProvider>> {
        self.get_by_name(name)
            .ok_or_else(|| ParleyError::UnsupportedProvider(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
