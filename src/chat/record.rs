// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat transcripts
//!
//! A [`ChatRecord`] is one titled conversation plus its metadata. Titles are
//! unique within a [`TranscriptStore`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ParleyError, Result};
use crate::flow::builtin::ApiKeySetup;
use crate::llm::message::{ChatMessage, Role};

const SUMMARY_CHARS: usize = 100;

/// One saved conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: Uuid,
    /// Unique key within a store
    pub title: String,
    pub provider: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatRecord {
    pub fn new(title: impl Into<String>, provider: impl Into<String>, model: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            provider: provider.into(),
            model: model.into(),
            created_at: now,
            updated_at: now,
            metadata: BTreeMap::new(),
            messages: Vec::new(),
        }
    }

    /// Record seeded from a finished setup flow. The API key itself is
    /// never copied into the record.
    pub fn from_setup(title: impl Into<String>, setup: &ApiKeySetup, model: impl Into<String>) -> Self {
        let mut record = Self::new(title, setup.provider.clone(), model);
        record.set_metadata("key_remembered", setup.remember.to_string());
        record.set_metadata("connection_tested", setup.test_requested.to_string());
        record
    }

    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self.touch();
        self
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// First user message, shortened for listings
    pub fn summary(&self) -> Option<String> {
        let first = self.messages.iter().find(|m| m.role == Role::User)?;
        if first.content.chars().count() > SUMMARY_CHARS {
            let head: String = first.content.chars().take(SUMMARY_CHARS - 3).collect();
            Some(format!("{}...", head))
        } else {
            Some(first.content.clone())
        }
    }
}

/// Storage boundary for transcripts
pub trait TranscriptStore {
    /// Add a record; fails if its title is taken
    fn insert(&mut self, record: ChatRecord) -> Result<()>;

    /// Add or replace the record with the same title
    fn upsert(&mut self, record: ChatRecord);

    fn get(&self, title: &str) -> Option<&ChatRecord>;

    /// Most recently updated first
    fn list(&self) -> Vec<&ChatRecord>;

    fn remove(&mut self, title: &str) -> bool;

    /// `base`, or `base (2)`, `base (3)`... whichever is free
    fn unique_title(&self, base: &str) -> String {
        if self.get(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{} ({})", base, n))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }
}

/// Transcript store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryTranscripts {
    records: Vec<ChatRecord>,
}

impl MemoryTranscripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TranscriptStore for MemoryTranscripts {
    fn insert(&mut self, record: ChatRecord) -> Result<()> {
        if self.get(&record.title).is_some() {
            return Err(ParleyError::Transcript(format!(
                "a transcript titled '{}' already exists",
                record.title
            )));
        }
        self.records.push(record);
        Ok(())
    }

    fn upsert(&mut self, record: ChatRecord) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.title == record.title) {
            *existing = record;
        } else {
            self.records.push(record);
        }
    }

    fn get(&self, title: &str) -> Option<&ChatRecord> {
        self.records.iter().find(|r| r.title == title)
    }

    fn list(&self) -> Vec<&ChatRecord> {
        let mut sorted: Vec<_> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sorted
    }

    fn remove(&mut self, title: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.title != title);
        self.records.len() < before
    }
}
