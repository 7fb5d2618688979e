// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Values collected by flows
//!
//! A flow gathers a small closed set of value kinds under string keys.
//! The bag is last-write-wins: setting or merging a key replaces whatever
//! was there before.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single value gathered by a flow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FlowValue {
    /// Free-form text (names, keys, branch tags)
    Text(String),
    /// Yes/no answer
    Bool(bool),
}

impl FlowValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        FlowValue::Text(value.into())
    }

    /// Get the text if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FlowValue::Text(text) => Some(text),
            FlowValue::Bool(_) => None,
        }
    }

    /// Get the boolean if this is a bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlowValue::Bool(value) => Some(*value),
            FlowValue::Text(_) => None,
        }
    }
}

impl From<&str> for FlowValue {
    fn from(value: &str) -> Self {
        FlowValue::Text(value.to_string())
    }
}

impl From<String> for FlowValue {
    fn from(value: String) -> Self {
        FlowValue::Text(value)
    }
}

impl From<bool> for FlowValue {
    fn from(value: bool) -> Self {
        FlowValue::Bool(value)
    }
}

impl fmt::Display for FlowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowValue::Text(text) => f.write_str(text),
            FlowValue::Bool(true) => f.write_str("yes"),
            FlowValue::Bool(false) => f.write_str("no"),
        }
    }
}

/// Key/value bag filled in while a flow runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowData {
    entries: BTreeMap<String, FlowValue>,
}

impl FlowData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FlowValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FlowValue> {
        self.entries.get(key)
    }

    /// Get a text value, ignoring values of other kinds
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FlowValue::as_text)
    }

    /// Get a bool value, ignoring values of other kinds
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FlowValue::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FlowValue> {
        self.entries.remove(key)
    }

    /// Upsert every entry of `other` into this bag. Keys already present are
    /// overwritten; collisions are not reported.
    pub fn merge(&mut self, other: &FlowData) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlowValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FlowValue>> FromIterator<(K, V)> for FlowData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = FlowData::new();
        for (key, value) in iter {
            data.set(key, value);
        }
        data
    }
}
