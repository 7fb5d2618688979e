// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Flow execution
//!
//! A [`Flow`] owns an ordered list of steps, the data they produce and the
//! keys that must be present before the flow counts as successful.

use std::fmt;

use crate::error::{FlowError, Result};
use crate::flow::item::FlowItem;
use crate::flow::value::{FlowData, FlowValue};

/// Called with the final data once every required key is present
pub type SuccessCallback = Box<dyn FnMut(&FlowData) -> Result<()>>;

/// An ordered, single-use sequence of steps
pub struct Flow {
    name: String,
    items: Vec<FlowItem>,
    required: Vec<String>,
    data: FlowData,
    on_success: Option<SuccessCallback>,
}

impl Flow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            required: Vec::new(),
            data: FlowData::new(),
            on_success: None,
        }
    }

    /// Append a step
    pub fn item(mut self, item: impl Into<FlowItem>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Declare a key that must be set for the flow to succeed.
    /// Declaring the same key twice has no effect.
    pub fn require(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.required.contains(&key) {
            self.required.push(key);
        }
        self
    }

    /// Seed the data bag before the flow runs
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<FlowValue>) -> Self {
        self.data.set(key, value);
        self
    }

    /// Set the callback invoked when the flow completes with all required data
    pub fn on_success(mut self, callback: impl FnMut(&FlowData) -> Result<()> + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[FlowItem] {
        &self.items
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut FlowItem> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn required_keys(&self) -> &[String] {
        &self.required
    }

    pub fn data(&self) -> &FlowData {
        &self.data
    }

    /// Insert or replace one entry in the data bag
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<FlowValue>) {
        self.data.set(key, value);
    }

    /// Upsert every entry from a child flow's data
    pub fn merge_child_data(&mut self, child: &FlowData) {
        self.data.merge(child);
    }

    /// Required keys not yet present, in declaration order
    pub fn missing_keys(&self) -> Vec<String> {
        self.required
            .iter()
            .filter(|key| !self.data.contains_key(key))
            .cloned()
            .collect()
    }

    /// Leave every step in order, stopping at the first failure, then check
    /// completeness and hand the data to the success callback.
    pub fn run(&mut self) -> Result<()> {
        tracing::debug!(flow = %self.name, steps = self.items.len(), "running flow");

        for (index, item) in self.items.iter_mut().enumerate() {
            if let Err(e) = item.on_exit(&mut self.data) {
                tracing::warn!(flow = %self.name, step = index, kind = item.kind(), error = %e, "flow step failed");
                return Err(e);
            }
        }

        let missing = self.missing_keys();
        if !missing.is_empty() {
            tracing::debug!(flow = %self.name, ?missing, "flow incomplete");
            return Err(FlowError::Incomplete { missing }.into());
        }

        match self.on_success.as_mut() {
            Some(callback) => callback(&self.data),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("name", &self.name)
            .field("items", &self.items)
            .field("required", &self.required)
            .field("data", &self.data)
            .field("has_callback", &self.on_success.is_some())
            .finish()
    }
}
