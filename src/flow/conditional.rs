// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Branching flow step
//!
//! A conditional step records which branch it took as plain data (`"yes"`
//! or `"no"` under its key) and merges the chosen child flow's data into the
//! parent, so the parent's required-key check also covers branch outcomes.

use crate::error::{FlowError, Result};
use crate::flow::engine::Flow;
use crate::flow::value::{FlowData, FlowValue};

pub const BRANCH_YES: &str = "yes";
pub const BRANCH_NO: &str = "no";

/// Decides which branch to take, given the parent's data so far
pub type Predicate = Box<dyn Fn(&FlowData) -> bool>;

/// Builds a fresh child flow each time a branch is taken
pub type FlowBuilder = Box<dyn Fn() -> Flow>;

/// Step that runs one of two child flows
pub struct ConditionalItem {
    key: String,
    predicate: Predicate,
    on_yes: Option<FlowBuilder>,
    on_no: Option<FlowBuilder>,
    branch: Option<String>,
    entered: bool,
}

impl ConditionalItem {
    pub fn new(key: impl Into<String>, predicate: impl Fn(&FlowData) -> bool + 'static) -> Self {
        Self {
            key: key.into(),
            predicate: Box::new(predicate),
            on_yes: None,
            on_no: None,
            branch: None,
            entered: false,
        }
    }

    /// Child flow run when the predicate holds
    pub fn on_yes(mut self, builder: impl Fn() -> Flow + 'static) -> Self {
        self.on_yes = Some(Box::new(builder));
        self
    }

    /// Child flow run when the predicate does not hold
    pub fn on_no(mut self, builder: impl Fn() -> Flow + 'static) -> Self {
        self.on_no = Some(Box::new(builder));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Branch tag recorded by the last submit
    pub fn value(&self) -> Option<FlowValue> {
        self.branch.clone().map(FlowValue::Text)
    }

    /// Evaluate the predicate and name the branch it selects
    pub fn gather(&self, data: &FlowData) -> &'static str {
        if (self.predicate)(data) {
            BRANCH_YES
        } else {
            BRANCH_NO
        }
    }

    /// Record the branch tag in `parent`, run the selected child flow and
    /// merge its data back. The predicate is evaluated again here rather
    /// than reusing an earlier [`ConditionalItem::gather`].
    pub fn submit(&mut self, parent: &mut FlowData) -> Result<()> {
        let tag = self.gather(parent);
        parent.set(self.key.clone(), tag);
        self.branch = Some(tag.to_string());

        let builder = if tag == BRANCH_YES {
            self.on_yes.as_ref()
        } else {
            self.on_no.as_ref()
        };

        let Some(builder) = builder else {
            tracing::debug!(key = %self.key, branch = tag, "branch has no child flow");
            return Ok(());
        };

        let mut child = builder();
        tracing::debug!(key = %self.key, branch = tag, child = child.name(), "running child flow");
        child.run()?;
        parent.merge(child.data());
        Ok(())
    }

    pub(crate) fn on_enter(&mut self) -> bool {
        let first = !self.entered;
        self.entered = true;
        first
    }

    pub(crate) fn validate(&self, input: &str) -> std::result::Result<(), FlowError> {
        match input {
            BRANCH_YES | BRANCH_NO => Ok(()),
            _ => Err(FlowError::Validation {
                key: self.key.clone(),
                reason: format!("branch must be '{}' or '{}'", BRANCH_YES, BRANCH_NO),
            }),
        }
    }

    pub(crate) fn accept(&mut self, input: &str) -> std::result::Result<(), FlowError> {
        self.validate(input)?;
        self.branch = Some(input.to_string());
        Ok(())
    }

    pub(crate) fn restore(
        &mut self,
        value: Option<FlowValue>,
    ) -> std::result::Result<(), FlowError> {
        match value {
            None => self.branch = None,
            Some(FlowValue::Text(tag)) => {
                self.validate(&tag)
                    .map_err(|e| FlowError::State(e.to_string()))?;
                self.branch = Some(tag);
            }
            Some(other) => {
                return Err(FlowError::State(format!(
                    "conditional step cannot hold {:?}",
                    other
                )))
            }
        }
        Ok(())
    }
}
