// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Connection test progress
//!
//! The modal observes the shared subject while it is on the stack and
//! follows the test's [`StateEvent`]s. It never talks to the provider itself.

use crate::modal::{EventFeed, Modal, Observer};
use crate::tui::events::{StateEvent, TestId};
use crate::tui::input::InputEvent;
use crate::tui::view::{Update, View, ViewContext, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    Waiting,
    Running,
    Passed,
    Failed(String),
}

pub struct ConnectionTestModal {
    test: TestId,
    provider: String,
    status: TestStatus,
    reply: String,
    feed: Option<EventFeed<StateEvent>>,
}

impl ConnectionTestModal {
    pub fn new(test: TestId, provider: impl Into<String>) -> Self {
        Self {
            test,
            provider: provider.into(),
            status: TestStatus::Waiting,
            reply: String::new(),
            feed: None,
        }
    }

    pub fn status(&self) -> &TestStatus {
        &self.status
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub fn is_attached(&self) -> bool {
        self.feed.is_some()
    }

    fn is_done(&self) -> bool {
        matches!(self.status, TestStatus::Passed | TestStatus::Failed(_))
    }

    fn apply(&mut self, event: StateEvent) {
        if event.test() != self.test {
            tracing::debug!(
                test = event.test(),
                current = self.test,
                "ignoring event from another test"
            );
            return;
        }
        match event {
            StateEvent::ConnectionTestStarted { provider, .. } => {
                self.provider = provider;
                self.status = TestStatus::Running;
                self.reply.clear();
            }
            StateEvent::ConnectionTestChunk { chunk, .. } => {
                self.status = TestStatus::Running;
                self.reply.push_str(&chunk);
            }
            StateEvent::ConnectionTestPassed { provider, reply, .. } => {
                self.provider = provider;
                self.reply = reply;
                self.status = TestStatus::Passed;
            }
            StateEvent::ConnectionTestFailed { provider, error, .. } => {
                self.provider = provider;
                self.status = TestStatus::Failed(error);
            }
        }
    }
}

impl Observer<StateEvent> for ConnectionTestModal {
    fn attach(&mut self, feed: EventFeed<StateEvent>) {
        self.feed = Some(feed);
    }

    fn detach(&mut self) {
        self.feed = None;
    }
}

impl Modal<StateEvent> for ConnectionTestModal {
    fn as_observer(&mut self) -> Option<&mut dyn Observer<StateEvent>> {
        Some(self)
    }
}

impl View for ConnectionTestModal {
    fn kind(&self) -> ViewKind {
        ViewKind::ConnectionTest
    }

    fn title(&self) -> &str {
        "Connection test"
    }

    fn render(&self) -> String {
        let headline = match &self.status {
            TestStatus::Waiting => format!("Contacting {}...", self.provider),
            TestStatus::Running => format!("{} is replying...", self.provider),
            TestStatus::Passed => format!("{} answered. The key works.", self.provider),
            TestStatus::Failed(error) => format!("{} failed: {}", self.provider, error),
        };
        let mut lines = vec![headline];
        if !self.reply.is_empty() {
            lines.push(String::new());
            lines.push(format!("Reply: {}", self.reply));
        }
        lines.push(String::new());
        lines.push(if self.is_done() {
            "Press Enter to close".to_string()
        } else {
            "Esc to dismiss".to_string()
        });
        lines.join("\n")
    }

    fn update(&mut self, event: &InputEvent, _ctx: &mut ViewContext<'_>) -> Update {
        match event {
            InputEvent::Escape => Update::close(),
            InputEvent::Enter if self.is_done() => Update::close(),
            _ => Update::stay(),
        }
    }

    fn tick(&mut self) {
        let events = match &self.feed {
            Some(feed) => feed.drain(),
            None => return,
        };
        for event in events {
            self.apply(event);
        }
    }
}
