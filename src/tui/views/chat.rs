// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Base conversation view
//!
//! Always present underneath the modal stack. It owns what is displayed and
//! typed, while the conversation itself lives in the session.

use crate::modal::Modal;
use crate::tui::events::{ExchangeId, StateEvent};
use crate::tui::input::InputEvent;
use crate::tui::view::{Effect, Update, View, ViewContext, ViewKind};
use crate::tui::views::{exit_view, setup_view, HelpModal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    Error,
    Info,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "You",
            Speaker::Assistant => "Assistant",
            Speaker::Error => "Error",
            Speaker::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct ChatView {
    messages: Vec<DisplayMessage>,
    /// Reply text received so far while a request is in flight
    pending: Option<String>,
    input: String,
    sent: Vec<String>,
    recall: Option<usize>,
    /// Bumped by every send and clear; replies tagged with an older id are stale
    exchange: ExchangeId,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a reply tagged `exchange` belongs to the request in flight
    pub fn is_current(&self, exchange: ExchangeId) -> bool {
        self.is_waiting() && self.exchange == exchange
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push_info(&mut self, text: impl Into<String>) {
        self.push(Speaker::Info, text);
    }

    /// Show a sent message and start waiting for its reply
    pub fn begin_exchange(&mut self, text: impl Into<String>) -> ExchangeId {
        self.exchange += 1;
        self.push(Speaker::User, text);
        self.pending = Some(String::new());
        self.exchange
    }

    pub fn append_chunk(&mut self, chunk: &str) {
        if let Some(pending) = self.pending.as_mut() {
            pending.push_str(chunk);
        }
    }

    pub fn finish_reply(&mut self, reply: impl Into<String>) {
        self.pending = None;
        self.push(Speaker::Assistant, reply);
    }

    /// Keep any partial reply, then show the error inline
    pub fn fail_reply(&mut self, error: impl Into<String>) {
        if let Some(partial) = self.pending.take().filter(|p| !p.is_empty()) {
            self.push(Speaker::Assistant, partial);
        }
        self.push(Speaker::Error, error);
    }

    pub fn clear(&mut self) {
        self.exchange += 1;
        self.messages.clear();
        self.pending = None;
    }

    fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.messages.push(DisplayMessage {
            speaker,
            text: text.into(),
        });
    }

    fn recall_previous(&mut self) {
        if self.sent.is_empty() {
            return;
        }
        let index = match self.recall {
            Some(0) => 0,
            Some(i) => i - 1,
            None => self.sent.len() - 1,
        };
        self.recall = Some(index);
        self.input = self.sent[index].clone();
    }

    fn recall_next(&mut self) {
        match self.recall {
            Some(i) if i + 1 < self.sent.len() => {
                self.recall = Some(i + 1);
                self.input = self.sent[i + 1].clone();
            }
            Some(_) => {
                self.recall = None;
                self.input.clear();
            }
            None => {}
        }
    }

    fn submit(&mut self, ctx: &mut ViewContext<'_>) -> Update {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return Update::stay();
        }

        if text.starts_with('/') {
            self.input.clear();
            return match text.as_str() {
                "/help" => Update::open(HelpModal::new()),
                "/setup" => Update::open(setup_view(ctx)),
                "/clear" => Update::effect(Effect::ClearChat),
                "/quit" | "/exit" => Update::open(exit_view(ctx)),
                _ => {
                    ctx.set_error(format!("Unknown command: {}", text));
                    Update::stay()
                }
            };
        }

        if self.is_waiting() {
            ctx.set_status("Still waiting for the last reply");
            return Update::stay();
        }

        self.input.clear();
        self.recall = None;
        self.sent.push(text.clone());
        Update::effect(Effect::Send(text))
    }
}

impl Modal<StateEvent> for ChatView {}

impl View for ChatView {
    fn kind(&self) -> ViewKind {
        ViewKind::Chat
    }

    fn title(&self) -> &str {
        "Chat"
    }

    fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .messages
            .iter()
            .map(|m| format!("{}: {}", m.speaker.label(), m.text))
            .collect();
        if let Some(pending) = &self.pending {
            lines.push(format!("{}: {}", Speaker::Assistant.label(), pending));
        }
        lines.join("\n")
    }

    fn update(&mut self, event: &InputEvent, ctx: &mut ViewContext<'_>) -> Update {
        match event {
            InputEvent::Char(c) => {
                self.input.push(*c);
                Update::stay()
            }
            InputEvent::Backspace => {
                self.input.pop();
                Update::stay()
            }
            InputEvent::Up => {
                self.recall_previous();
                Update::stay()
            }
            InputEvent::Down => {
                self.recall_next();
                Update::stay()
            }
            InputEvent::Enter => self.submit(ctx),
            InputEvent::Escape => Update::open(exit_view(ctx)),
            InputEvent::Setup => Update::open(setup_view(ctx)),
            InputEvent::Help => Update::open(HelpModal::new()),
            InputEvent::Clear => Update::effect(Effect::ClearChat),
            InputEvent::Interrupt => Update::effect(Effect::Quit),
        }
    }
}
