// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! View contract shared by the base chat view and every modal

use std::fmt;

use crate::modal::Modal;
use crate::tui::events::{EventSender, StateEvent};
use crate::tui::input::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Chat,
    Flow,
    Help,
    ConnectionTest,
}

/// Navigation requested by a view after handling input
pub enum Next {
    Stay,
    /// Pop this view
    Close,
    /// Pop this view and push another
    Replace(Box<dyn View>),
    /// Push another view on top
    Open(Box<dyn View>),
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Stay => f.write_str("Stay"),
            Next::Close => f.write_str("Close"),
            Next::Replace(view) => write!(f, "Replace({:?})", view.kind()),
            Next::Open(view) => write!(f, "Open({:?})", view.kind()),
        }
    }
}

/// Work the app performs after navigation is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a chat message to the selected provider
    Send(String),
    /// Archive and clear the conversation
    ClearChat,
    /// Leave the application
    Quit,
}

#[derive(Debug)]
pub struct Update {
    pub next: Next,
    pub effect: Option<Effect>,
}

impl Update {
    pub fn stay() -> Self {
        Self {
            next: Next::Stay,
            effect: None,
        }
    }

    pub fn close() -> Self {
        Self {
            next: Next::Close,
            effect: None,
        }
    }

    pub fn open(view: impl View + 'static) -> Self {
        Self {
            next: Next::Open(Box::new(view)),
            effect: None,
        }
    }

    pub fn replace(view: impl View + 'static) -> Self {
        Self {
            next: Next::Replace(Box::new(view)),
            effect: None,
        }
    }

    pub fn effect(effect: Effect) -> Self {
        Self::stay().with_effect(effect)
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Status bar message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

/// What a view may read or report while handling input
pub struct ViewContext<'a> {
    /// Channel flow callbacks post their results on
    pub events: &'a EventSender,
    /// Registered provider names, sorted
    pub providers: &'a [String],
    /// Currently selected provider
    pub current_provider: Option<&'a str>,
    status: Option<Status>,
}

impl<'a> ViewContext<'a> {
    pub fn new(
        events: &'a EventSender,
        providers: &'a [String],
        current_provider: Option<&'a str>,
    ) -> Self {
        Self {
            events,
            providers,
            current_provider,
            status: None,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            message: message.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            message: message.into(),
            is_error: true,
        });
    }

    pub fn take_status(&mut self) -> Option<Status> {
        self.status.take()
    }
}

/// Anything the app can show: the base chat view or a modal
pub trait View: Modal<StateEvent> {
    fn kind(&self) -> ViewKind;

    /// Border title
    fn title(&self) -> &str;

    /// Called once, before the view is first shown
    fn init(&mut self, _ctx: &mut ViewContext<'_>) {}

    /// Plain-text body
    fn render(&self) -> String;

    fn update(&mut self, event: &InputEvent, ctx: &mut ViewContext<'_>) -> Update;

    /// Called every loop iteration while the view is on top
    fn tick(&mut self) {}
}
