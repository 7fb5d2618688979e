// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Modal presenter for a [`Flow`]
//!
//! Steps are asked one at a time. Validation failures are shown in place and
//! the step is asked again; once the last step is answered the flow is run
//! and the modal closes.

use crate::error::ParleyError;
use crate::flow::{Flow, FlowItem};
use crate::modal::Modal;
use crate::tui::events::StateEvent;
use crate::tui::input::InputEvent;
use crate::tui::view::{Update, View, ViewContext, ViewKind};

pub struct FlowView {
    title: String,
    flow: Flow,
    cursor: usize,
    input: String,
    error: Option<String>,
}

impl FlowView {
    pub fn new(title: impl Into<String>, flow: Flow) -> Self {
        Self {
            title: title.into(),
            flow,
            cursor: 0,
            input: String::new(),
            error: None,
        }
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Index of the step being asked
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Validation message for the current step, if its last answer was rejected
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The step being asked, or `None` once every step is answered
    pub fn current(&self) -> Option<&FlowItem> {
        self.flow.items().get(self.cursor)
    }

    /// Move the cursor to the next step that needs input and activate it
    fn settle(&mut self) {
        while self
            .flow
            .items()
            .get(self.cursor)
            .is_some_and(|item| !item.is_interactive())
        {
            self.cursor += 1;
        }
        if let Some(item) = self.flow.item_mut(self.cursor) {
            item.on_enter();
        }
    }

    fn submit(&mut self, ctx: &mut ViewContext<'_>) -> Update {
        let input = std::mem::take(&mut self.input);
        let Some(item) = self.flow.item_mut(self.cursor) else {
            return self.finish(ctx);
        };

        // Enter on an empty line keeps a pre-filled value
        let result = if input.trim().is_empty() && item.value().is_some() {
            Ok(())
        } else {
            item.accept(&input)
        };

        match result {
            Ok(()) => {
                self.error = None;
                self.cursor += 1;
                self.settle();
                if self.current().is_none() {
                    return self.finish(ctx);
                }
                Update::stay()
            }
            Err(e) if e.is_recoverable() => {
                self.error = Some(e.to_string());
                self.input = input;
                Update::stay()
            }
            Err(e) => {
                ctx.set_error(format!("{}: {}", self.title, e));
                Update::close()
            }
        }
    }

    fn finish(&mut self, ctx: &mut ViewContext<'_>) -> Update {
        match self.flow.run() {
            Ok(()) => tracing::debug!(flow = %self.flow.name(), "flow completed"),
            Err(e) => {
                tracing::warn!(flow = %self.flow.name(), error = %e, "flow failed");
                let message = match e {
                    ParleyError::Flow(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                ctx.set_error(format!("{}: {}", self.title, message));
            }
        }
        Update::close()
    }

    fn answered(item: &FlowItem) -> String {
        match item.value() {
            Some(_) if item.is_masked() => "********".to_string(),
            Some(value) => value.to_string(),
            None => String::new(),
        }
    }
}

impl Modal<StateEvent> for FlowView {}

impl View for FlowView {
    fn kind(&self) -> ViewKind {
        ViewKind::Flow
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn init(&mut self, _ctx: &mut ViewContext<'_>) {
        self.cursor = 0;
        self.settle();
    }

    fn render(&self) -> String {
        let mut lines = Vec::new();
        for (index, item) in self.flow.items().iter().enumerate() {
            if !item.is_interactive() || index > self.cursor {
                continue;
            }
            if index < self.cursor {
                match item {
                    FlowItem::Notice(_) => lines.push(item.prompt().to_string()),
                    _ => lines.push(format!("  {}: {}", item.prompt(), Self::answered(item))),
                }
                continue;
            }

            lines.push(format!("> {}", item.prompt()));
            let typed = if item.is_masked() {
                "*".repeat(self.input.chars().count())
            } else {
                self.input.clone()
            };
            match item {
                FlowItem::Notice(_) => lines.push("  (press Enter to continue)".to_string()),
                _ if typed.is_empty() && item.value().is_some() => {
                    lines.push(format!("  [{}]", Self::answered(item)))
                }
                _ => lines.push(format!("  {}_", typed)),
            }
        }

        if let Some(error) = &self.error {
            lines.push(String::new());
            lines.push(format!("! {}", error));
        }
        lines.push(String::new());
        lines.push("Enter to confirm, Esc to cancel".to_string());
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
            InputEvent::Enter => self.submit(ctx),
            InputEvent::Escape => {
                ctx.set_status(format!("{} cancelled", self.title));
                Update::close()
            }
            _ => Update::stay(),
        }
    }
}
