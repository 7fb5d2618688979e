// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::modal::Modal;
use crate::tui::events::StateEvent;
use crate::tui::input::InputEvent;
use crate::tui::view::{Update, View, ViewContext, ViewKind};

const HELP_TEXT: &str = "\
Keys:
  Enter       Send message
  Ctrl+K      Choose provider and API key
  Ctrl+L      Clear the conversation
  F1          Show this help
  Esc         Quit (asks first)
  Ctrl+C      Quit immediately

Commands:
  /setup      Choose provider and API key
  /clear      Clear the conversation
  /help       Show this help
  /quit       Quit (asks first)

Press Esc or Enter to close";

/// Static key reference
#[derive(Debug, Default)]
pub struct HelpModal;

impl HelpModal {
    pub fn new() -> Self {
        Self
    }
}

impl Modal<StateEvent> for HelpModal {}

impl View for HelpModal {
    fn kind(&self) -> ViewKind {
        ViewKind::Help
    }

    fn title(&self) -> &str {
        "Help"
    }

    fn render(&self) -> String {
        HELP_TEXT.to_string()
    }

    fn update(&mut self, event: &InputEvent, _ctx: &mut ViewContext<'_>) -> Update {
        match event {
            InputEvent::Escape | InputEvent::Enter | InputEvent::Help => Update::close(),
            _ => Update::stay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::events;
    use crate::tui::view::Next;

    #[test]
    fn test_help_closes_on_escape() {
        let (tx, _rx) = events::channel();
        let mut ctx = ViewContext::new(&tx, &[], None);
        let mut help = HelpModal::new();

        assert!(matches!(help.update(&InputEvent::Char('q'), &mut ctx).next, Next::Stay));
        assert!(matches!(help.update(&InputEvent::Escape, &mut ctx).next, Next::Close));
        assert!(help.render().contains("Ctrl+K"));
    }
}
