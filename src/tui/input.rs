// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Input handling for the TUI
//!
//! Maps crossterm key events to the small set of inputs views understand.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::{ParleyError, Result};

/// Keyboard input as seen by views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Backspace,
    Enter,
    Escape,
    Up,
    Down,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+K
    Setup,
    /// Ctrl+L
    Clear,
    /// F1
    Help,
}

/// Translate a key event; releases and unmapped keys give `None`
pub fn translate(key: KeyEvent) -> Option<InputEvent> {
    // Only handle key press events (not release)
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(InputEvent::Interrupt),
            KeyCode::Char('k') => Some(InputEvent::Setup),
            KeyCode::Char('l') => Some(InputEvent::Clear),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Some(InputEvent::Char(c)),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::Enter => Some(InputEvent::Enter),
        KeyCode::Esc => Some(InputEvent::Escape),
        KeyCode::Up => Some(InputEvent::Up),
        KeyCode::Down => Some(InputEvent::Down),
        KeyCode::F(1) => Some(InputEvent::Help),
        _ => None,
    }
}

/// Wait up to `timeout` for the next mapped key press
pub fn poll_input(timeout: Duration) -> Result<Option<InputEvent>> {
    if !event::poll(timeout).map_err(|e| ParleyError::Tui(e.to_string()))? {
        return Ok(None);
    }
    match event::read().map_err(|e| ParleyError::Tui(e.to_string()))? {
        Event::Key(key) => Ok(translate(key)),
        _ => Ok(None),
    }
}
