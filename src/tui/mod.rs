// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat TUI
//!
//! A conversation view with a stack of modal overlays on top: guided flows,
//! help, and the connection test monitor. Uses ratatui for rendering and
//! crossterm for input handling.

pub mod app;
pub mod events;
pub mod input;
pub mod ui;
pub mod view;
pub mod views;

use std::io;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::error::{ParleyError, Result};

pub use app::App;
pub use events::{AppEvent, EventReceiver, EventSender, StateEvent};
pub use input::InputEvent;
pub use view::{Effect, Next, Status, Update, View, ViewContext, ViewKind};

/// How long each iteration waits for a key press
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the chat TUI until the user quits
pub async fn run_chat_tui(mut app: App) -> Result<()> {
    // Setup terminal with panic hook to restore terminal on crash
    let original_panic_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_panic_hook(panic_info);
    }));

    enable_raw_mode().map_err(|e| ParleyError::Tui(e.to_string()))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| ParleyError::Tui(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| ParleyError::Tui(e.to_string()))?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    let _ = std::panic::take_hook();

    disable_raw_mode().map_err(|e| ParleyError::Tui(e.to_string()))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| ParleyError::Tui(e.to_string()))?;
    terminal
        .show_cursor()
        .map_err(|e| ParleyError::Tui(e.to_string()))?;

    result
}

/// Main application loop
async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        if run_app_iteration(terminal, app)? {
            return Ok(());
        }

        if let Some(event) = input::poll_input(POLL_INTERVAL)? {
            app.handle_input(event);
        }

        // Let reply tasks make progress between polls
        tokio::task::yield_now().await;
    }
}

/// Apply pending events and redraw. Returns true once the app should quit.
fn run_app_iteration<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<bool> {
    app.tick();
    if app.should_quit() {
        return Ok(true);
    }
    terminal
        .draw(|f| ui::draw(f, app))
        .map_err(|e| ParleyError::Tui(e.to_string()))?;
    Ok(false)
}
