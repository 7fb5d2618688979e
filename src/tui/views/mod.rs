// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Concrete views

pub mod chat;
pub mod connection;
pub mod flow;
pub mod help;

pub use chat::{ChatView, DisplayMessage, Speaker};
pub use connection::{ConnectionTestModal, TestStatus};
pub use flow::FlowView;
pub use help::HelpModal;

use crate::error::{FlowError, ParleyError, Result};
use crate::flow::builtin::{self, ApiKeySetup};
use crate::tui::events::{AppEvent, EventSender};
use crate::tui::view::ViewContext;

fn post(events: &EventSender, event: AppEvent) -> Result<()> {
    events
        .send(event)
        .map_err(|_| ParleyError::Tui("event loop has shut down".to_string()))
}

/// Provider and API key setup, posting [`AppEvent::SetupCompleted`]
pub fn setup_view(ctx: &ViewContext<'_>) -> FlowView {
    let events = ctx.events.clone();
    let flow = builtin::api_key_setup(ctx.providers.to_vec(), ctx.current_provider, move |data| {
        let setup = ApiKeySetup::from_data(data).ok_or_else(|| FlowError::Incomplete {
            missing: vec![builtin::PROVIDER.to_string(), builtin::API_KEY.to_string()],
        })?;
        post(&events, AppEvent::SetupCompleted(setup))
    });
    FlowView::new("API key setup", flow)
}

/// Quit confirmation, posting [`AppEvent::ExitConfirmed`]
pub fn exit_view(ctx: &ViewContext<'_>) -> FlowView {
    let events = ctx.events.clone();
    let flow = builtin::exit_confirmation(move |data| {
        let confirmed = data.get_bool(builtin::CONFIRM_EXIT).unwrap_or(false);
        post(&events, AppEvent::ExitConfirmed(confirmed))
    });
    FlowView::new("Quit", flow)
}
