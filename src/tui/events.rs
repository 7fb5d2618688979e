// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Event types for the chat TUI
//!
//! Background tasks and flow callbacks never touch UI state directly. They
//! post [`AppEvent`]s on an unbounded channel that the UI loop drains; the
//! loop then republishes anything observers care about as [`StateEvent`]s.

use tokio::sync::mpsc;

use crate::flow::builtin::ApiKeySetup;

/// Identifies one sent message and the reply events it produces
pub type ExchangeId = u64;

/// Identifies one connection test run
pub type TestId = u64;

/// Messages from callbacks and spawned tasks to the UI loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The API key setup flow finished with complete data
    SetupCompleted(ApiKeySetup),
    /// The exit confirmation flow finished
    ExitConfirmed(bool),
    /// A fragment of the assistant reply arrived
    StreamChunk(ExchangeId, String),
    /// The assistant reply is complete
    ReplyFinished(ExchangeId, String),
    /// The request or stream failed
    ReplyFailed(ExchangeId, String),
    /// Progress of a connection test
    State(StateEvent),
}

/// Events published on the shared subject to observing modals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    ConnectionTestStarted { test: TestId, provider: String },
    ConnectionTestChunk { test: TestId, chunk: String },
    ConnectionTestPassed { test: TestId, provider: String, reply: String },
    ConnectionTestFailed { test: TestId, provider: String, error: String },
}

impl StateEvent {
    /// The connection test run this event belongs to
    pub fn test(&self) -> TestId {
        match self {
            StateEvent::ConnectionTestStarted { test, .. }
            | StateEvent::ConnectionTestChunk { test, .. }
            | StateEvent::ConnectionTestPassed { test, .. }
            | StateEvent::ConnectionTestFailed { test, .. } => *test,
        }
    }
}

/// Type alias for the event sender
pub type EventSender = mpsc::UnboundedSender<AppEvent>;

/// Type alias for the event receiver
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

/// Create the UI loop's event channel
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
