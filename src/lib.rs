// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Parley - terminal chat client for pluggable AI providers.
//!
//! This crate exposes the runtime used by the `parley` CLI (`src/main.rs`).
//!
//! Architecture highlights:
//! - `flow`: guided multi-step data collection with conditional branches
//! - `modal`: the overlay stack and the event subject its views observe
//! - `llm`: provider abstraction, OpenAI and OpenRouter clients, registry
//! - `chat`: conversation session and transcript records
//! - `tui`: the chat interface built on the pieces above

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod llm;
pub mod modal;
pub mod tui;

pub use error::{ParleyError, Result};
