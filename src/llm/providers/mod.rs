// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! AI provider implementations

pub(crate) mod common;
pub mod openai;
pub mod openrouter;

pub use openai::{OpenAiProvider, OPENAI_API_URL};
pub use openrouter::{OpenRouterProvider, OPENROUTER_API_URL};
