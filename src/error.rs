// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for Parley
//!
//! This module defines all error types used throughout the application.

use thiserror::Error;

/// Main error type for Parley operations
#[derive(Error, Debug)]
pub enum ParleyError {
    /// Flow execution errors
    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    /// API-related errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A provider name that the registry does not know about
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Terminal UI errors
    #[error("TUI error: {0}")]
    Tui(String),

    /// Transcript store errors
    #[error("Transcript error: {0}")]
    Transcript(String),
}

/// Errors raised while gathering or executing a flow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// A single item rejected its input; the item should be re-presented
    #[error("Invalid value for '{key}': {reason}")]
    Validation { key: String, reason: String },

    /// All items ran but some required keys were never set
    #[error("Incomplete data: missing {}", .missing.join(", "))]
    Incomplete { missing: Vec<String> },

    /// An item's exit hook failed
    #[error("Step '{key}' failed: {reason}")]
    ItemExit { key: String, reason: String },

    /// Saved item state could not be restored
    #[error("Invalid step state: {0}")]
    State(String),
}

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed (invalid API key)
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Rate limited by the API
    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    /// Requested model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Streaming error
    #[error("Streaming error: {0}")]
    StreamError(String),
}

impl FlowError {
    /// Whether the error should be shown in place so the user can retry the step
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FlowError::Validation { .. })
    }
}

/// Result type alias for Parley operations
pub type Result<T> = std::result::Result<T, ParleyError>;
