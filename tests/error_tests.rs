// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io;

use parley::error::{ApiError, FlowError, ParleyError};

#[test]
fn test_io_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let parley_error: ParleyError = io_error.into();

    match parley_error {
        ParleyError::Io(_) => {} // Expected
        _ => panic!("Expected Io error, got different error type"),
    }
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
    let parley_error: ParleyError = json_error.into();
    assert!(matches!(parley_error, ParleyError::Json(_)));
}

#[test]
fn test_config_error_display() {
    let error = ParleyError::Config("Missing API key".to_string());
    assert_eq!(error.to_string(), "Configuration error: Missing API key");
}

#[test]
fn test_unsupported_provider_display() {
    let error = ParleyError::UnsupportedProvider("Anthropic".to_string());
    assert_eq!(error.to_string(), "Unsupported provider: Anthropic");
}

#[test]
fn test_api_rate_limited_error() {
    let error = ApiError::RateLimited(30);
    assert_eq!(error.to_string(), "Rate limited: retry after 30 seconds");
}

#[test]
fn test_api_authentication_error() {
    let error = ApiError::AuthenticationFailed;
    assert_eq!(error.to_string(), "Authentication failed: invalid API key");
}

#[test]
fn test_api_stream_error_wraps() {
    let error: ParleyError = ApiError::StreamError("stream ended before completion".to_string()).into();
    assert_eq!(
        error.to_string(),
        "API error: Streaming error: stream ended before completion"
    );
}

#[test]
fn test_flow_incomplete_display() {
    let error: ParleyError = FlowError::Incomplete {
        missing: vec!["confirm_exit".to_string()],
    }
    .into();
    assert_eq!(
        error.to_string(),
        "Flow error: Incomplete data: missing confirm_exit"
    );
}

#[test]
fn test_only_validation_is_recoverable() {
    let validation = FlowError::Validation {
        key: "api_key".to_string(),
        reason: "too short".to_string(),
    };
    let exit = FlowError::ItemExit {
        key: "provider".to_string(),
        reason: "unknown".to_string(),
    };
    assert!(validation.is_recoverable());
    assert!(!exit.is_recoverable());
    assert!(!FlowError::State("bad".to_string()).is_recoverable());
}
