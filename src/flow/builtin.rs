// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Built-in flows used by the chat application

use crate::error::{ParleyError, Result};
use crate::flow::{ConditionalItem, ConfirmationItem, Flow, FlowData, InputItem, NoticeItem};

pub const CONFIRM_EXIT: &str = "confirm_exit";
pub const PROVIDER: &str = "provider";
pub const API_KEY: &str = "api_key";
pub const REMEMBER_KEY: &str = "remember_key";
pub const RUN_TEST: &str = "run_test";
pub const TEST_BRANCH: &str = "test_connection";
pub const TEST_REQUESTED: &str = "test_requested";

/// Minimum accepted API key length
const MIN_API_KEY_LEN: usize = 8;

/// "Quit parley?" confirmation
pub fn exit_confirmation(on_success: impl FnMut(&FlowData) -> Result<()> + 'static) -> Flow {
    Flow::new("exit-confirmation")
        .item(ConfirmationItem::new(CONFIRM_EXIT, "Quit parley? [Y/n]").default_answer(true))
        .require(CONFIRM_EXIT)
        .on_success(on_success)
}

/// Provider selection, API key entry and optional connection test.
///
/// `providers` are the names the registry knows about; choosing anything
/// else fails when the provider step is left.
pub fn api_key_setup(
    providers: Vec<String>,
    current: Option<&str>,
    on_success: impl FnMut(&FlowData) -> Result<()> + 'static,
) -> Flow {
    let intro = if providers.is_empty() {
        "No providers are configured.".to_string()
    } else {
        format!("Available providers: {}", providers.join(", "))
    };

    let mut provider = InputItem::new(PROVIDER, "Provider name").on_exit(move |data| {
        let chosen = data.get_text(PROVIDER).unwrap_or_default();
        if providers.iter().any(|name| name == chosen) {
            Ok(())
        } else {
            Err(ParleyError::UnsupportedProvider(chosen.to_string()))
        }
    });
    if let Some(current) = current {
        provider = provider.with_value(current);
    }

    Flow::new("api-key-setup")
        .item(NoticeItem::new(intro))
        .item(provider)
        .item(InputItem::new(API_KEY, "API key").masked().min_len(MIN_API_KEY_LEN))
        .item(ConfirmationItem::new(REMEMBER_KEY, "Save this key to settings? [y/N]").default_answer(false))
        .item(ConfirmationItem::new(RUN_TEST, "Send a test message now? [Y/n]").default_answer(true))
        .item(
            ConditionalItem::new(TEST_BRANCH, |data| data.get_bool(RUN_TEST) == Some(true))
                .on_yes(|| {
                    Flow::new("connection-test")
                        .with_data(TEST_REQUESTED, true)
                        .require(TEST_REQUESTED)
                })
                .on_no(|| Flow::new("skip-test").with_data(TEST_REQUESTED, false)),
        )
        .require(PROVIDER)
        .require(API_KEY)
        .require(REMEMBER_KEY)
        .require(TEST_BRANCH)
        .require(TEST_REQUESTED)
        .on_success(on_success)
}

/// Typed view of a completed [`api_key_setup`] flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeySetup {
    pub provider: String,
    pub api_key: String,
    pub remember: bool,
    pub test_requested: bool,
}

impl ApiKeySetup {
    pub fn from_data(data: &FlowData) -> Option<Self> {
        Some(Self {
            provider: data.get_text(PROVIDER)?.to_string(),
            api_key: data.get_text(API_KEY)?.to_string(),
            remember: data.get_bool(REMEMBER_KEY).unwrap_or(false),
            test_requested: data.get_bool(TEST_REQUESTED).unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn providers() -> Vec<String> {
        vec!["OpenAI".to_string(), "OpenRouter".to_string()]
    }

    fn answer(flow: &mut Flow, answers: &[&str]) {
        let mut next = answers.iter();
        for index in 0..flow.len() {
            let item = flow.item_mut(index).unwrap();
            if !item.is_interactive() {
                continue;
            }
            let input = next.next().expect("not enough answers");
            item.accept(input).unwrap();
        }
    }

    #[test]
    fn test_exit_confirmation_default_yes() {
        let seen = Rc::new(RefCell::new(None));
        let slot = seen.clone();
        let mut flow = exit_confirmation(move |data| {
            *slot.borrow_mut() = data.get_bool(CONFIRM_EXIT);
            Ok(())
        });
        answer(&mut flow, &[""]);
        flow.run().unwrap();
        assert_eq!(*seen.borrow(), Some(true));
    }

    #[test]
    fn test_api_key_setup_with_test() {
        let result = Rc::new(RefCell::new(None));
        let slot = result.clone();
        let mut flow = api_key_setup(providers(), None, move |data| {
            *slot.borrow_mut() = ApiKeySetup::from_data(data);
            Ok(())
        });

        answer(&mut flow, &["", "OpenRouter", "sk-or-12345678", "y", ""]);
        flow.run().unwrap();

        let setup = result.borrow().clone().unwrap();
        assert_eq!(setup.provider, "OpenRouter");
        assert_eq!(setup.api_key, "sk-or-12345678");
        assert!(setup.remember);
        assert!(setup.test_requested);
        assert_eq!(flow.data().get_text(TEST_BRANCH), Some("yes"));
    }

    #[test]
    fn test_api_key_setup_skip_test() {
        let mut flow = api_key_setup(providers(), Some("OpenAI"), |_| Ok(()));
        // Provider step is pre-filled; the user only confirms it.
        answer(&mut flow, &["", "OpenAI", "sk-12345678", "n", "n"]);
        flow.run().unwrap();

        let setup = ApiKeySetup::from_data(flow.data()).unwrap();
        assert!(!setup.test_requested);
        assert!(!setup.remember);
        assert_eq!(flow.data().get_text(TEST_BRANCH), Some("no"));
    }

    #[test]
    fn test_api_key_setup_rejects_unknown_provider() {
        let mut flow = api_key_setup(providers(), None, |_| Ok(()));
        answer(&mut flow, &["", "Acme", "sk-12345678", "n", "n"]);

        let err = flow.run().unwrap_err();
        match err {
            ParleyError::Flow(FlowError::ItemExit { key, reason }) => {
                assert_eq!(key, PROVIDER);
                assert!(reason.contains("Acme"));
            }
            other => panic!("Expected ItemExit, got {:?}", other),
        }
    }

    #[test]
    fn test_api_key_too_short_is_validation_error() {
        let mut flow = api_key_setup(providers(), None, |_| Ok(()));
        let key_step = flow.item_mut(2).unwrap();
        assert!(key_step.accept("short").unwrap_err().is_recoverable());
    }

    #[test]
    fn test_api_key_setup_incomplete_without_key() {
        let mut flow = api_key_setup(providers(), Some("OpenAI"), |_| Ok(()));
        let err = flow.run().unwrap_err();
        match err {
            ParleyError::Flow(FlowError::Incomplete { missing }) => {
                assert!(missing.contains(&API_KEY.to_string()));
                assert!(missing.contains(&REMEMBER_KEY.to_string()));
                assert!(!missing.contains(&PROVIDER.to_string()));
            }
            other => panic!("Expected Incomplete, got {:?}", other),
        }
    }
}
