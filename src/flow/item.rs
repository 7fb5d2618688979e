// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Flow steps
//!
//! A flow is a sequence of [`FlowItem`]s. Every variant exposes the same
//! small surface (key, value, validate, enter/exit hooks, state save and
//! restore) so presenters and the flow runner never need to know which kind
//! of step they hold.

use std::fmt;

use crate::error::{FlowError, Result};
use crate::flow::conditional::ConditionalItem;
use crate::flow::value::{FlowData, FlowValue};

/// Side effect run when a step is left. Failures abort the flow.
pub type ExitHook = Box<dyn FnMut(&FlowData) -> Result<()>>;

/// Accepted answers for confirmation steps
const YES_ANSWERS: &[&str] = &["y", "yes"];
const NO_ANSWERS: &[&str] = &["n", "no"];

/// A single step in a flow
pub enum FlowItem {
    /// Free text entry
    Input(InputItem),
    /// Yes/no question
    Confirmation(ConfirmationItem),
    /// Static message the user acknowledges
    Notice(NoticeItem),
    /// Branch into one of two child flows
    Conditional(ConditionalItem),
}

impl FlowItem {
    /// Data-bag key for this step. Empty for steps that store nothing.
    pub fn key(&self) -> &str {
        match self {
            FlowItem::Input(item) => &item.key,
            FlowItem::Confirmation(item) => &item.key,
            FlowItem::Notice(_) => "",
            FlowItem::Conditional(item) => item.key(),
        }
    }

    /// Short type tag, used in logs and by presenters
    pub fn kind(&self) -> &'static str {
        match self {
            FlowItem::Input(_) => "input",
            FlowItem::Confirmation(_) => "confirmation",
            FlowItem::Notice(_) => "notice",
            FlowItem::Conditional(_) => "conditional",
        }
    }

    /// Prompt or message shown to the user
    pub fn prompt(&self) -> &str {
        match self {
            FlowItem::Input(item) => &item.prompt,
            FlowItem::Confirmation(item) => &item.prompt,
            FlowItem::Notice(item) => &item.message,
            FlowItem::Conditional(_) => "",
        }
    }

    /// Last gathered value
    pub fn value(&self) -> Option<FlowValue> {
        match self {
            FlowItem::Input(item) => item.value.clone().map(FlowValue::Text),
            FlowItem::Confirmation(item) => item.value.map(FlowValue::Bool),
            FlowItem::Notice(_) => None,
            FlowItem::Conditional(item) => item.value(),
        }
    }

    /// Whether a presenter needs user input for this step
    pub fn is_interactive(&self) -> bool {
        !matches!(self, FlowItem::Conditional(_))
    }

    /// Whether typed input should be hidden when shown
    pub fn is_masked(&self) -> bool {
        matches!(self, FlowItem::Input(item) if item.masked)
    }

    /// Check raw input against the step's constraint without storing it
    pub fn validate(&self, input: &str) -> std::result::Result<(), FlowError> {
        match self {
            FlowItem::Input(item) => item.validate(input),
            FlowItem::Confirmation(item) => item.validate(input).map(|_| ()),
            FlowItem::Notice(_) => Ok(()),
            FlowItem::Conditional(item) => item.validate(input),
        }
    }

    /// Validate and store raw input as the step's value
    pub fn accept(&mut self, input: &str) -> std::result::Result<(), FlowError> {
        match self {
            FlowItem::Input(item) => item.accept(input),
            FlowItem::Confirmation(item) => item.accept(input),
            FlowItem::Notice(item) => {
                item.acknowledged = true;
                Ok(())
            }
            FlowItem::Conditional(item) => item.accept(input),
        }
    }

    /// Activation hook. Returns true only on the first call.
    pub fn on_enter(&mut self) -> bool {
        let (entered, kind, key) = match self {
            FlowItem::Input(item) => (&mut item.entered, "input", item.key.as_str()),
            FlowItem::Confirmation(item) => {
                (&mut item.entered, "confirmation", item.key.as_str())
            }
            FlowItem::Notice(item) => (&mut item.entered, "notice", ""),
            FlowItem::Conditional(item) => return item.on_enter(),
        };
        if *entered {
            return false;
        }
        *entered = true;
        tracing::debug!(kind, key, "flow step entered");
        true
    }

    /// Deactivation hook: commit the step's value into `data` and run any
    /// attached side effect.
    pub fn on_exit(&mut self, data: &mut FlowData) -> Result<()> {
        match self {
            FlowItem::Input(item) => {
                if let Some(value) = &item.value {
                    data.set(item.key.clone(), value.clone());
                }
                run_hook(&item.key, item.exit_hook.as_mut(), data)
            }
            FlowItem::Confirmation(item) => {
                if let Some(value) = item.value {
                    data.set(item.key.clone(), value);
                }
                run_hook(&item.key, item.exit_hook.as_mut(), data)
            }
            FlowItem::Notice(item) => run_hook("", item.exit_hook.as_mut(), data),
            FlowItem::Conditional(item) => item.submit(data),
        }
    }

    /// Serialize the in-progress value
    pub fn marshal_state(&self) -> std::result::Result<String, FlowError> {
        serde_json::to_string(&self.value()).map_err(|e| FlowError::State(e.to_string()))
    }

    /// Restore a value previously produced by [`FlowItem::marshal_state`]
    pub fn unmarshal_state(&mut self, state: &str) -> std::result::Result<(), FlowError> {
        let restored: Option<FlowValue> =
            serde_json::from_str(state).map_err(|e| FlowError::State(e.to_string()))?;

        match (self, restored) {
            (FlowItem::Input(item), None) => item.value = None,
            (FlowItem::Input(item), Some(FlowValue::Text(text))) => {
                item.validate(&text).map_err(|e| FlowError::State(e.to_string()))?;
                item.value = Some(text);
            }
            (FlowItem::Confirmation(item), restored @ (None | Some(FlowValue::Bool(_)))) => {
                item.value = restored.and_then(|v| v.as_bool());
            }
            (FlowItem::Notice(_), None) => {}
            (FlowItem::Conditional(item), restored) => item.restore(restored)?,
            (item, Some(value)) => {
                return Err(FlowError::State(format!(
                    "{} step cannot hold {:?}",
                    item.kind(),
                    value
                )))
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FlowItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowItem")
            .field("kind", &self.kind())
            .field("key", &self.key())
            .field("value", &self.value())
            .finish()
    }
}

impl From<InputItem> for FlowItem {
    fn from(item: InputItem) -> Self {
        FlowItem::Input(item)
    }
}

impl From<ConfirmationItem> for FlowItem {
    fn from(item: ConfirmationItem) -> Self {
        FlowItem::Confirmation(item)
    }
}

impl From<NoticeItem> for FlowItem {
    fn from(item: NoticeItem) -> Self {
        FlowItem::Notice(item)
    }
}

impl From<ConditionalItem> for FlowItem {
    fn from(item: ConditionalItem) -> Self {
        FlowItem::Conditional(item)
    }
}

fn run_hook(key: &str, hook: Option<&mut ExitHook>, data: &FlowData) -> Result<()> {
    let Some(hook) = hook else {
        return Ok(());
    };
    hook(data).map_err(|e| {
        FlowError::ItemExit {
            key: key.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Free text entry step
pub struct InputItem {
    key: String,
    prompt: String,
    value: Option<String>,
    min_len: usize,
    masked: bool,
    entered: bool,
    exit_hook: Option<ExitHook>,
}

impl InputItem {
    pub fn new(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            value: None,
            min_len: 1,
            masked: false,
            entered: false,
            exit_hook: None,
        }
    }

    /// Require at least `min_len` characters (after trimming)
    pub fn min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len.max(1);
        self
    }

    /// Hide the typed value when rendered (API keys)
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Pre-fill the step with a value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attach a side effect run when the step is left
    pub fn on_exit(mut self, hook: impl FnMut(&FlowData) -> Result<()> + 'static) -> Self {
        self.exit_hook = Some(Box::new(hook));
        self
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    fn validate(&self, input: &str) -> std::result::Result<(), FlowError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FlowError::Validation {
                key: self.key.clone(),
                reason: "value must not be empty".to_string(),
            });
        }
        if trimmed.chars().count() < self.min_len {
            return Err(FlowError::Validation {
                key: self.key.clone(),
                reason: format!("value must be at least {} characters", self.min_len),
            });
        }
        Ok(())
    }

    fn accept(&mut self, input: &str) -> std::result::Result<(), FlowError> {
        self.validate(input)?;
        self.value = Some(input.trim().to_string());
        Ok(())
    }
}

/// Yes/no question step
pub struct ConfirmationItem {
    key: String,
    prompt: String,
    value: Option<bool>,
    default: Option<bool>,
    entered: bool,
    exit_hook: Option<ExitHook>,
}

impl ConfirmationItem {
    pub fn new(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            value: None,
            default: None,
            entered: false,
            exit_hook: None,
        }
    }

    /// Answer used when the user submits an empty line
    pub fn default_answer(mut self, answer: bool) -> Self {
        self.default = Some(answer);
        self
    }

    /// Attach a side effect run when the step is left
    pub fn on_exit(mut self, hook: impl FnMut(&FlowData) -> Result<()> + 'static) -> Self {
        self.exit_hook = Some(Box::new(hook));
        self
    }

    pub fn default_value(&self) -> Option<bool> {
        self.default
    }

    fn validate(&self, input: &str) -> std::result::Result<bool, FlowError> {
        let answer = input.trim().to_ascii_lowercase();
        if answer.is_empty() {
            if let Some(default) = self.default {
                return Ok(default);
            }
        }
        if YES_ANSWERS.contains(&answer.as_str()) {
            Ok(true)
        } else if NO_ANSWERS.contains(&answer.as_str()) {
            Ok(false)
        } else {
            Err(FlowError::Validation {
                key: self.key.clone(),
                reason: "answer yes or no".to_string(),
            })
        }
    }

    fn accept(&mut self, input: &str) -> std::result::Result<(), FlowError> {
        self.value = Some(self.validate(input)?);
        Ok(())
    }
}

/// Static message step
pub struct NoticeItem {
    message: String,
    acknowledged: bool,
    entered: bool,
    exit_hook: Option<ExitHook>,
}

impl NoticeItem {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            acknowledged: false,
            entered: false,
            exit_hook: None,
        }
    }

    /// Attach a side effect run when the step is left
    pub fn on_exit(mut self, hook: impl FnMut(&FlowData) -> Result<()> + 'static) -> Self {
        self.exit_hook = Some(Box::new(hook));
        self
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParleyError;

    #[test]
    fn test_input_rejects_blank() {
        let item = FlowItem::from(InputItem::new("api_key", "API key"));
        let err = item.validate("   ").unwrap_err();
        assert!(matches!(err, FlowError::Validation { ref key, .. } if key == "api_key"));
    }

    #[test]
    fn test_input_min_len() {
        let mut item = FlowItem::from(InputItem::new("api_key", "API key").min_len(4));
        assert!(item.accept("abc").is_err());
        assert_eq!(item.value(), None);

        item.accept("  abcd ").unwrap();
        assert_eq!(item.value(), Some(FlowValue::text("abcd")));
    }

    #[test]
    fn test_failed_validation_keeps_previous_value() {
        let mut item = FlowItem::from(InputItem::new("name", "Name"));
        item.accept("first").unwrap();
        assert!(item.accept("").is_err());
        assert_eq!(item.value(), Some(FlowValue::text("first")));
    }

    #[test]
    fn test_confirmation_answers() {
        let mut item = FlowItem::from(ConfirmationItem::new("confirm_exit", "Quit?"));
        for (input, expected) in [("y", true), ("YES", true), ("n", false), (" No ", false)] {
            item.accept(input).unwrap();
            assert_eq!(item.value(), Some(FlowValue::Bool(expected)));
        }
        assert!(item.validate("maybe").is_err());
        assert!(item.validate("").is_err());
    }

    #[test]
    fn test_confirmation_default_answer() {
        let mut item =
            FlowItem::from(ConfirmationItem::new("remember_key", "Remember?").default_answer(false));
        item.accept("").unwrap();
        assert_eq!(item.value(), Some(FlowValue::Bool(false)));
    }

    #[test]
    fn test_notice_is_not_keyed() {
        let mut item = FlowItem::from(NoticeItem::new("Welcome"));
        assert_eq!(item.key(), "");
        assert_eq!(item.prompt(), "Welcome");
        assert!(item.validate("anything").is_ok());
        item.accept("").unwrap();
        assert_eq!(item.value(), None);
    }

    #[test]
    fn test_on_enter_is_idempotent() {
        let mut item = FlowItem::from(InputItem::new("k", "p"));
        assert!(item.on_enter());
        assert!(!item.on_enter());
        assert!(!item.on_enter());
    }

    #[test]
    fn test_on_exit_writes_value() {
        let mut item = FlowItem::from(InputItem::new("provider", "Provider").with_value("OpenAI"));
        let mut data = FlowData::new();
        item.on_exit(&mut data).unwrap();
        assert_eq!(data.get_text("provider"), Some("OpenAI"));
    }

    #[test]
    fn test_on_exit_without_value_writes_nothing() {
        let mut item = FlowItem::from(ConfirmationItem::new("confirm", "Sure?"));
        let mut data = FlowData::new();
        item.on_exit(&mut data).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_exit_hook_failure_becomes_item_exit() {
        let mut item = FlowItem::from(
            NoticeItem::new("Saving")
                .on_exit(|_| Err(ParleyError::Config("read-only".to_string()))),
        );
        let err = item.on_exit(&mut FlowData::new()).unwrap_err();
        match err {
            ParleyError::Flow(FlowError::ItemExit { reason, .. }) => {
                assert!(reason.contains("read-only"))
            }
            other => panic!("Expected ItemExit, got {:?}", other),
        }
    }

    #[test]
    fn test_exit_hook_sees_committed_value() {
        let mut item = FlowItem::from(InputItem::new("name", "Name").with_value("x").on_exit(
            |data| {
                assert_eq!(data.get_text("name"), Some("x"));
                Ok(())
            },
        ));
        item.on_exit(&mut FlowData::new()).unwrap();
    }

    #[test]
    fn test_marshal_round_trip() {
        let mut input = FlowItem::from(InputItem::new("k", "p").with_value("secret"));
        let state = input.marshal_state().unwrap();
        let mut restored = FlowItem::from(InputItem::new("k", "p"));
        restored.unmarshal_state(&state).unwrap();
        assert_eq!(restored.value(), input.value());

        input.unmarshal_state("null").unwrap();
        assert_eq!(input.value(), None);

        let mut confirm = FlowItem::from(ConfirmationItem::new("c", "p"));
        confirm.accept("y").unwrap();
        let state = confirm.marshal_state().unwrap();
        let mut restored = FlowItem::from(ConfirmationItem::new("c", "p"));
        restored.unmarshal_state(&state).unwrap();
        assert_eq!(restored.value(), Some(FlowValue::Bool(true)));
    }

    #[test]
    fn test_unmarshal_rejects_wrong_kind() {
        let mut input = FlowItem::from(InputItem::new("k", "p"));
        let state = serde_json::to_string(&Some(FlowValue::Bool(true))).unwrap();
        assert!(matches!(
            input.unmarshal_state(&state),
            Err(FlowError::State(_))
        ));

        let mut notice = FlowItem::from(NoticeItem::new("hi"));
        let state = serde_json::to_string(&Some(FlowValue::text("x"))).unwrap();
        assert!(notice.unmarshal_state(&state).is_err());
        assert!(notice.unmarshal_state("not json").is_err());
    }

    #[test]
    fn test_unmarshal_rejects_invalid_input_value() {
        let mut input = FlowItem::from(InputItem::new("k", "p"));
        let state = serde_json::to_string(&Some(FlowValue::text("  "))).unwrap();
        assert!(input.unmarshal_state(&state).is_err());
    }
}
