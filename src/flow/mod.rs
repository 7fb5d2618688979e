// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Guided multi-step flows
//!
//! Flows collect typed values under string keys, refuse to succeed until
//! every required key is present, and can branch into child flows whose
//! data is merged back into the parent.

pub mod builtin;
pub mod conditional;
pub mod engine;
pub mod item;
pub mod value;

pub use conditional::{ConditionalItem, BRANCH_NO, BRANCH_YES};
pub use engine::Flow;
pub use item::{ConfirmationItem, FlowItem, InputItem, NoticeItem};
pub use value::{FlowData, FlowValue};
