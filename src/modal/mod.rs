// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Overlay stack and the shared event subject its views observe

pub mod bus;
pub mod stack;

pub use bus::{BusStats, EventBus, EventFeed, SubscriptionId};
pub use stack::{Modal, ModalStack, Observer};
