// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Subscription-based event bus
//!
//! The bus never owns its observers. Each subscription is a channel: the bus
//! keeps the sending half, the observer keeps the [`EventFeed`]. Releasing a
//! subscription consumes its [`SubscriptionId`], so it can only happen once.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Handle for one registration on an [`EventBus`]. Deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Receiving end of a subscription
pub struct EventFeed<E> {
    rx: Receiver<E>,
}

impl<E> EventFeed<E> {
    /// Next pending event, if any
    pub fn try_next(&self) -> Option<E> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Take every pending event in publish order
    pub fn drain(&self) -> Vec<E> {
        self.rx.try_iter().collect()
    }
}

impl<E> fmt::Debug for EventFeed<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFeed").finish_non_exhaustive()
    }
}

/// Registration counters, mostly useful for checking balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    pub subscribed: usize,
    pub unsubscribed: usize,
}

impl BusStats {
    pub fn active(&self) -> usize {
        self.subscribed - self.unsubscribed
    }
}

/// Single-threaded publish/subscribe subject
pub struct EventBus<E> {
    next_id: Cell<u64>,
    subscribers: RefCell<BTreeMap<u64, Sender<E>>>,
    stats: Cell<BusStats>,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            subscribers: RefCell::new(BTreeMap::new()),
            stats: Cell::new(BusStats::default()),
        }
    }

    /// Register a new observer
    pub fn subscribe(&self) -> (SubscriptionId, EventFeed<E>) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().insert(id, tx);

        let mut stats = self.stats.get();
        stats.subscribed += 1;
        self.stats.set(stats);

        tracing::trace!(subscription = id, "observer subscribed");
        (SubscriptionId(id), EventFeed { rx })
    }

    /// Release a registration. Returns false if the id was not registered here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.borrow_mut().remove(&id.0).is_some();
        if removed {
            let mut stats = self.stats.get();
            stats.unsubscribed += 1;
            self.stats.set(stats);
            tracing::trace!(subscription = id.0, "observer unsubscribed");
        } else {
            tracing::warn!(subscription = id.0, "unsubscribe for unknown subscription");
        }
        removed
    }

    /// Send `event` to every current subscriber. Returns how many received it.
    pub fn publish(&self, event: E) -> usize {
        let subscribers = self.subscribers.borrow();
        let mut delivered = 0;
        for (id, tx) in subscribers.iter() {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(subscription = id, "observer feed dropped");
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn stats(&self) -> BusStats {
        self.stats.get()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.borrow().len())
            .field("stats", &self.stats.get())
            .finish()
    }
}
