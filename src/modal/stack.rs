// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LIFO stack of overlay views
//!
//! Entries that observe the shared [`EventBus`] are subscribed on push and
//! unsubscribed on pop. The subscription handle lives in the stack entry,
//! never in the view, so a popped view cannot leak its registration.

use std::fmt;
use std::rc::Rc;

use crate::modal::bus::{EventBus, EventFeed, SubscriptionId};

/// A view that wants events from the shared subject while it is on the stack
pub trait Observer<E> {
    /// Called once, right after the view is pushed
    fn attach(&mut self, feed: EventFeed<E>);

    /// Called once, right before the view is popped
    fn detach(&mut self);
}

/// Anything that can sit on a [`ModalStack`]
pub trait Modal<E> {
    /// Views that observe the shared subject return themselves here
    fn as_observer(&mut self) -> Option<&mut dyn Observer<E>> {
        None
    }
}

struct Entry<M: ?Sized> {
    modal: Box<M>,
    subscription: Option<SubscriptionId>,
}

pub struct ModalStack<M: ?Sized + Modal<E>, E: Clone> {
    entries: Vec<Entry<M>>,
    bus: Option<Rc<EventBus<E>>>,
}

impl<M: ?Sized + Modal<E>, E: Clone> ModalStack<M, E> {
    /// Stack with no shared subject; observers are never subscribed
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            bus: None,
        }
    }

    /// Stack whose observer entries subscribe to `bus`
    pub fn with_bus(bus: Rc<EventBus<E>>) -> Self {
        Self {
            entries: Vec::new(),
            bus: Some(bus),
        }
    }

    pub fn bus(&self) -> Option<&Rc<EventBus<E>>> {
        self.bus.as_ref()
    }

    pub fn push(&mut self, mut modal: Box<M>) {
        let subscription = match (&self.bus, modal.as_observer()) {
            (Some(bus), Some(observer)) => {
                let (id, feed) = bus.subscribe();
                observer.attach(feed);
                Some(id)
            }
            _ => None,
        };
        tracing::debug!(
            depth = self.entries.len() + 1,
            observing = subscription.is_some(),
            "modal pushed"
        );
        self.entries.push(Entry {
            modal,
            subscription,
        });
    }

    /// Remove the top entry, releasing its subscription first.
    /// Popping an empty stack is a no-op.
    pub fn pop(&mut self) -> Option<Box<M>> {
        let Entry {
            mut modal,
            subscription,
        } = self.entries.pop()?;

        if let Some(id) = subscription {
            if let Some(observer) = modal.as_observer() {
                observer.detach();
            }
            if let Some(bus) = &self.bus {
                bus.unsubscribe(id);
            }
        }
        tracing::debug!(depth = self.entries.len(), "modal popped");
        Some(modal)
    }

    /// Pop every entry, top first
    pub fn clear(&mut self) -> Vec<Box<M>> {
        let mut popped = Vec::with_capacity(self.entries.len());
        while let Some(modal) = self.pop() {
            popped.push(modal);
        }
        popped
    }

    pub fn current(&self) -> Option<&M> {
        self.entries.last().map(|entry| entry.modal.as_ref())
    }

    pub fn current_mut(&mut self) -> Option<&mut M> {
        self.entries.last_mut().map(|entry| entry.modal.as_mut())
    }

    /// Entries from bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &M> {
        self.entries.iter().map(|entry| entry.modal.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M: ?Sized + Modal<E>, E: Clone> Default for ModalStack<M, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ?Sized + Modal<E>, E: Clone> Drop for ModalStack<M, E> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<M: ?Sized + Modal<E>, E: Clone> fmt::Debug for ModalStack<M, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalStack")
            .field("depth", &self.entries.len())
            .field("has_bus", &self.bus.is_some())
            .finish()
    }
}
