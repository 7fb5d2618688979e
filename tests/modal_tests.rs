// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::rc::Rc;

use proptest::prelude::*;

use parley::modal::{EventBus, EventFeed, Modal, ModalStack, Observer};

/// Overlay that optionally observes the bus and keeps what it saw
struct Overlay {
    observes: bool,
    feed: Option<EventFeed<u32>>,
    seen: Vec<u32>,
}

impl Overlay {
    fn plain() -> Self {
        Self {
            observes: false,
            feed: None,
            seen: Vec::new(),
        }
    }

    fn observing() -> Self {
        Self {
            observes: true,
            ..Self::plain()
        }
    }

    fn poll(&mut self) {
        if let Some(feed) = &self.feed {
            self.seen.extend(feed.drain());
        }
    }
}

impl Observer<u32> for Overlay {
    fn attach(&mut self, feed: EventFeed<u32>) {
        self.feed = Some(feed);
    }

    fn detach(&mut self) {
        self.feed = None;
    }
}

impl Modal<u32> for Overlay {
    fn as_observer(&mut self) -> Option<&mut dyn Observer<u32>> {
        if self.observes {
            Some(self)
        } else {
            None
        }
    }
}

#[test]
fn test_pop_on_empty_stack_is_none() {
    let mut stack: ModalStack<Overlay, u32> = ModalStack::new();
    assert!(stack.pop().is_none());
    assert!(stack.current().is_none());
    assert!(stack.is_empty());
}

#[test]
fn test_covered_observers_still_receive_events() {
    let bus: Rc<EventBus<u32>> = Rc::new(EventBus::new());
    let mut stack = ModalStack::with_bus(bus.clone());

    stack.push(Box::new(Overlay::observing()));
    stack.push(Box::new(Overlay::plain()));
    assert_eq!(bus.publish(1), 1);

    let mut plain = stack.pop().unwrap();
    plain.poll();
    assert!(plain.seen.is_empty());

    let mut observer = stack.pop().unwrap();
    assert!(observer.feed.is_none());
    assert_eq!(bus.publish(2), 0);
    observer.poll();
    assert!(observer.seen.is_empty());
}

#[test]
fn test_observer_sees_events_while_on_top() {
    let bus: Rc<EventBus<u32>> = Rc::new(EventBus::new());
    let mut stack = ModalStack::with_bus(bus.clone());
    stack.push(Box::new(Overlay::observing()));

    bus.publish(7);
    bus.publish(8);
    let top = stack.current_mut().unwrap();
    top.poll();

    assert_eq!(top.seen, vec![7, 8]);
}

#[derive(Debug, Clone)]
enum Op {
    PushObserver,
    PushPlain,
    Pop,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::PushObserver), Just(Op::PushPlain), Just(Op::Pop)]
}

proptest! {
    #[test]
    fn prop_subscriptions_track_stack_contents(ops in proptest::collection::vec(op(), 0..64)) {
        let bus: Rc<EventBus<u32>> = Rc::new(EventBus::new());
        let mut stack = ModalStack::with_bus(bus.clone());
        let mut observers_on_stack: Vec<bool> = Vec::new();

        for op in ops {
            match op {
                Op::PushObserver => {
                    stack.push(Box::new(Overlay::observing()));
                    observers_on_stack.push(true);
                }
                Op::PushPlain => {
                    stack.push(Box::new(Overlay::plain()));
                    observers_on_stack.push(false);
                }
                Op::Pop => {
                    let popped = stack.pop();
                    prop_assert_eq!(popped.is_some(), observers_on_stack.pop().is_some());
                    if let Some(overlay) = popped {
                        prop_assert!(overlay.feed.is_none());
                    }
                }
            }
            let expected = observers_on_stack.iter().filter(|o| **o).count();
            prop_assert_eq!(bus.subscriber_count(), expected);
            prop_assert_eq!(stack.len(), observers_on_stack.len());
        }

        stack.clear();
        let stats = bus.stats();
        prop_assert_eq!(stats.subscribed, stats.unsubscribed);
        prop_assert_eq!(bus.subscriber_count(), 0);
    }
}
