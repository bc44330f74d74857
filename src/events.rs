// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process observer events.
//!
//! A plain callback registry: subscribers are invoked synchronously, in
//! subscription order, at the moment the state change is triggered. Delivery
//! happens on the caller's thread; there is no queueing.

/// A typed event with a list of subscribers.
pub struct Event<T> {
    handlers: Vec<Box<dyn Fn(&T)>>,
}

impl<T> Event<T> {
    /// Creates an event with no subscribers.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Registers a subscriber. Subscribers cannot currently be removed; the
    /// owning component is rebuilt instead.
    pub fn subscribe(&mut self, handler: impl Fn(&T) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Invokes every current subscriber with `payload`, in order.
    pub fn trigger(&self, payload: &T) {
        for handler in &self.handlers {
            handler(payload);
        }
    }

    /// Number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn delivers_to_all_subscribers_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut event: Event<u32> = Event::new();

        let first = Rc::clone(&seen);
        event.subscribe(move |v| first.borrow_mut().push(("first", *v)));
        let second = Rc::clone(&seen);
        event.subscribe(move |v| second.borrow_mut().push(("second", *v)));

        event.trigger(&7);
        assert_eq!(*seen.borrow(), [("first", 7), ("second", 7)]);
        assert_eq!(event.subscriber_count(), 2);
    }

    #[test]
    fn trigger_without_subscribers_is_fine() {
        let event: Event<String> = Event::new();
        event.trigger(&"nobody listening".to_string());
    }
}
