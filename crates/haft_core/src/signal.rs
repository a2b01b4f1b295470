//! Synchronous observer signal
//!
//! A single broadcast per event value: subscribers are invoked in
//! subscription order, on the emitting thread, before `emit` returns.
//! Subscriber filtering (e.g. "only slot 3") is the subscriber's job,
//! which bounds memory to the number of active subscriptions rather than
//! one object per slot.

use core::fmt;

/// Handle identifying a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

type Handler<E> = Box<dyn Fn(&E)>;

/// An ordered list of handlers for one event type.
///
/// Handlers receive a shared reference only and must not re-enter the
/// object that is emitting (caller discipline, not enforced here).
pub struct Signal<E> {
    handlers: Vec<(SubscriberId, Handler<E>)>,
    next_id: u64,
}

impl<E> Signal<E> {
    /// Create an empty signal.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 1,
        }
    }

    /// Subscribe a handler; returns the id needed to unsubscribe.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&E) + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a subscription. Returns false if the id was not found.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub_id, _)| *sub_id != id);
        self.handlers.len() != before
    }

    /// Deliver an event to every subscriber, in subscription order.
    pub fn emit(&self, event: &E) {
        for (_, handler) in &self.handlers {
            handler(event);
        }
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    /// Check if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}
