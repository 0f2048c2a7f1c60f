//! In-context broadcast.
//!
//! The bus carries [`SyncEvent`]s between consumers that live in the same
//! execution context but do not share a call chain: two mode managers mounted
//! by different parts of one page, for instance. Delivery is synchronous and
//! in registration order. Other contexts are reached through the
//! [`Store`](crate::Store) instead.

use std::rc::Rc;

use crate::listeners::{ListenerSet, Subscription};

/// A change broadcast within one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    /// Event kind, e.g. `theme-mode-change-event`.
    pub name: String,
    /// Encoded new value. `None` models a broadcast without payload.
    pub detail: Option<String>,
}

impl SyncEvent {
    pub fn new(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: Some(detail.into()),
        }
    }
}

/// The broadcast channel of one execution context. Clones share listeners.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    listeners: ListenerSet<SyncEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every current listener before returning.
    pub fn dispatch(&self, event: &SyncEvent) {
        tracing::trace!(event = %event.name, detail = ?event.detail, "dispatching sync event");
        self.listeners.emit(event);
    }

    /// Registers a listener for every event on this bus.
    pub fn listen(&self, listener: impl Fn(&SyncEvent) + 'static) -> Subscription {
        self.listeners.add(Rc::new(listener))
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
