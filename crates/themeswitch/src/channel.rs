//! Cross-context synchronization channel.
//!
//! A [`SyncChannel`] keeps every live copy of one persisted value convergent
//! without a coordinator. It unifies two delivery paths behind one typed
//! subscribe call:
//!
//! ```text
//! publish(value)
//!   → Store::set(key, value)        → other contexts (via Store::subscribe)
//!   → EventBus::dispatch(event)     → this context, synchronously
//! ```
//!
//! Delivery is at-least-once and self-inclusive: the publishing context's own
//! subscribers receive the broadcast too. Cross-context delivery order is
//! whatever the store provides, and duplicates are possible, so subscribers
//! must apply values idempotently.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::bus::{EventBus, SyncEvent};
use crate::env::{StorageChange, Store};
use crate::listeners::Subscription;

/// A value that can travel over a [`SyncChannel`].
pub trait SyncValue: Clone + 'static {
    /// Raw string form written to the store and carried by events.
    fn encode(&self) -> String;

    /// Parses a raw value. `None` marks it as malformed; malformed inbound
    /// values are ignored.
    fn decode(raw: &str) -> Option<Self>;
}

/// Free-form values. The empty string is treated as "no payload".
impl SyncValue for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(raw.to_string())
        }
    }
}

/// Where a channel persists and what event name it broadcasts under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub storage_key: String,
    pub event: String,
}

impl ChannelKey {
    pub fn new(storage_key: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            event: event.into(),
        }
    }
}

/// Typed publish/subscribe over one persisted key.
pub struct SyncChannel<T> {
    key: ChannelKey,
    store: Rc<dyn Store>,
    bus: EventBus,
    _value: PhantomData<fn() -> T>,
}

impl<T: SyncValue> SyncChannel<T> {
    pub fn new(key: ChannelKey, store: Rc<dyn Store>, bus: EventBus) -> Self {
        Self {
            key,
            store,
            bus,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> &ChannelKey {
        &self.key
    }

    /// Reads the persisted value.
    ///
    /// Absent, unreadable and malformed values all yield `None`.
    pub fn load(&self) -> Option<T> {
        match self.store.get(&self.key.storage_key) {
            Ok(Some(raw)) => {
                let value = T::decode(&raw);
                if value.is_none() {
                    tracing::debug!(key = %self.key.storage_key, %raw, "ignoring malformed persisted value");
                }
                value
            }
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(key = %self.key.storage_key, error = %err, "persisted value unavailable");
                None
            }
        }
    }

    /// Persists `value`, then broadcasts it to this context.
    ///
    /// A failed write is absorbed: the broadcast still happens and the change
    /// stays visible within this context.
    pub fn publish(&self, value: &T) {
        let raw = value.encode();
        if let Err(err) = self.store.set(&self.key.storage_key, &raw) {
            tracing::debug!(key = %self.key.storage_key, error = %err, "persisting failed, syncing in-context only");
        }
        self.bus.dispatch(&SyncEvent::new(self.key.event.clone(), raw));
    }

    /// Calls `on_change` for every inbound value: broadcasts on this
    /// context's bus and writes reported by the store from other contexts.
    ///
    /// The returned handle removes both registrations.
    pub fn subscribe(&self, on_change: impl Fn(T) + 'static) -> Subscription {
        let on_change: Rc<dyn Fn(T)> = Rc::new(on_change);

        let event = self.key.event.clone();
        let from_bus = Rc::clone(&on_change);
        let bus_sub = self.bus.listen(move |sync: &SyncEvent| {
            if sync.name != event {
                return;
            }
            if let Some(value) = sync.detail.as_deref().and_then(T::decode) {
                tracing::trace!(event = %event, "in-context change received");
                from_bus(value);
            }
        });

        let storage_key = self.key.storage_key.clone();
        let store_sub = self.store.subscribe(Rc::new(move |change: &StorageChange| {
            if change.key.as_deref() != Some(storage_key.as_str()) {
                return;
            }
            if let Some(value) = change.new_value.as_deref().and_then(T::decode) {
                tracing::trace!(key = %storage_key, "cross-context change received");
                on_change(value);
            }
        }));

        Subscription::join([bus_sub, store_sub])
    }
}

impl<T> std::fmt::Debug for SyncChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncChannel")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
