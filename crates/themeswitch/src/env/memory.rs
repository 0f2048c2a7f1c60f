//! In-memory store shared by simulated contexts.
//!
//! A [`MemoryBackend`] plays the role of an origin's storage area. Each
//! [`MemoryStore`] obtained from it is one context (a tab): writes land in the
//! shared map and are reported to every *other* context, the way browsers
//! deliver storage events.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{StorageChange, Store};
use crate::error::StoreError;
use crate::listeners::{Listener, ListenerSet, Subscription};

#[derive(Default)]
struct BackendState {
    values: HashMap<String, String>,
    next_context: u64,
    contexts: Vec<(u64, ListenerSet<StorageChange>)>,
}

/// Storage area shared by any number of [`MemoryStore`] contexts.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<BackendState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new context on this storage area.
    pub fn context(&self) -> MemoryStore {
        let listeners = ListenerSet::new();
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_context;
            state.next_context += 1;
            state.contexts.push((id, listeners.clone()));
            id
        };

        MemoryStore {
            id,
            backend: self.clone(),
            listeners,
            available: Cell::new(true),
        }
    }

    /// Raw value under `key`, bypassing any context.
    pub fn value(&self, key: &str) -> Option<String> {
        self.state.borrow().values.get(key).cloned()
    }

    /// Simulates a write from a context outside the simulation; every open
    /// context is notified.
    pub fn write_external(&self, key: &str, value: &str) {
        self.write(None, key, Some(value));
    }

    /// Simulates removal of `key` by an outside context.
    pub fn remove_external(&self, key: &str) {
        self.write(None, key, None);
    }

    /// Number of open contexts.
    pub fn context_count(&self) -> usize {
        self.state.borrow().contexts.len()
    }

    fn write(&self, origin: Option<u64>, key: &str, value: Option<&str>) {
        let targets: Vec<ListenerSet<StorageChange>> = {
            let mut state = self.state.borrow_mut();
            match value {
                Some(value) => {
                    state.values.insert(key.to_string(), value.to_string());
                }
                None => {
                    state.values.remove(key);
                }
            }
            state
                .contexts
                .iter()
                .filter(|(id, _)| Some(*id) != origin)
                .map(|(_, listeners)| listeners.clone())
                .collect()
        };

        let change = StorageChange {
            key: Some(key.to_string()),
            new_value: value.map(str::to_string),
        };
        for listeners in targets {
            listeners.emit(&change);
        }
    }

    fn close(&self, id: u64) {
        self.state
            .borrow_mut()
            .contexts
            .retain(|(context, _)| *context != id);
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryBackend")
            .field("values", &state.values)
            .field("contexts", &state.contexts.len())
            .finish()
    }
}

/// One context's view of a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryStore {
    id: u64,
    backend: MemoryBackend,
    listeners: ListenerSet<StorageChange>,
    available: Cell<bool>,
}

impl MemoryStore {
    /// A store with its own private backend.
    pub fn new() -> Self {
        MemoryBackend::new().context()
    }

    /// The storage area this context belongs to.
    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }

    /// Simulates storage becoming unavailable (or available again).
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if !self.available.get() {
            return Err(StoreError::Unavailable);
        }
        Ok(self.backend.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if !self.available.get() {
            return Err(StoreError::Unavailable);
        }
        self.backend.write(Some(self.id), key, Some(value));
        Ok(())
    }

    fn subscribe(&self, listener: Listener<StorageChange>) -> Subscription {
        self.listeners.add(listener)
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        self.backend.close(self.id);
    }
}
