//! Host capabilities the managers are built on.
//!
//! Nothing in this crate touches a global. Persistent storage, the document
//! being themed, the OS color-scheme signal and font loading are all traits,
//! bundled into an [`Environment`] and handed to the managers at construction.
//!
//! Three families of implementations ship with the crate:
//!
//! - Degraded: [`UnavailableStore`], [`DetachedDocument`], [`FixedPreference`]
//!   and [`NoopFontLoader`], for contexts without storage or a document
//!   (e.g. pre-render). [`Environment::headless`] uses them.
//! - Test doubles in [`mock`]: in-memory stores shared between simulated
//!   contexts, a recording document, a switchable preference.
//! - Real backends: [`crate::native`] for desktop processes, and the
//!   `themeswitch-web` crate for browsers.

use std::rc::Rc;

use crate::bus::EventBus;
use crate::catalog::ThemeFont;
use crate::error::StoreError;
use crate::listeners::{Listener, Subscription};

mod memory;
pub mod mock;

pub use memory::{MemoryBackend, MemoryStore};

/// A write to a store made by another context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// Key that changed. `None` when the whole store was cleared.
    pub key: Option<String>,
    /// Value after the change. `None` when the key was removed.
    pub new_value: Option<String>,
}

impl StorageChange {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value: Some(value.into()),
        }
    }

    pub fn removed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value: None,
        }
    }
}

/// Durable key-value storage shared by every context of an origin.
pub trait Store {
    /// Reads the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`. Last write wins.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Registers a listener for writes made by *other* contexts.
    ///
    /// The context's own writes are not reported here; they travel over the
    /// [`EventBus`].
    fn subscribe(&self, listener: Listener<StorageChange>) -> Subscription;
}

/// The surface a choice is applied to (the document root in a browser).
pub trait DocumentTarget {
    /// Adds `class` when `enabled`, removes it otherwise.
    fn toggle_class(&self, class: &str, enabled: bool);

    /// Sets attribute `name` to `value`.
    fn set_attribute(&self, name: &str, value: &str);
}

/// The OS/browser "prefers dark" signal.
pub trait PreferenceSignal {
    /// Live read of the current preference.
    fn prefers_dark(&self) -> bool;

    /// Registers a listener called with the new value on every change.
    fn subscribe(&self, listener: Listener<bool>) -> Subscription;
}

/// Makes a theme font available to the document. Fire and forget.
pub trait FontLoader {
    fn load_font(&self, font: &ThemeFont);
}

/// Capabilities for one execution context.
#[derive(Clone)]
pub struct Environment {
    pub store: Rc<dyn Store>,
    pub bus: EventBus,
    pub document: Rc<dyn DocumentTarget>,
    pub preference: Rc<dyn PreferenceSignal>,
}

impl Environment {
    /// Bundles the given capabilities with a fresh [`EventBus`].
    pub fn new(
        store: Rc<dyn Store>,
        document: Rc<dyn DocumentTarget>,
        preference: Rc<dyn PreferenceSignal>,
    ) -> Self {
        Self {
            store,
            bus: EventBus::new(),
            document,
            preference,
        }
    }

    /// A context with no storage and no document.
    ///
    /// Managers fall back to their defaults, document calls are no-ops and
    /// `system` resolves to light.
    pub fn headless() -> Self {
        Self::new(
            Rc::new(UnavailableStore),
            Rc::new(DetachedDocument),
            Rc::new(FixedPreference::light()),
        )
    }

    /// Replaces the bus, e.g. to share one bus between environments that
    /// model the same context.
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

// === Degraded implementations ===

/// Store for contexts without durable storage. Every access fails with
/// [`StoreError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl Store for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn subscribe(&self, _listener: Listener<StorageChange>) -> Subscription {
        Subscription::noop()
    }
}

/// Document target for contexts without a document. Ignores every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedDocument;

impl DocumentTarget for DetachedDocument {
    fn toggle_class(&self, _class: &str, _enabled: bool) {}

    fn set_attribute(&self, _name: &str, _value: &str) {}
}

/// A preference that never changes.
#[derive(Debug, Clone, Copy)]
pub struct FixedPreference {
    dark: bool,
}

impl FixedPreference {
    pub fn light() -> Self {
        Self { dark: false }
    }

    pub fn dark() -> Self {
        Self { dark: true }
    }
}

impl PreferenceSignal for FixedPreference {
    fn prefers_dark(&self) -> bool {
        self.dark
    }

    fn subscribe(&self, _listener: Listener<bool>) -> Subscription {
        Subscription::noop()
    }
}

/// Font loader that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFontLoader;

impl FontLoader for NoopFontLoader {
    fn load_font(&self, _font: &ThemeFont) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_store_fails_every_access() {
        let store = UnavailableStore;
        assert!(matches!(store.get("k"), Err(StoreError::Unavailable)));
        assert!(matches!(store.set("k", "v"), Err(StoreError::Unavailable)));
    }

    #[test]
    fn fixed_preference_reports_its_value() {
        assert!(FixedPreference::dark().prefers_dark());
        assert!(!FixedPreference::light().prefers_dark());
    }

    #[test]
    fn headless_environment_prefers_light() {
        let env = Environment::headless();
        assert!(!env.preference.prefers_dark());
        assert!(env.store.get("anything").is_err());
    }

    #[test]
    fn with_bus_shares_listeners() {
        let bus = EventBus::new();
        let env = Environment::headless().with_bus(bus.clone());
        let _sub = env.bus.listen(|_| {});
        assert_eq!(bus.listener_count(), 1);
    }
}
