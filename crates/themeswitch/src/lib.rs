//! # themeswitch - persisted, synchronized mode and theme switching
//!
//! `themeswitch` keeps two user choices in step across every place they are
//! displayed:
//!
//! - the **mode**: light, dark, or follow the OS ([`ModeManager`])
//! - the **theme**: a named palette, optionally with webfonts ([`ThemeManager`])
//!
//! Each choice is persisted in a key-value [`Store`], broadcast to other
//! consumers in the same context over an [`EventBus`], picked up by other
//! contexts through the store's change notifications, and applied to a
//! [`DocumentTarget`] (a class for dark mode, an attribute for the theme).
//!
//! ## Core Concepts
//!
//! - [`Environment`]: the injected host capabilities (store, bus, document, OS
//!   preference). Nothing in the crate reaches for a global.
//! - [`SyncChannel`]: typed publish/subscribe over one persisted key; the
//!   mechanism both managers are built on.
//! - [`Mode`] / [`ColorMode`]: the choice and what it resolves to.
//! - [`ThemeCatalog`]: the embedding application's list of themes and fonts.
//! - [`SwitcherConfig`]: storage keys, event names, document hooks, defaults.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use themeswitch::mock::{MockDocument, MockPreference};
//! use themeswitch::{Environment, MemoryBackend, Mode, ModeManager, SwitcherConfig};
//!
//! // Two tabs sharing one storage area.
//! let storage = MemoryBackend::new();
//! let doc_a = Rc::new(MockDocument::new());
//! let doc_b = Rc::new(MockDocument::new());
//! let tab_a = Environment::new(Rc::new(storage.context()), doc_a.clone(), Rc::new(MockPreference::light()));
//! let tab_b = Environment::new(Rc::new(storage.context()), doc_b.clone(), Rc::new(MockPreference::light()));
//!
//! let config = SwitcherConfig::default();
//! let a = ModeManager::initialize(&tab_a, &config);
//! let b = ModeManager::initialize(&tab_b, &config);
//!
//! a.set_mode(Mode::Dark);
//! assert_eq!(b.mode(), Mode::Dark);
//! assert!(doc_b.has_class("dark"));
//! ```
//!
//! ## Degraded Contexts
//!
//! Without storage or a document (pre-render, tests), use
//! [`Environment::headless`]: managers fall back to their configured defaults
//! and document calls become no-ops. No operation ever fails.
//!
//! ## Backends
//!
//! - [`native`]: JSON preference file and OS dark mode detection
//! - `themeswitch-web`: `localStorage`, `matchMedia` and the DOM, for wasm
//! - [`mock`]: in-memory doubles for tests

mod bus;
mod catalog;
mod channel;
mod config;
mod env;
mod error;
mod fonts;
mod listeners;
mod mode;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
mod theme;

pub use bus::{EventBus, SyncEvent};
pub use catalog::{ThemeCatalog, ThemeEntry, ThemeFont};
pub use channel::{ChannelKey, SyncChannel, SyncValue};
pub use config::{
    SwitcherConfig, DEFAULT_DARK_CLASS, DEFAULT_MODE_EVENT, DEFAULT_MODE_KEY,
    DEFAULT_THEME_ATTRIBUTE, DEFAULT_THEME_EVENT, DEFAULT_THEME_KEY,
};
pub use env::{
    mock, DetachedDocument, DocumentTarget, Environment, FixedPreference, FontLoader,
    MemoryBackend, MemoryStore, NoopFontLoader, PreferenceSignal, StorageChange, Store,
    UnavailableStore,
};
pub use error::{DefinitionError, ParseModeError, StoreError};
pub use fonts::{google_font_url, StylesheetFontLoader, StylesheetHead, GOOGLE_FONTS_CSS2};
pub use listeners::{Listener, ListenerSet, Subscription};
pub use mode::{apply_mode, resolve_effective, ColorMode, Mode, ModeManager};
pub use theme::{apply_theme, apply_theme_fonts, ThemeManager, ThemeManagerBuilder};

// Re-export mock types for testing
pub use env::mock::{MockDocument, MockHead, MockPreference, RecordingFontLoader};
