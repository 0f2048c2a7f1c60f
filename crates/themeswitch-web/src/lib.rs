//! Browser backends for `themeswitch`.
//!
//! | capability | browser API |
//! |---|---|
//! | [`Store`](themeswitch::Store) | `window.localStorage` + the `storage` event |
//! | [`PreferenceSignal`](themeswitch::PreferenceSignal) | `matchMedia("(prefers-color-scheme: dark)")` |
//! | [`DocumentTarget`](themeswitch::DocumentTarget) | `document.documentElement` class list and attributes |
//! | [`StylesheetHead`](themeswitch::StylesheetHead) | `<link rel="stylesheet">` in `document.head` |
//!
//! Everything here is compiled only for `wasm32`. Use [`browser_environment`]
//! to get an [`Environment`](themeswitch::Environment) that falls back to the
//! degraded implementations for any API the page does not provide.
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use themeswitch::{ModeManager, StylesheetFontLoader, SwitcherConfig, ThemeCatalog, ThemeManager};
//! use themeswitch_web::{browser_environment, LinkHead};
//!
//! let env = browser_environment();
//! let config = SwitcherConfig::default();
//! let mode = ModeManager::initialize(&env, &config);
//! let theme = ThemeManager::builder(&env, &config)
//!     .catalog(ThemeCatalog::builtin().clone())
//!     .font_loader(Rc::new(StylesheetFontLoader::new(LinkHead::new())))
//!     .initialize();
//! ```

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::{
    browser_environment, HtmlDocument, LinkHead, LocalStorageStore, MediaQueryPreference,
    PREFERS_DARK_QUERY,
};
