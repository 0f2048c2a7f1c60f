//! Named theme selection.
//!
//! [`ThemeManager`] is the free-form counterpart of
//! [`ModeManager`](crate::ModeManager): one string value, no effective
//! resolution, no OS signal. The theme name is written to a document attribute
//! as-is; the manager never validates it. When the name matches a
//! [`ThemeCatalog`] entry that declares fonts, those fonts are handed to the
//! [`FontLoader`].
//!
//! ```rust
//! use std::rc::Rc;
//! use themeswitch::mock::{MockDocument, RecordingFontLoader};
//! use themeswitch::{
//!     Environment, FixedPreference, MemoryStore, SwitcherConfig, ThemeCatalog, ThemeManager,
//! };
//!
//! let document = Rc::new(MockDocument::new());
//! let fonts = Rc::new(RecordingFontLoader::new());
//! let env = Environment::new(
//!     Rc::new(MemoryStore::new()),
//!     document.clone(),
//!     Rc::new(FixedPreference::light()),
//! );
//!
//! let manager = ThemeManager::builder(&env, &SwitcherConfig::default())
//!     .catalog(ThemeCatalog::builtin().clone())
//!     .font_loader(fonts.clone())
//!     .initialize();
//!
//! manager.set_theme("twitter");
//! assert_eq!(document.attribute("data-theme").as_deref(), Some("twitter"));
//! assert_eq!(fonts.count("Open Sans"), 1);
//! assert_eq!(manager.title(), "Twitter");
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::catalog::{ThemeCatalog, ThemeEntry, ThemeFont};
use crate::channel::SyncChannel;
use crate::config::SwitcherConfig;
use crate::env::{DocumentTarget, Environment, FontLoader, NoopFontLoader};
use crate::listeners::{ListenerSet, Subscription};

/// Sets `attribute` on `document` to `theme`. Idempotent.
pub fn apply_theme(document: &dyn DocumentTarget, attribute: &str, theme: &str) {
    tracing::trace!(%theme, "applying theme");
    document.set_attribute(attribute, theme);
}

/// Hands every font in `fonts` to `loader`, in order.
pub fn apply_theme_fonts(loader: &dyn FontLoader, fonts: &[ThemeFont]) {
    for font in fonts {
        loader.load_font(font);
    }
}

struct ThemeState {
    theme: RefCell<String>,
    channel: SyncChannel<String>,
    document: Rc<dyn DocumentTarget>,
    attribute: String,
    catalog: Rc<ThemeCatalog>,
    fonts: Rc<dyn FontLoader>,
    /// Name of the catalog entry whose fonts were last loaded.
    fonts_for: RefCell<Option<String>>,
    observers: ListenerSet<String>,
}

impl ThemeState {
    fn apply(&self, theme: &str) {
        apply_theme(&*self.document, &self.attribute, theme);
    }

    /// Loads the fonts of the current entry if the entry changed since the
    /// last load.
    fn sync_fonts(&self) {
        let theme = self.theme.borrow().clone();
        let entry = self.catalog.get(&theme);
        let entry_name = entry.map(|entry| entry.name.clone());
        if *self.fonts_for.borrow() == entry_name {
            return;
        }
        *self.fonts_for.borrow_mut() = entry_name;

        match entry {
            Some(entry) if !entry.fonts.is_empty() => {
                tracing::debug!(theme = %entry.name, fonts = entry.fonts.len(), "loading theme fonts");
                apply_theme_fonts(&*self.fonts, &entry.fonts);
            }
            Some(_) => {}
            None => tracing::trace!(%theme, "theme not in catalog, skipping fonts"),
        }
    }

    /// Adopts `theme` and applies it, without publishing.
    fn adopt(&self, theme: &str) {
        let changed = *self.theme.borrow() != theme;
        if changed {
            *self.theme.borrow_mut() = theme.to_string();
        }
        self.apply(theme);
        self.sync_fonts();
        if changed {
            self.observers.emit(&theme.to_string());
        }
    }
}

/// Configures a [`ThemeManager`] before mounting it.
pub struct ThemeManagerBuilder<'a> {
    env: &'a Environment,
    config: &'a SwitcherConfig,
    catalog: Rc<ThemeCatalog>,
    fonts: Rc<dyn FontLoader>,
}

impl<'a> ThemeManagerBuilder<'a> {
    /// Catalog used to find the fonts of the active theme. Empty by default.
    pub fn catalog(mut self, catalog: impl Into<Rc<ThemeCatalog>>) -> Self {
        self.catalog = catalog.into();
        self
    }

    /// Loader for theme fonts. Does nothing by default.
    pub fn font_loader(mut self, fonts: Rc<dyn FontLoader>) -> Self {
        self.fonts = fonts;
        self
    }

    /// Mounts the manager: reads the persisted theme (falling back to
    /// `config.default_theme`), applies it, loads its fonts and starts
    /// listening.
    pub fn initialize(self) -> ThemeManager {
        let env = self.env;
        let channel: SyncChannel<String> =
            SyncChannel::new(self.config.theme_channel(), Rc::clone(&env.store), env.bus.clone());
        let initial = channel
            .load()
            .unwrap_or_else(|| self.config.default_theme.clone());
        tracing::debug!(theme = %initial, "theme manager mounted");

        let state = Rc::new(ThemeState {
            theme: RefCell::new(initial.clone()),
            channel,
            document: Rc::clone(&env.document),
            attribute: self.config.theme_attribute.clone(),
            catalog: self.catalog,
            fonts: self.fonts,
            fonts_for: RefCell::new(None),
            observers: ListenerSet::new(),
        });
        state.apply(&initial);
        state.sync_fonts();

        let weak: Weak<ThemeState> = Rc::downgrade(&state);
        let sync_sub = state.channel.subscribe(move |theme: String| {
            if let Some(state) = weak.upgrade() {
                state.adopt(&theme);
            }
        });

        ThemeManager {
            state,
            subscription: Some(sync_sub),
        }
    }
}

/// Owns the theme of one context while mounted.
pub struct ThemeManager {
    state: Rc<ThemeState>,
    subscription: Option<Subscription>,
}

impl ThemeManager {
    pub fn builder<'a>(env: &'a Environment, config: &'a SwitcherConfig) -> ThemeManagerBuilder<'a> {
        ThemeManagerBuilder {
            env,
            config,
            catalog: Rc::new(ThemeCatalog::new()),
            fonts: Rc::new(NoopFontLoader),
        }
    }

    /// Mounts a manager with an empty catalog and no font loading.
    pub fn initialize(env: &Environment, config: &SwitcherConfig) -> Self {
        Self::builder(env, config).initialize()
    }

    /// The current theme name. Empty means unset.
    pub fn theme(&self) -> String {
        self.state.theme.borrow().clone()
    }

    /// Catalog entry of the current theme, if any.
    pub fn entry(&self) -> Option<ThemeEntry> {
        let theme = self.state.theme.borrow();
        self.state.catalog.get(&theme).cloned()
    }

    /// Display title of the current theme, falling back to its name.
    pub fn title(&self) -> String {
        let theme = self.state.theme.borrow();
        self.state.catalog.title_for(&theme).to_string()
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.state.catalog
    }

    /// Changes the theme: applies it, loads its fonts, notifies observers,
    /// persists it and broadcasts it, all before returning.
    pub fn set_theme(&self, theme: impl Into<String>) {
        let theme = theme.into();
        self.state.adopt(&theme);
        self.state.channel.publish(&theme);
    }

    /// Applies `theme` to this manager's document without changing state.
    pub fn apply(&self, theme: &str) {
        self.state.apply(theme);
    }

    /// Registers `listener` for changes of this manager's theme.
    pub fn on_change(&self, listener: impl Fn(&str) + 'static) -> Subscription {
        self.state
            .observers
            .add(Rc::new(move |theme: &String| listener(theme)))
    }

    /// Detaches the sync listeners.
    pub fn unmount(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.detach();
        }
        tracing::debug!(theme = %self.theme(), "theme manager unmounted");
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("theme", &*self.state.theme.borrow())
            .field("mounted", &self.subscription.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::mock::{MockDocument, RecordingFontLoader};
    use crate::env::{FixedPreference, MemoryStore, Store};

    struct Fixture {
        env: Environment,
        store: Rc<MemoryStore>,
        document: Rc<MockDocument>,
        fonts: Rc<RecordingFontLoader>,
    }

    fn fixture() -> Fixture {
        let store = Rc::new(MemoryStore::new());
        let document = Rc::new(MockDocument::new());
        let env = Environment::new(
            store.clone(),
            document.clone(),
            Rc::new(FixedPreference::light()),
        );
        Fixture {
            env,
            store,
            document,
            fonts: Rc::new(RecordingFontLoader::new()),
        }
    }

    fn catalog() -> ThemeCatalog {
        ThemeCatalog::new()
            .with_entry(ThemeEntry::new("twitter", "Twitter").with_font(ThemeFont::new("Open Sans")))
            .with_entry(
                ThemeEntry::new("graphite", "Graphite")
                    .with_font(ThemeFont::new("Inter").with_weights([400, 600]))
                    .with_font(ThemeFont::new("Fira Code")),
            )
            .with_entry(ThemeEntry::new("plain", "Plain"))
    }

    fn mount(f: &Fixture, config: &SwitcherConfig) -> ThemeManager {
        ThemeManager::builder(&f.env, config)
            .catalog(catalog())
            .font_loader(f.fonts.clone())
            .initialize()
    }

    #[test]
    fn test_apply_theme_fonts_loads_each_font_in_order() {
        let loader = RecordingFontLoader::new();
        let fonts = [
            ThemeFont::new("Inter").with_weights([400, 600]),
            ThemeFont::new("Fira Code"),
        ];

        apply_theme_fonts(&loader, &fonts);
        apply_theme_fonts(&loader, &[]);

        assert_eq!(loader.requests(), fonts.to_vec());
    }

    #[test]
    fn test_initialize_defaults_to_unset() {
        let f = fixture();
        let manager = mount(&f, &SwitcherConfig::default());
        assert_eq!(manager.theme(), "");
        assert_eq!(f.document.attribute("data-theme"), Some(String::new()));
        assert!(f.fonts.requests().is_empty());
    }

    #[test]
    fn test_initialize_loads_fonts_of_persisted_theme() {
        let f = fixture();
        f.store.set("app-theme", "graphite").unwrap();
        let manager = mount(&f, &SwitcherConfig::default());

        assert_eq!(manager.theme(), "graphite");
        assert_eq!(
            f.fonts.requests(),
            vec![
                ThemeFont::new("Inter").with_weights([400, 600]),
                ThemeFont::new("Fira Code"),
            ]
        );
    }

    #[test]
    fn test_set_theme_loads_fonts_once_per_entry_change() {
        let f = fixture();
        let manager = mount(&f, &SwitcherConfig::default());

        manager.set_theme("twitter");
        manager.set_theme("twitter");
        assert_eq!(f.fonts.count("Open Sans"), 1);

        manager.set_theme("plain");
        manager.set_theme("twitter");
        assert_eq!(f.fonts.count("Open Sans"), 2);
    }

    #[test]
    fn test_custom_attribute_and_default() {
        let f = fixture();
        let config = SwitcherConfig::default()
            .with_theme_attribute("data-palette")
            .with_default_theme("plain");
        let manager = mount(&f, &config);
        assert_eq!(manager.title(), "Plain");
        assert_eq!(f.document.attribute("data-palette"), Some("plain".to_string()));
        assert_eq!(f.document.attribute("data-theme"), None);
    }

    #[test]
    fn test_entry_and_title_for_unknown_theme() {
        let f = fixture();
        let manager = mount(&f, &SwitcherConfig::default());
        manager.set_theme("custom");
        assert_eq!(manager.entry(), None);
        assert_eq!(manager.title(), "custom");
    }

    #[test]
    fn test_on_change_receives_names() {
        let f = fixture();
        let manager = mount(&f, &SwitcherConfig::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = manager.on_change(move |theme| sink.borrow_mut().push(theme.to_string()));

        manager.set_theme("plain");
        manager.set_theme("plain");
        f.store.backend().write_external("app-theme", "twitter");

        assert_eq!(*seen.borrow(), vec!["plain", "twitter"]);
        assert_eq!(f.fonts.count("Open Sans"), 1);
    }

    #[test]
    fn test_unmount_stops_following() {
        let f = fixture();
        let manager = mount(&f, &SwitcherConfig::default());
        manager.unmount();

        f.store.backend().write_external("app-theme", "twitter");
        assert_eq!(f.document.attribute("data-theme"), Some(String::new()));
        assert_eq!(f.env.bus.listener_count(), 0);
    }
}
