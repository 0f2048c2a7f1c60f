//! Light/dark/system mode.
//!
//! [`Mode`] is the user's choice; [`ColorMode`] is what it resolves to once
//! the OS preference has been consulted. Resolution is never cached: the OS
//! preference can flip at any time, so every call reads it live.
//!
//! [`ModeManager`] owns one mode value for one context. It persists and
//! broadcasts changes through a [`SyncChannel`], follows changes made
//! elsewhere, and re-applies when the OS preference changes while the mode is
//! `system`.
//!
//! ```rust
//! use std::rc::Rc;
//! use themeswitch::mock::{MockDocument, MockPreference};
//! use themeswitch::{ColorMode, Environment, MemoryStore, Mode, ModeManager, SwitcherConfig};
//!
//! let document = Rc::new(MockDocument::new());
//! let preference = Rc::new(MockPreference::dark());
//! let env = Environment::new(Rc::new(MemoryStore::new()), document.clone(), preference.clone());
//!
//! let manager = ModeManager::initialize(&env, &SwitcherConfig::default());
//! assert_eq!(manager.mode(), Mode::System);
//! assert_eq!(manager.effective_mode(), ColorMode::Dark);
//! assert!(document.has_class("dark"));
//!
//! manager.set_mode(Mode::Light);
//! assert!(!document.has_class("dark"));
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::channel::{SyncChannel, SyncValue};
use crate::config::SwitcherConfig;
use crate::env::{DocumentTarget, Environment, PreferenceSignal};
use crate::error::ParseModeError;
use crate::listeners::{ListenerSet, Subscription};

/// The user's mode choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Light,
    Dark,
    /// Follow the OS preference.
    #[default]
    System,
}

impl Mode {
    /// All modes, in selector order.
    pub const ALL: [Mode; 3] = [Mode::Light, Mode::Dark, Mode::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Light => "light",
            Mode::Dark => "dark",
            Mode::System => "system",
        }
    }

    /// Display label for selectors.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Light => "Light",
            Mode::Dark => "Dark",
            Mode::System => "System",
        }
    }

    /// Shorthand for [`resolve_effective`].
    pub fn resolve(self, preference: &dyn PreferenceSignal) -> ColorMode {
        resolve_effective(self, preference)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Mode::Light),
            "dark" => Ok(Mode::Dark),
            "system" => Ok(Mode::System),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

impl SyncValue for Mode {
    fn encode(&self) -> String {
        self.as_str().to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

/// The effective, binary color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Light mode (light background, dark text).
    Light,
    /// Dark mode (dark background, light text).
    Dark,
}

impl ColorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }

    pub fn is_dark(self) -> bool {
        self == ColorMode::Dark
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ColorMode> for Mode {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Light => Mode::Light,
            ColorMode::Dark => Mode::Dark,
        }
    }
}

/// Resolves `mode` to a [`ColorMode`].
///
/// `Light` and `Dark` resolve to themselves; `System` reads the preference
/// at call time.
pub fn resolve_effective(mode: Mode, preference: &dyn PreferenceSignal) -> ColorMode {
    match mode {
        Mode::Light => ColorMode::Light,
        Mode::Dark => ColorMode::Dark,
        Mode::System => {
            if preference.prefers_dark() {
                ColorMode::Dark
            } else {
                ColorMode::Light
            }
        }
    }
}

/// Applies `mode` to `document` by toggling `dark_class` to match the
/// effective mode. Idempotent.
pub fn apply_mode(
    document: &dyn DocumentTarget,
    preference: &dyn PreferenceSignal,
    dark_class: &str,
    mode: Mode,
) -> ColorMode {
    let effective = resolve_effective(mode, preference);
    tracing::trace!(%mode, %effective, "applying mode");
    document.toggle_class(dark_class, effective.is_dark());
    effective
}

struct ModeState {
    mode: Cell<Mode>,
    channel: SyncChannel<Mode>,
    document: Rc<dyn DocumentTarget>,
    preference: Rc<dyn PreferenceSignal>,
    dark_class: String,
    observers: ListenerSet<Mode>,
}

impl ModeState {
    fn apply(&self, mode: Mode) -> ColorMode {
        apply_mode(&*self.document, &*self.preference, &self.dark_class, mode)
    }

    /// Adopts `mode` and applies it, without publishing.
    fn adopt(&self, mode: Mode) {
        let changed = self.mode.replace(mode) != mode;
        self.apply(mode);
        if changed {
            self.observers.emit(&mode);
        }
    }
}

/// Owns the mode of one context while mounted.
///
/// Dropping the manager (or calling [`unmount`](ModeManager::unmount))
/// detaches its preference, bus and store listeners.
pub struct ModeManager {
    state: Rc<ModeState>,
    subscriptions: Vec<Subscription>,
}

impl ModeManager {
    /// Mounts a manager: reads the persisted mode (falling back to
    /// `config.default_mode`), applies it, and starts listening.
    pub fn initialize(env: &Environment, config: &SwitcherConfig) -> Self {
        let channel: SyncChannel<Mode> =
            SyncChannel::new(config.mode_channel(), Rc::clone(&env.store), env.bus.clone());
        let initial = channel.load().unwrap_or(config.default_mode);
        tracing::debug!(mode = %initial, "mode manager mounted");

        let state = Rc::new(ModeState {
            mode: Cell::new(initial),
            channel,
            document: Rc::clone(&env.document),
            preference: Rc::clone(&env.preference),
            dark_class: config.dark_class.clone(),
            observers: ListenerSet::new(),
        });
        state.apply(initial);

        let weak: Weak<ModeState> = Rc::downgrade(&state);
        let preference_sub = env.preference.subscribe(Rc::new(move |_: &bool| {
            if let Some(state) = weak.upgrade() {
                if state.mode.get() == Mode::System {
                    state.apply(Mode::System);
                }
            }
        }));

        let weak: Weak<ModeState> = Rc::downgrade(&state);
        let sync_sub = state.channel.subscribe(move |mode: Mode| {
            if let Some(state) = weak.upgrade() {
                state.adopt(mode);
            }
        });

        Self {
            state,
            subscriptions: vec![preference_sub, sync_sub],
        }
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.state.mode.get()
    }

    /// The current mode resolved against the live OS preference.
    pub fn effective_mode(&self) -> ColorMode {
        resolve_effective(self.state.mode.get(), &*self.state.preference)
    }

    /// Changes the mode: applies it, notifies observers, persists it and
    /// broadcasts it, all before returning.
    pub fn set_mode(&self, mode: Mode) {
        self.state.adopt(mode);
        self.state.channel.publish(&mode);
    }

    /// Applies `mode` to this manager's document without changing state.
    pub fn apply(&self, mode: Mode) -> ColorMode {
        self.state.apply(mode)
    }

    /// Registers `listener` for changes of this manager's mode, whether set
    /// locally or received from another consumer.
    pub fn on_change(&self, listener: impl Fn(Mode) + 'static) -> Subscription {
        self.state
            .observers
            .add(Rc::new(move |mode: &Mode| listener(*mode)))
    }

    /// Detaches all listeners.
    pub fn unmount(self) {
        tracing::debug!(mode = %self.mode(), "mode manager unmounted");
    }
}

impl fmt::Debug for ModeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeManager")
            .field("mode", &self.state.mode.get())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::mock::{MockDocument, MockPreference};
    use crate::env::{MemoryBackend, MemoryStore, Store};

    struct Fixture {
        env: Environment,
        store: Rc<MemoryStore>,
        document: Rc<MockDocument>,
        preference: Rc<MockPreference>,
    }

    fn fixture(preference: MockPreference) -> Fixture {
        let store = Rc::new(MemoryStore::new());
        let document = Rc::new(MockDocument::new());
        let preference = Rc::new(preference);
        let env = Environment::new(store.clone(), document.clone(), preference.clone());
        Fixture {
            env,
            store,
            document,
            preference,
        }
    }

    #[test]
    fn test_mode_parse_and_display() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
            assert_eq!(mode.to_string(), mode.as_str());
        }
        assert!("Dark".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_labels() {
        let labels: Vec<_> = Mode::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["Light", "Dark", "System"]);
    }

    #[test]
    fn test_mode_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::System).unwrap(), r#""system""#);
        let mode: Mode = serde_json::from_str(r#""dark""#).unwrap();
        assert_eq!(mode, Mode::Dark);
    }

    #[test]
    fn test_resolve_reads_preference_live() {
        let preference = MockPreference::light();
        assert_eq!(resolve_effective(Mode::System, &preference), ColorMode::Light);
        preference.set_prefers_dark(true);
        assert_eq!(resolve_effective(Mode::System, &preference), ColorMode::Dark);
        assert_eq!(Mode::Light.resolve(&preference), ColorMode::Light);
    }

    #[test]
    fn test_initialize_falls_back_to_default() {
        let f = fixture(MockPreference::light());
        let config = SwitcherConfig::default().with_default_mode(Mode::Dark);
        let manager = ModeManager::initialize(&f.env, &config);
        assert_eq!(manager.mode(), Mode::Dark);
        assert!(f.document.has_class("dark"));
    }

    #[test]
    fn test_initialize_ignores_malformed_persisted_value() {
        let f = fixture(MockPreference::light());
        f.store.set("app-theme-mode", "sepia").unwrap();
        let manager = ModeManager::initialize(&f.env, &SwitcherConfig::default());
        assert_eq!(manager.mode(), Mode::System);
    }

    #[test]
    fn test_set_mode_persists_and_applies() {
        let f = fixture(MockPreference::light());
        let manager = ModeManager::initialize(&f.env, &SwitcherConfig::default());

        manager.set_mode(Mode::Dark);

        assert_eq!(manager.mode(), Mode::Dark);
        assert!(f.document.has_class("dark"));
        assert_eq!(f.store.backend().value("app-theme-mode"), Some("dark".to_string()));
    }

    #[test]
    fn test_preference_change_reapplies_only_in_system_mode() {
        let f = fixture(MockPreference::light());
        let manager = ModeManager::initialize(&f.env, &SwitcherConfig::default());
        assert!(!f.document.has_class("dark"));

        f.preference.set_prefers_dark(true);
        assert!(f.document.has_class("dark"));

        manager.set_mode(Mode::Light);
        let before = f.document.mutation_count();
        f.preference.set_prefers_dark(false);
        f.preference.set_prefers_dark(true);
        assert_eq!(f.document.mutation_count(), before);
        assert!(!f.document.has_class("dark"));
    }

    #[test]
    fn test_on_change_fires_on_actual_changes() {
        let f = fixture(MockPreference::light());
        let manager = ModeManager::initialize(&f.env, &SwitcherConfig::default());
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = manager.on_change(move |mode| sink.borrow_mut().push(mode));

        manager.set_mode(Mode::Dark);
        manager.set_mode(Mode::Dark);
        f.store.backend().write_external("app-theme-mode", "light");

        assert_eq!(*seen.borrow(), vec![Mode::Dark, Mode::Light]);
    }

    #[test]
    fn test_observer_holding_another_observers_handle() {
        let f = fixture(MockPreference::light());
        let manager = ModeManager::initialize(&f.env, &SwitcherConfig::default());
        let inner = manager.on_change(|_| {});
        let outer = manager.on_change(move |_| {
            let _held = &inner;
        });

        manager.set_mode(Mode::Dark);
        drop(outer);
        manager.set_mode(Mode::Light);

        assert_eq!(manager.mode(), Mode::Light);
    }

    #[test]
    fn test_unmount_detaches_every_listener() {
        let backend = MemoryBackend::new();
        let store = Rc::new(backend.context());
        let preference = Rc::new(MockPreference::light());
        let env = Environment::new(store, Rc::new(MockDocument::new()), preference.clone());

        let manager = ModeManager::initialize(&env, &SwitcherConfig::default());
        assert_eq!(preference.listener_count(), 1);
        assert_eq!(env.bus.listener_count(), 1);

        manager.unmount();
        assert_eq!(preference.listener_count(), 0);
        assert_eq!(env.bus.listener_count(), 0);
    }
}
