//! OS color-scheme preference for desktop processes.

use std::cell::Cell;

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};

use crate::env::PreferenceSignal;
use crate::listeners::{Listener, ListenerSet, Subscription};
use crate::mode::ColorMode;

/// Function that reports the current OS color mode.
pub type ThemeDetector = fn() -> ColorMode;

/// [`PreferenceSignal`] backed by the OS setting.
///
/// Every [`prefers_dark`](PreferenceSignal::prefers_dark) call queries the OS.
/// The OS does not push changes, so call [`refresh`](SystemPreference::refresh)
/// periodically (or on window focus) to notify subscribers.
#[derive(Debug)]
pub struct SystemPreference {
    detector: ThemeDetector,
    last: Cell<ColorMode>,
    listeners: ListenerSet<bool>,
}

impl SystemPreference {
    /// Uses the `dark-light` crate to query the OS.
    pub fn new() -> Self {
        Self::with_detector(os_theme_detector)
    }

    /// Uses `detector` instead of the OS, e.g. to force a mode.
    pub fn with_detector(detector: ThemeDetector) -> Self {
        Self {
            detector,
            last: Cell::new(detector()),
            listeners: ListenerSet::new(),
        }
    }

    /// The color mode the OS reports now.
    pub fn detect(&self) -> ColorMode {
        (self.detector)()
    }

    /// Re-detects and notifies subscribers if the mode changed since the
    /// last refresh. Returns whether it changed.
    pub fn refresh(&self) -> bool {
        let current = self.detect();
        if self.last.replace(current) == current {
            return false;
        }
        tracing::debug!(mode = %current, "OS color mode changed");
        self.listeners.emit(&current.is_dark());
        true
    }
}

impl Default for SystemPreference {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceSignal for SystemPreference {
    fn prefers_dark(&self) -> bool {
        self.detect().is_dark()
    }

    fn subscribe(&self, listener: Listener<bool>) -> Subscription {
        self.listeners.add(listener)
    }
}

fn os_theme_detector() -> ColorMode {
    match detect_os_theme() {
        Ok(OsThemeMode::Dark) => ColorMode::Dark,
        Ok(_) => ColorMode::Light,
        Err(err) => {
            tracing::debug!(error = ?err, "OS color mode detection failed, assuming light");
            ColorMode::Light
        }
    }
}
