//! Switcher configuration: storage keys, event names, document hooks and
//! defaults.
//!
//! Every field has a default, so a configuration file only needs the values it
//! changes:
//!
//! ```rust
//! use themeswitch::{Mode, SwitcherConfig};
//!
//! let config = SwitcherConfig::from_yaml(r#"
//! mode_key: docs-mode
//! default_mode: dark
//! "#).unwrap();
//!
//! assert_eq!(config.mode_key, "docs-mode");
//! assert_eq!(config.default_mode, Mode::Dark);
//! assert_eq!(config.theme_key, "app-theme");
//! ```

use serde::{Deserialize, Serialize};

use crate::channel::ChannelKey;
use crate::error::DefinitionError;
use crate::mode::Mode;

pub const DEFAULT_MODE_KEY: &str = "app-theme-mode";
pub const DEFAULT_MODE_EVENT: &str = "theme-mode-change-event";
pub const DEFAULT_THEME_KEY: &str = "app-theme";
pub const DEFAULT_THEME_EVENT: &str = "theme-change-event";
pub const DEFAULT_DARK_CLASS: &str = "dark";
pub const DEFAULT_THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitcherConfig {
    /// Store key holding the mode.
    pub mode_key: String,
    /// Bus event name for mode changes.
    pub mode_event: String,
    /// Store key holding the theme.
    pub theme_key: String,
    /// Bus event name for theme changes.
    pub theme_event: String,
    /// Class toggled on the document root when the effective mode is dark.
    pub dark_class: String,
    /// Document root attribute carrying the theme name.
    pub theme_attribute: String,
    /// Mode used when nothing is persisted.
    pub default_mode: Mode,
    /// Theme used when nothing is persisted. Empty means unset.
    pub default_theme: String,
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            mode_key: DEFAULT_MODE_KEY.to_string(),
            mode_event: DEFAULT_MODE_EVENT.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
            theme_event: DEFAULT_THEME_EVENT.to_string(),
            dark_class: DEFAULT_DARK_CLASS.to_string(),
            theme_attribute: DEFAULT_THEME_ATTRIBUTE.to_string(),
            default_mode: Mode::System,
            default_theme: String::new(),
        }
    }
}

impl SwitcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, DefinitionError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_default_mode(mut self, mode: Mode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_default_theme(mut self, theme: impl Into<String>) -> Self {
        self.default_theme = theme.into();
        self
    }

    /// Uses `prefix` for both store keys and both event names, so several
    /// independent switchers can share one store.
    pub fn with_namespace(mut self, prefix: &str) -> Self {
        self.mode_key = format!("{prefix}-{DEFAULT_MODE_KEY}");
        self.mode_event = format!("{prefix}-{DEFAULT_MODE_EVENT}");
        self.theme_key = format!("{prefix}-{DEFAULT_THEME_KEY}");
        self.theme_event = format!("{prefix}-{DEFAULT_THEME_EVENT}");
        self
    }

    pub fn with_dark_class(mut self, class: impl Into<String>) -> Self {
        self.dark_class = class.into();
        self
    }

    pub fn with_theme_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.theme_attribute = attribute.into();
        self
    }

    pub fn mode_channel(&self) -> ChannelKey {
        ChannelKey::new(&self.mode_key, &self.mode_event)
    }

    pub fn theme_channel(&self) -> ChannelKey {
        ChannelKey::new(&self.theme_key, &self.theme_event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SwitcherConfig::default();
        assert_eq!(config.mode_key, "app-theme-mode");
        assert_eq!(config.theme_key, "app-theme");
        assert_eq!(config.dark_class, "dark");
        assert_eq!(config.theme_attribute, "data-theme");
        assert_eq!(config.default_mode, Mode::System);
        assert_eq!(config.default_theme, "");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = SwitcherConfig::from_yaml("{}").unwrap();
        assert_eq!(config, SwitcherConfig::default());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            SwitcherConfig::from_json(r#"{"default_theme": "mono", "dark_class": "theme-dark"}"#)
                .unwrap();
        assert_eq!(config.default_theme, "mono");
        assert_eq!(config.dark_class, "theme-dark");
        assert_eq!(config.mode_event, "theme-mode-change-event");
    }

    #[test]
    fn test_unknown_default_mode_is_rejected() {
        let result = SwitcherConfig::from_yaml("default_mode: sepia");
        assert!(result.is_err());
    }

    #[test]
    fn test_namespace_prefixes_keys_and_events() {
        let config = SwitcherConfig::new().with_namespace("docs");
        assert_eq!(config.mode_key, "docs-app-theme-mode");
        assert_eq!(config.theme_event, "docs-theme-change-event");
        assert_eq!(config.mode_channel().storage_key, "docs-app-theme-mode");
    }
}
