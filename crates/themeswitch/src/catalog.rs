//! Theme catalog: the embedding application's list of selectable themes.
//!
//! The catalog is reference data. The theme manager only reads an entry's
//! `name` (to find the current theme) and `fonts` (to load them); titles and
//! descriptions are for whatever renders the selector.
//!
//! Catalogs can be built in code or loaded from YAML/JSON:
//!
//! ```rust
//! use themeswitch::ThemeCatalog;
//!
//! let catalog = ThemeCatalog::from_yaml(r#"
//! - name: graphite
//!   title: Graphite
//!   fonts:
//!     - name: Inter
//!       weights: [400, 600]
//! - name: plain
//!   title: Plain
//! "#).unwrap();
//!
//! assert_eq!(catalog.get("graphite").unwrap().fonts[0].weights, vec![400, 600]);
//! assert!(catalog.get("plain").unwrap().fonts.is_empty());
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

/// A webfont a theme depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThemeFont {
    /// Font family name, e.g. `Open Sans`.
    pub name: String,
    /// Numeric weights to request. Empty means the family default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<u16>,
}

impl ThemeFont {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: Vec::new(),
        }
    }

    pub fn with_weights(mut self, weights: impl IntoIterator<Item = u16>) -> Self {
        self.weights = weights.into_iter().collect();
        self
    }
}

/// One selectable theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeEntry {
    /// Stable identifier, written to the document attribute.
    pub name: String,
    /// Display label.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fonts to load when the theme is active, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<ThemeFont>,
}

impl ThemeEntry {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: None,
            fonts: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_font(mut self, font: ThemeFont) -> Self {
        self.fonts.push(font);
        self
    }
}

/// Ordered list of [`ThemeEntry`]s.
///
/// Names are not validated or deduplicated; lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeCatalog {
    entries: Vec<ThemeEntry>,
}

impl ThemeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, returning the catalog for chaining.
    pub fn with_entry(mut self, entry: ThemeEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Parses a YAML sequence of entries.
    pub fn from_yaml(yaml: &str) -> Result<Self, DefinitionError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The themes bundled with the library.
    pub fn builtin() -> &'static ThemeCatalog {
        &BUILTIN
    }

    /// Looks up an entry by name.
    pub fn get(&self, name: &str) -> Option<&ThemeEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Display title for `name`, falling back to the name itself.
    pub fn title_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).map(|entry| entry.title.as_str()).unwrap_or(name)
    }

    pub fn entries(&self) -> &[ThemeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ThemeEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ThemeEntry> for ThemeCatalog {
    fn from_iter<I: IntoIterator<Item = ThemeEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ThemeCatalog {
    type Item = &'a ThemeEntry;
    type IntoIter = std::slice::Iter<'a, ThemeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

static BUILTIN: Lazy<ThemeCatalog> = Lazy::new(|| {
    fn entry(name: &str, title: &str, description: &str, fonts: &[&str]) -> ThemeEntry {
        fonts.iter().fold(
            ThemeEntry::new(name, title).with_description(description),
            |entry, font| entry.with_font(ThemeFont::new(*font)),
        )
    }

    [
        entry("default", "Default", "The default shadcn/ui theme", &[]),
        entry(
            "modern-minimal",
            "Modern Minimal",
            "A clean and modern minimalist theme",
            &["Inter", "JetBrains Mono", "Source Serif 4"],
        ),
        entry(
            "violet-bloom",
            "Violet Bloom",
            "A vibrant violet and purple palette",
            &["Plus Jakarta Sans", "IBM Plex Mono", "Lora"],
        ),
        entry("t3-chat", "T3 Chat", "Chat-inspired warm tones", &["Roboto"]),
        entry("twitter", "Twitter", "Classic Twitter blue theme", &["Open Sans"]),
        entry(
            "mocha-mousse",
            "Mocha Mousse",
            "Warm coffee-inspired browns",
            &["DM Sans"],
        ),
        entry(
            "bubblegum",
            "Bubblegum",
            "Playful pink and pastel colors",
            &["Poppins", "Fira Code", "Lora"],
        ),
        entry(
            "amethyst-haze",
            "Amethyst Haze",
            "Mystical purple haze",
            &["Geist", "Fira Code", "Lora"],
        ),
        entry(
            "graphite",
            "Graphite",
            "Sleek graphite gray tones",
            &["Inter", "Fira Code"],
        ),
        entry(
            "cosmic-night",
            "Cosmic Night",
            "Deep cosmic purple palette",
            &["Inter", "JetBrains Mono"],
        ),
        entry("mono", "Mono", "Pure monochrome design", &["Geist Mono"]),
        entry(
            "notebook",
            "Notebook",
            "Paper-like notebook aesthetic",
            &["Architects Daughter", "Fira Code"],
        ),
        entry(
            "doom-64",
            "Doom 64",
            "Retro gaming-inspired colors",
            &["Oxanium", "Source Code Pro"],
        ),
        entry(
            "catppuccin",
            "Catppuccin",
            "Pastel soothing color scheme",
            &["Montserrat", "Fira Code"],
        ),
        entry(
            "perpetuity",
            "Perpetuity",
            "Terminal-style teal theme",
            &["Source Code Pro"],
        ),
        entry(
            "tangerine",
            "Tangerine",
            "Warm tangerine orange accents",
            &["Inter", "JetBrains Mono", "Source Serif 4"],
        ),
    ]
    .into_iter()
    .collect()
});
