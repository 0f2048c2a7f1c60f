//! Webfont loading for theme fonts.
//!
//! [`StylesheetFontLoader`] turns a [`ThemeFont`] into a Google Fonts CSS2
//! stylesheet URL and makes sure the document links it exactly once. The
//! document side is abstracted as a [`StylesheetHead`].

use crate::catalog::ThemeFont;
use crate::env::FontLoader;

/// Base URL of the Google Fonts CSS2 API.
pub const GOOGLE_FONTS_CSS2: &str = "https://fonts.googleapis.com/css2";

/// Builds the stylesheet URL for `font`.
///
/// Whitespace in the family name becomes `+`; weights are listed in the
/// given order.
///
/// ```rust
/// use themeswitch::{google_font_url, ThemeFont};
///
/// assert_eq!(
///     google_font_url(&ThemeFont::new("Open Sans")),
///     "https://fonts.googleapis.com/css2?family=Open+Sans&display=swap",
/// );
/// assert_eq!(
///     google_font_url(&ThemeFont::new("Inter").with_weights([400, 700])),
///     "https://fonts.googleapis.com/css2?family=Inter:wght@400;700&display=swap",
/// );
/// ```
pub fn google_font_url(font: &ThemeFont) -> String {
    let family = font.name.split_whitespace().collect::<Vec<_>>().join("+");
    let weights = if font.weights.is_empty() {
        String::new()
    } else {
        let list: Vec<String> = font.weights.iter().map(u16::to_string).collect();
        format!(":wght@{}", list.join(";"))
    };
    format!("{GOOGLE_FONTS_CSS2}?family={family}{weights}&display=swap")
}

/// The part of a document that holds stylesheet links.
pub trait StylesheetHead {
    /// Returns true if a stylesheet with exactly this href is linked.
    fn has_stylesheet(&self, href: &str) -> bool;

    /// Links a stylesheet.
    fn append_stylesheet(&self, href: &str);
}

/// [`FontLoader`] that links Google Fonts stylesheets into a
/// [`StylesheetHead`], skipping ones already present.
#[derive(Debug, Clone, Default)]
pub struct StylesheetFontLoader<H> {
    head: H,
}

impl<H: StylesheetHead> StylesheetFontLoader<H> {
    pub fn new(head: H) -> Self {
        Self { head }
    }

    pub fn head(&self) -> &H {
        &self.head
    }
}

impl<H: StylesheetHead> FontLoader for StylesheetFontLoader<H> {
    fn load_font(&self, font: &ThemeFont) {
        let href = google_font_url(font);
        if self.head.has_stylesheet(&href) {
            tracing::trace!(%href, "font stylesheet already linked");
            return;
        }
        tracing::debug!(family = %font.name, %href, "linking font stylesheet");
        self.head.append_stylesheet(&href);
    }
}
