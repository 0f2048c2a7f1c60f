//! Test doubles for the host capabilities.
//!
//! These let the managers be driven entirely by direct calls, outside any
//! browser or UI framework, with every side effect observable.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use super::{DocumentTarget, FontLoader, PreferenceSignal};
use crate::catalog::ThemeFont;
use crate::fonts::StylesheetHead;
use crate::listeners::{Listener, ListenerSet, Subscription};

/// Document target that records its state and counts mutations.
#[derive(Debug, Default)]
pub struct MockDocument {
    classes: RefCell<BTreeSet<String>>,
    attributes: RefCell<BTreeMap<String, String>>,
    mutations: Cell<usize>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    /// Number of calls received, including ones that changed nothing.
    pub fn mutation_count(&self) -> usize {
        self.mutations.get()
    }

    /// The current classes and attributes, for whole-state comparisons.
    pub fn snapshot(&self) -> (BTreeSet<String>, BTreeMap<String, String>) {
        (self.classes.borrow().clone(), self.attributes.borrow().clone())
    }

    fn touch(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

impl DocumentTarget for MockDocument {
    fn toggle_class(&self, class: &str, enabled: bool) {
        self.touch();
        let mut classes = self.classes.borrow_mut();
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.touch();
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }
}

/// Preference signal whose value the test controls.
#[derive(Debug, Default)]
pub struct MockPreference {
    dark: Cell<bool>,
    listeners: ListenerSet<bool>,
}

impl MockPreference {
    pub fn light() -> Self {
        Self::default()
    }

    pub fn dark() -> Self {
        let preference = Self::default();
        preference.dark.set(true);
        preference
    }

    /// Changes the simulated preference, notifying listeners if it differs.
    pub fn set_prefers_dark(&self, dark: bool) {
        if self.dark.replace(dark) != dark {
            self.listeners.emit(&dark);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl PreferenceSignal for MockPreference {
    fn prefers_dark(&self) -> bool {
        self.dark.get()
    }

    fn subscribe(&self, listener: Listener<bool>) -> Subscription {
        self.listeners.add(listener)
    }
}

/// Font loader that records every request.
#[derive(Debug, Default)]
pub struct RecordingFontLoader {
    requests: RefCell<Vec<ThemeFont>>,
}

impl RecordingFontLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<ThemeFont> {
        self.requests.borrow().clone()
    }

    /// How many times `family` was requested.
    pub fn count(&self, family: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|font| font.name == family)
            .count()
    }
}

impl FontLoader for RecordingFontLoader {
    fn load_font(&self, font: &ThemeFont) {
        self.requests.borrow_mut().push(font.clone());
    }
}

/// Stylesheet head that keeps its links in a list.
#[derive(Debug, Default, Clone)]
pub struct MockHead {
    links: Rc<RefCell<Vec<String>>>,
}

impl MockHead {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> Vec<String> {
        self.links.borrow().clone()
    }
}

impl StylesheetHead for MockHead {
    fn has_stylesheet(&self, href: &str) -> bool {
        self.links.borrow().iter().any(|link| link == href)
    }

    fn append_stylesheet(&self, href: &str) {
        self.links.borrow_mut().push(href.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_document_tracks_classes_and_attributes() {
        let doc = MockDocument::new();
        doc.toggle_class("dark", true);
        doc.set_attribute("data-theme", "mono");
        assert!(doc.has_class("dark"));
        assert_eq!(doc.attribute("data-theme"), Some("mono".to_string()));

        doc.toggle_class("dark", false);
        assert!(!doc.has_class("dark"));
        assert_eq!(doc.mutation_count(), 3);
    }

    #[test]
    fn mock_preference_notifies_on_change_only() {
        let pref = MockPreference::light();
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let _sub = pref.subscribe(Rc::new(move |_: &bool| seen.set(seen.get() + 1)));

        pref.set_prefers_dark(false);
        assert_eq!(hits.get(), 0);

        pref.set_prefers_dark(true);
        assert_eq!(hits.get(), 1);
        assert!(pref.prefers_dark());
    }

    #[test]
    fn recording_font_loader_counts_by_family() {
        let loader = RecordingFontLoader::new();
        loader.load_font(&ThemeFont::new("Inter"));
        loader.load_font(&ThemeFont::new("Lora"));
        loader.load_font(&ThemeFont::new("Inter"));
        assert_eq!(loader.count("Inter"), 2);
        assert_eq!(loader.requests().len(), 3);
    }
}
