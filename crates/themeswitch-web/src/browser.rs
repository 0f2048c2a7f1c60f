use std::rc::Rc;

use js_sys::Function;
use themeswitch::{
    DetachedDocument, DocumentTarget, Environment, FixedPreference, Listener, PreferenceSignal,
    StorageChange, Store, StoreError, StylesheetHead, Subscription, UnavailableStore,
};
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlLinkElement, MediaQueryList, Storage, StorageEvent, Window};

/// Media query matched when the user prefers a dark color scheme.
pub const PREFERS_DARK_QUERY: &str = "(prefers-color-scheme: dark)";

fn backend_error(value: JsValue) -> StoreError {
    StoreError::Backend(format!("{value:?}"))
}

/// Registers `closure` for `event` on `target` and returns the handle that
/// removes it (and frees the closure).
fn listen<T: ?Sized + WasmClosure + 'static>(
    target: web_sys::EventTarget,
    event: &'static str,
    closure: Closure<T>,
) -> Subscription {
    let callback: &Function = closure.as_ref().unchecked_ref();
    if let Err(err) = target.add_event_listener_with_callback(event, callback) {
        tracing::debug!(event, error = ?err, "could not register listener");
        return Subscription::noop();
    }
    Subscription::new(move || {
        let callback: &Function = closure.as_ref().unchecked_ref();
        if let Err(err) = target.remove_event_listener_with_callback(event, callback) {
            tracing::debug!(event, error = ?err, "could not remove listener");
        }
    })
}

/// `window.localStorage`, with cross-tab changes from the `storage` event.
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    window: Window,
    storage: Storage,
}

impl LocalStorageStore {
    /// Returns `None` when there is no window or storage is blocked.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok().flatten()?;
        Some(Self { window, storage })
    }
}

impl Store for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(backend_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(backend_error)
    }

    fn subscribe(&self, listener: Listener<StorageChange>) -> Subscription {
        let closure = Closure::<dyn FnMut(StorageEvent)>::new(move |event: StorageEvent| {
            listener(&StorageChange {
                key: event.key(),
                new_value: event.new_value(),
            });
        });
        listen(self.window.clone().into(), "storage", closure)
    }
}

/// `matchMedia("(prefers-color-scheme: dark)")`.
#[derive(Debug, Clone)]
pub struct MediaQueryPreference {
    query: MediaQueryList,
}

impl MediaQueryPreference {
    /// Returns `None` when there is no window or the query is unsupported.
    pub fn new() -> Option<Self> {
        let query = web_sys::window()?
            .match_media(PREFERS_DARK_QUERY)
            .ok()
            .flatten()?;
        Some(Self { query })
    }
}

impl PreferenceSignal for MediaQueryPreference {
    fn prefers_dark(&self) -> bool {
        self.query.matches()
    }

    fn subscribe(&self, listener: Listener<bool>) -> Subscription {
        let query = self.query.clone();
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| {
            listener(&query.matches());
        });
        listen(self.query.clone().into(), "change", closure)
    }
}

/// `document.documentElement`.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    root: Element,
}

impl HtmlDocument {
    /// Returns `None` when there is no document (e.g. in a worker).
    pub fn new() -> Option<Self> {
        let root = web_sys::window()?.document()?.document_element()?;
        Some(Self { root })
    }
}

impl DocumentTarget for HtmlDocument {
    fn toggle_class(&self, class: &str, enabled: bool) {
        if let Err(err) = self.root.class_list().toggle_with_force(class, enabled) {
            tracing::debug!(class, error = ?err, "could not toggle class");
        }
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(err) = self.root.set_attribute(name, value) {
            tracing::debug!(name, error = ?err, "could not set attribute");
        }
    }
}

/// Stylesheet links in `document.head`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkHead;

impl LinkHead {
    pub fn new() -> Self {
        Self
    }
}

impl StylesheetHead for LinkHead {
    fn has_stylesheet(&self, href: &str) -> bool {
        let Some(head) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.head())
        else {
            return false;
        };
        let links = head.get_elements_by_tag_name("link");
        (0..links.length())
            .filter_map(|index| links.item(index))
            .filter_map(|element| element.dyn_into::<HtmlLinkElement>().ok())
            .any(|link| link.href() == href)
    }

    fn append_stylesheet(&self, href: &str) {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            return;
        };
        let Some(head) = document.head() else {
            return;
        };
        let link = match document.create_element("link") {
            Ok(link) => link,
            Err(err) => {
                tracing::debug!(error = ?err, "could not create link element");
                return;
            }
        };
        let linked = link
            .set_attribute("rel", "stylesheet")
            .and_then(|_| link.set_attribute("href", href))
            .and_then(|_| head.append_child(&link).map(|_| ()));
        if let Err(err) = linked {
            tracing::debug!(%href, error = ?err, "could not link stylesheet");
        }
    }
}

/// Environment for the current page.
///
/// Missing APIs fall back to [`UnavailableStore`], [`DetachedDocument`] and a
/// light [`FixedPreference`].
pub fn browser_environment() -> Environment {
    let store = match LocalStorageStore::new() {
        Some(store) => Rc::new(store) as Rc<dyn Store>,
        None => Rc::new(UnavailableStore),
    };
    let document = match HtmlDocument::new() {
        Some(document) => Rc::new(document) as Rc<dyn DocumentTarget>,
        None => Rc::new(DetachedDocument),
    };
    let preference = match MediaQueryPreference::new() {
        Some(preference) => Rc::new(preference) as Rc<dyn PreferenceSignal>,
        None => Rc::new(FixedPreference::light()),
    };
    Environment::new(store, document, preference)
}
