//! Backends for native (non-browser) processes.
//!
//! - [`FileStore`]: preferences in a JSON file shared between processes
//! - [`SystemPreference`]: the OS dark mode setting via `dark-light`
//!
//! [`desktop_environment`] wires both up, degrading to
//! [`UnavailableStore`](crate::UnavailableStore) when the config directory
//! cannot be used.

mod file_store;
mod system;

use std::rc::Rc;

pub use file_store::{FileStore, PREFERENCES_FILE};
pub use system::{SystemPreference, ThemeDetector};

use crate::env::{DocumentTarget, Environment, Store, UnavailableStore};

/// Environment for a desktop application named `app`, applying choices to
/// `document`.
///
/// Returns the [`FileStore`] (if one could be opened) alongside the
/// environment so the caller can [`sync`](FileStore::sync) it, and the
/// [`SystemPreference`] so it can be refreshed.
pub fn desktop_environment(
    app: &str,
    document: Rc<dyn DocumentTarget>,
) -> (Environment, Option<Rc<FileStore>>, Rc<SystemPreference>) {
    let preference = Rc::new(SystemPreference::new());
    let file_store = match FileStore::in_config_dir(app) {
        Ok(store) => Some(Rc::new(store)),
        Err(err) => {
            tracing::debug!(error = %err, "preference file unavailable, changes will not persist");
            None
        }
    };
    let store: Rc<dyn Store> = match &file_store {
        Some(store) => Rc::clone(store) as Rc<dyn Store>,
        None => Rc::new(UnavailableStore),
    };
    let env = Environment::new(store, document, preference.clone());
    (env, file_store, preference)
}
