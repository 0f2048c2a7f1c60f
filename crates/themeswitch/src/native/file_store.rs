//! File-backed store for desktop processes.
//!
//! Preferences live in one JSON object of string keys to string values.
//! Several processes may share the file; each keeps a snapshot of what it last
//! saw, and [`FileStore::sync`] compares the file against it to report writes
//! made by the others, the same way a browser reports storage events.
//!
//! Writes take an exclusive lock on a `<file>.lock` sibling for the whole
//! read-modify-write, so processes writing different keys never drop each
//! other's values.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::env::{StorageChange, Store};
use crate::error::StoreError;
use crate::listeners::{Listener, ListenerSet, Subscription};

/// File name used by [`FileStore::in_config_dir`].
pub const PREFERENCES_FILE: &str = "preferences.json";

type Entries = BTreeMap<String, String>;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    seen: RefCell<Entries>,
    listeners: ListenerSet<StorageChange>,
}

impl FileStore {
    /// Opens (without creating) the store at `path`. A missing file is an
    /// empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let seen = read_entries(&path)?;
        Ok(Self {
            path,
            seen: RefCell::new(seen),
            listeners: ListenerSet::new(),
        })
    }

    /// Opens `<config dir>/<app>/preferences.json`.
    ///
    /// Fails with [`StoreError::Unavailable`] when the platform has no user
    /// config directory.
    pub fn in_config_dir(app: &str) -> Result<Self, StoreError> {
        let dir = dirs::config_dir().ok_or(StoreError::Unavailable)?;
        Self::open(dir.join(app).join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file and reports every key that changed since the last
    /// look to the subscribers. Returns the number of changes.
    pub fn sync(&self) -> Result<usize, StoreError> {
        let current = read_entries(&self.path)?;
        let changes = {
            let seen = self.seen.borrow();
            let mut changes: Vec<StorageChange> = current
                .iter()
                .filter(|(key, value)| seen.get(*key) != Some(*value))
                .map(|(key, value)| StorageChange::set(key.clone(), value.clone()))
                .collect();
            changes.extend(
                seen.keys()
                    .filter(|key| !current.contains_key(*key))
                    .map(|key| StorageChange::removed(key.clone())),
            );
            changes
        };
        *self.seen.borrow_mut() = current;

        for change in &changes {
            self.listeners.emit(change);
        }
        if !changes.is_empty() {
            tracing::debug!(path = %self.path.display(), changes = changes.len(), "external preference changes");
        }
        Ok(changes.len())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(read_entries(&self.path)?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _lock = lock_exclusive(&self.path)?;
        let mut entries = read_entries(&self.path)?;
        entries.insert(key.to_string(), value.to_string());
        write_entries(&self.path, &entries)?;
        self.seen
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn subscribe(&self, listener: Listener<StorageChange>) -> Subscription {
        self.listeners.add(listener)
    }
}

fn read_entries(path: &Path) -> Result<Entries, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
        Err(err) => return Err(StoreError::io(path, err)),
    };
    if content.trim().is_empty() {
        return Ok(Entries::new());
    }
    serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Blocks until this process holds the write lock for `path`. Released when
/// the returned file is dropped.
fn lock_exclusive(path: &Path) -> Result<File, StoreError> {
    let parent = parent_dir(path);
    fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
    let lock_path = lock_path(path);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|err| StoreError::io(&lock_path, err))?;
    file.lock().map_err(|err| StoreError::io(&lock_path, err))?;
    Ok(file)
}

/// Writes through a uniquely named temp file in the same directory and a
/// rename, so readers never see a partial file.
fn write_entries(path: &Path, entries: &Entries) -> Result<(), StoreError> {
    let parent = parent_dir(path);
    let content = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    let mut tmp = NamedTempFile::new_in(parent).map_err(|err| StoreError::io(parent, err))?;
    tmp.write_all(content.as_bytes())
        .map_err(|err| StoreError::io(tmp.path(), err))?;
    tmp.persist(path)
        .map(|_| ())
        .map_err(|err| StoreError::io(path, err.error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn recorder(store: &FileStore) -> (Rc<RefCell<Vec<StorageChange>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let sub = store.subscribe(Rc::new(move |change: &StorageChange| {
            sink.borrow_mut().push(change.clone())
        }));
        (log, sub)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("prefs.json")).unwrap();
        assert_eq!(store.get("app-theme").unwrap(), None);
    }

    #[test]
    fn test_set_creates_parent_dirs_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let store = FileStore::open(&path).unwrap();

        store.set("app-theme-mode", "dark").unwrap();
        store.set("app-theme", "mono").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("app-theme-mode").unwrap(), Some("dark".to_string()));
        assert_eq!(reopened.get("app-theme").unwrap(), Some("mono".to_string()));
        let mut names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["prefs.json", "prefs.json.lock"]);
    }

    #[test]
    fn test_sync_reports_other_process_writes_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        let mine = FileStore::open(&path).unwrap();
        let theirs = FileStore::open(&path).unwrap();
        let (seen, _sub) = recorder(&mine);

        mine.set("app-theme", "mono").unwrap();
        assert_eq!(mine.sync().unwrap(), 0);

        theirs.set("app-theme-mode", "dark").unwrap();
        assert_eq!(mine.sync().unwrap(), 1);
        assert_eq!(
            *seen.borrow(),
            vec![StorageChange::set("app-theme-mode", "dark")]
        );

        assert_eq!(mine.sync().unwrap(), 0);
    }

    #[test]
    fn test_sync_reports_removed_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        let store = FileStore::open(&path).unwrap();
        store.set("app-theme", "mono").unwrap();
        let (seen, _sub) = recorder(&store);

        fs::write(&path, "{}").unwrap();
        store.sync().unwrap();

        assert_eq!(*seen.borrow(), vec![StorageChange::removed("app-theme")]);
    }

    #[test]
    fn test_writers_on_different_keys_keep_each_others_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");

        let writers: Vec<_> = [("app-theme-mode", "mode"), ("app-theme", "theme")]
            .into_iter()
            .map(|(key, prefix)| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = FileStore::open(&path).unwrap();
                    let mut lost = 0;
                    for i in 0..200 {
                        let value = format!("{prefix}-{i}");
                        store.set(key, &value).unwrap();
                        if store.get(key).unwrap().as_deref() != Some(value.as_str()) {
                            lost += 1;
                        }
                    }
                    lost
                })
            })
            .collect();

        for writer in writers {
            assert_eq!(writer.join().unwrap(), 0);
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("app-theme-mode").unwrap(), Some("mode-199".to_string()));
        assert_eq!(store.get("app-theme").unwrap(), Some("theme-199".to_string()));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Malformed { .. })
        ));
    }
}
