//! Namespaced key-value preference storage.
//!
//! A namespace maps to one JSON object on disk. Entries are read once when the
//! store is opened and served from memory afterwards; every write is persisted
//! immediately.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Minimal key-value persistence API consumed by stores built on top of it.
pub trait KeyValueStore: Send + Sync {
    /// Raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Whether `key` has a value. Never deserializes anything.
    fn contains(&self, key: &str) -> bool;

    /// Insert or overwrite the value under `key`.
    fn put(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed store: `{dir}/{namespace}.json`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store for `namespace` inside `dir`.
    pub fn open(dir: &Path, namespace: &str) -> Result<Self, StorageError> {
        let path = dir.join(format!("{}.json", namespace));

        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| StorageError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)
                    .map_err(|e| StorageError::Corrupted(format!("{}: {}", path.display(), e)))?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!("Opened preference store {:?} ({} entries)", path, entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_err = |e: &dyn std::fmt::Display| StorageError::Write {
            path: self.path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(&e))?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| write_err(&e))?;

        // The visible file is always complete: write aside, then rename.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| write_err(&e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| write_err(&e))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        let previous = entries.insert(key.to_string(), value);
        if let Err(e) = self.persist(&entries) {
            // Keep memory consistent with disk.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// In-process store with no persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
