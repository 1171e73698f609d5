//! # Durable Per-Profile Storage
//!
//! A small string key-value seam standing in for per-browser local storage.
//! Records are JSON documents. Two backends ship with the crate:
//!
//! - [`MemoryStorage`] — process-local, with a switch to simulate an
//!   unavailable backend.
//! - [`DirectoryStorage`] — one `<key>.json` file per key under a profile
//!   directory.
//!
//! Backends may fail; callers in this crate treat every failure as
//! degraded persistence, never as a reason to stop the exhibition.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use exhibit_core::StorageError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Durable key-value storage keyed per browser profile.
pub trait StateStorage: Send + Sync {
    /// Read the raw value for `key`, `None` when absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value for `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON record.
pub fn read_json<T: DeserializeOwned>(
    storage: &dyn StateStorage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.read(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Serialization {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode and write a JSON record.
pub fn write_json<T: Serialize>(
    storage: &dyn StateStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;
    storage.write(key, &raw)
}

// ─── In-memory backend ───────────────────────────────────────────────

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a disabled or full backend. While unavailable every call
    /// fails and the stored entries are left untouched.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("memory storage disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.lock().remove(key);
        Ok(())
    }
}

// ─── Directory backend ───────────────────────────────────────────────

/// File-per-key storage rooted at a profile directory.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    /// Use `root` as the profile directory. It is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Unavailable(format!("invalid storage key {key:?}")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl StateStorage for DirectoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;
        // Write-then-rename so a crash mid-write never leaves a torn record.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip_and_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read("k").unwrap(), None);
        storage.write("k", "v").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_unavailable_fails_every_call() {
        let storage = MemoryStorage::new();
        storage.write("k", "v").unwrap();
        storage.set_unavailable(true);
        assert!(matches!(storage.read("k"), Err(StorageError::Unavailable(_))));
        assert!(storage.write("k", "w").is_err());
        assert!(storage.remove("k").is_err());
        storage.set_unavailable(false);
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_json_helpers() {
        let storage = MemoryStorage::new();
        write_json(&storage, "nums", &vec![1u32, 2, 3]).unwrap();
        let nums: Option<Vec<u32>> = read_json(&storage, "nums").unwrap();
        assert_eq!(nums, Some(vec![1, 2, 3]));

        storage.write("bad", "{not json").unwrap();
        let bad: Result<Option<Vec<u32>>, _> = read_json(&storage, "bad");
        assert!(matches!(bad, Err(StorageError::Serialization { .. })));
    }

    #[test]
    fn test_directory_storage_creates_profile_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirectoryStorage::new(dir.path().join("profile"));
        assert_eq!(storage.read("exhibition-state").unwrap(), None);

        storage.write("exhibition-state", "{}").unwrap();
        assert!(storage.root().join("exhibition-state.json").exists());
        assert_eq!(storage.read("exhibition-state").unwrap().as_deref(), Some("{}"));

        storage.remove("exhibition-state").unwrap();
        storage.remove("exhibition-state").unwrap();
        assert_eq!(storage.read("exhibition-state").unwrap(), None);
    }

    #[test]
    fn test_directory_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirectoryStorage::new(dir.path());
        assert!(storage.write("../escape", "x").is_err());
        assert!(storage.read("").is_err());
    }
}
