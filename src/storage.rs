//! Two-tier key-value persistence for session credentials.
//!
//! SYSTEM CONTEXT
//! ==============
//! The persistent tier survives restarts ("remember me"); the session tier
//! lives only as long as the process. `TieredStore` is the single place that
//! knows about both, so the session manager never touches a tier directly.
//!
//! TRADE-OFFS
//! ==========
//! Writes are synchronous and failures are logged rather than returned: a
//! broken persistence file degrades to "not remembered", never to a failed
//! login. Reads do return errors, so hydration can tell an unreadable tier
//! apart from an empty one and discard it.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is not a JSON object of strings: {0}")]
    Format(#[from] serde_json::Error),
}

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the backing data exists but cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-lifetime store. Used as the session-scoped tier and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |e| e.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON-object file store. The whole file is rewritten on each mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut entries = self.load().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "replacing unreadable session store");
            BTreeMap::new()
        });
        f(&mut entries);
        self.save(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        }) {
            warn!(path = %self.path.display(), key, error = %e, "failed to write session store");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.update(|entries| {
            entries.remove(key);
        }) {
            warn!(path = %self.path.display(), key, error = %e, "failed to clear session store key");
        }
    }
}

// =============================================================================
// TIERED STORE
// =============================================================================

/// Persistent tier checked before the session tier; writes hit both.
#[derive(Clone)]
pub struct TieredStore {
    persistent: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl TieredStore {
    #[must_use]
    pub fn new(persistent: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { persistent, session }
    }

    /// Both tiers in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Persistent tier backed by a file at `path`, session tier in memory.
    #[must_use]
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(path)), Arc::new(MemoryStore::new()))
    }

    /// `key` from the persistent tier, falling back to the session tier.
    ///
    /// # Errors
    ///
    /// Returns an error if a tier that had to be consulted is unreadable.
    pub fn get_preferred(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.persistent.get(key)? {
            Some(value) => Ok(Some(value)),
            None => self.session.get(key),
        }
    }

    /// Both keys from a single tier: the persistent tier if it holds either
    /// key, otherwise the session tier. Values from different tiers are
    /// never combined.
    ///
    /// # Errors
    ///
    /// Returns an error if a tier that had to be consulted is unreadable.
    pub fn get_preferred_pair(
        &self,
        first: &str,
        second: &str,
    ) -> Result<(Option<String>, Option<String>), StorageError> {
        let remembered = (self.persistent.get(first)?, self.persistent.get(second)?);
        if remembered.0.is_some() || remembered.1.is_some() {
            return Ok(remembered);
        }
        Ok((self.session.get(first)?, self.session.get(second)?))
    }

    pub fn set_both(&self, key: &str, value: &str) {
        self.persistent.set(key, value);
        self.session.set(key, value);
    }

    pub fn clear_both(&self, key: &str) {
        self.persistent.remove(key);
        self.session.remove(key);
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
