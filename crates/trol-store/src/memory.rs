use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_key, RemoteStore};

/// Round-trip counters for an [`InMemoryStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub gets: u64,
    pub sets: u64,
    pub deletes: u64,
    pub exists: u64,
}

#[derive(Debug, Default)]
struct Counters {
    gets: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    exists: AtomicU64,
}

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and embedding. Values are held behind a `RwLock` and
/// cloned on read. Every trait call bumps a counter so callers can observe
/// exactly how many round trips a property operation issued.
pub struct InMemoryStore {
    values: RwLock<HashMap<String, Vec<u8>>>,
    counters: Counters,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.read().expect("lock poisoned").is_empty()
    }

    /// Remove all keys from the store. Counters are kept.
    pub fn clear(&self) {
        self.values.write().expect("lock poisoned").clear();
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> Vec<String> {
        let map = self.values.read().expect("lock poisoned");
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Snapshot of the round-trip counters.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            gets: self.counters.gets.load(Ordering::Relaxed),
            sets: self.counters.sets.load(Ordering::Relaxed),
            deletes: self.counters.deletes.load(Ordering::Relaxed),
            exists: self.counters.exists.load(Ordering::Relaxed),
        }
    }

    fn read_map(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Vec<u8>>>> {
        self.values
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write_map(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Vec<u8>>>> {
        self.values
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for InMemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_key(key)?;
        self.counters.gets.fetch_add(1, Ordering::Relaxed);
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<bool> {
        validate_key(key)?;
        self.counters.sets.fetch_add(1, Ordering::Relaxed);
        self.write_map()?.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        self.counters.deletes.fetch_add(1, Ordering::Relaxed);
        Ok(self.write_map()?.remove(key).is_some())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        self.counters.exists.fetch_add(1, Ordering::Relaxed);
        Ok(self.read_map()?.contains_key(key))
    }

    fn set_many(&self, entries: &[(String, Vec<u8>)]) -> StoreResult<bool> {
        for (key, _) in entries {
            validate_key(key)?;
        }
        self.counters
            .sets
            .fetch_add(entries.len() as u64, Ordering::Relaxed);
        let mut map = self.write_map()?;
        for (key, value) in entries {
            map.insert(key.clone(), value.clone());
        }
        Ok(true)
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryStore")
            .field("key_count", &count)
            .field("stats", &self.stats())
            .finish()
    }
}
