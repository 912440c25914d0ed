use crate::error::StoreResult;

/// Remote key-value store as seen by the property layer.
///
/// All implementations must satisfy these invariants:
/// - `get` on an absent key is `Ok(None)`; errors are reserved for real
///   failures (I/O, connection, invalid key).
/// - Values are opaque bytes. The store never interprets them.
/// - Each call is one round trip and is independent of every other call.
///   Nothing here provides cross-key atomicity.
pub trait RemoteStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Returns the backend's success indication.
    fn set(&self, key: &str, value: &[u8]) -> StoreResult<bool>;

    /// Delete `key`. Returns `true` if the key existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Check whether a value is stored under `key`.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Store several values.
    ///
    /// Default implementation calls `set()` for each entry and reports `true`
    /// only if every write succeeded. Backends may override for fewer round
    /// trips, but callers must not rely on all-or-nothing behavior.
    fn set_many(&self, entries: &[(String, Vec<u8>)]) -> StoreResult<bool> {
        let mut ok = true;
        for (key, value) in entries {
            ok &= self.set(key, value)?;
        }
        Ok(ok)
    }

    /// Delete several keys and return how many existed.
    ///
    /// Default implementation calls `delete()` for each key.
    fn delete_many(&self, keys: &[String]) -> StoreResult<usize> {
        let mut removed = 0;
        for key in keys {
            if self.delete(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl<S: RemoteStore + ?Sized> RemoteStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<bool> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        (**self).exists(key)
    }

    fn set_many(&self, entries: &[(String, Vec<u8>)]) -> StoreResult<bool> {
        (**self).set_many(entries)
    }

    fn delete_many(&self, keys: &[String]) -> StoreResult<usize> {
        (**self).delete_many(keys)
    }
}

/// Reject keys no backend can address.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(crate::error::StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
