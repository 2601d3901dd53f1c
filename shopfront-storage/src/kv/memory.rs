//! In-memory key-value store.

use super::KeyValueStore;
use shopfront_core::{ShopfrontError, ShopfrontResult, StorageError};
use std::collections::HashMap;
use std::sync::RwLock;

/// Key-value store backed by a `HashMap` behind an `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> ShopfrontResult<usize> {
        let values = self
            .values
            .read()
            .map_err(|_| ShopfrontError::Storage(StorageError::LockPoisoned))?;
        Ok(values.len())
    }

    pub fn is_empty(&self) -> ShopfrontResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> ShopfrontResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| ShopfrontError::Storage(StorageError::LockPoisoned))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ShopfrontResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| ShopfrontError::Storage(StorageError::LockPoisoned))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ShopfrontResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| ShopfrontError::Storage(StorageError::LockPoisoned))?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn test_set_get_overwrite() {
        let store = InMemoryKeyValueStore::new();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let store = InMemoryKeyValueStore::with_entries([("a", "1")]);
        store.remove("b").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty().unwrap());
    }
}
