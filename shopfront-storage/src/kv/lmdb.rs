//! LMDB-backed key-value store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a memory-mapped
//! string store. Reads run in read transactions, writes in write
//! transactions that commit before returning.

use std::path::Path;

use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};
use shopfront_core::{ShopfrontError, ShopfrontResult, StorageError};

use super::KeyValueStore;

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for ShopfrontError {
    fn from(e: LmdbStoreError) -> Self {
        ShopfrontError::Storage(StorageError::Unavailable {
            reason: e.to_string(),
        })
    }
}

/// LMDB key-value store with a single unnamed string database.
///
/// # Example
///
/// ```ignore
/// use shopfront_storage::{KeyValueStore, LmdbKeyValueStore};
///
/// let store = LmdbKeyValueStore::new("/tmp/shopfront", 10)?;
/// store.set("searchHistory", r#"["shoes"]"#)?;
/// ```
pub struct LmdbKeyValueStore {
    env: Env,
    db: Database<Str, Str>,
}

impl LmdbKeyValueStore {
    /// Open (or create) a store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Str, Str> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(Self { env, db })
    }

    /// Number of stored keys.
    pub fn len(&self) -> ShopfrontResult<u64> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        let count = self
            .db
            .len(&rtxn)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        Ok(count)
    }

    pub fn is_empty(&self) -> ShopfrontResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for LmdbKeyValueStore {
    fn get(&self, key: &str) -> ShopfrontResult<Option<String>> {
        let rtxn = self.env.read_txn().map_err(|e| StorageError::ReadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let value = self
            .db
            .get(&rtxn, key)
            .map_err(|e| StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?
            .map(str::to_string);

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> ShopfrontResult<()> {
        let write_failed = |e: heed::Error| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let mut wtxn = self.env.write_txn().map_err(write_failed)?;
        self.db.put(&mut wtxn, key, value).map_err(write_failed)?;
        wtxn.commit().map_err(write_failed)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> ShopfrontResult<()> {
        let write_failed = |e: heed::Error| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };

        let mut wtxn = self.env.write_txn().map_err(write_failed)?;
        self.db.delete(&mut wtxn, key).map_err(write_failed)?;
        wtxn.commit().map_err(write_failed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbKeyValueStore, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let store =
            LmdbKeyValueStore::new(temp_dir.path(), 10).expect("store creation should succeed");
        (store, temp_dir)
    }

    #[test]
    fn test_new_store_is_empty() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.is_empty().expect("len should succeed"));
    }

    #[test]
    fn test_put_and_get() {
        let (store, _temp_dir) = create_test_store();
        store
            .set("searchHistory", r#"["bag","shoes"]"#)
            .expect("set should succeed");

        let value = store.get("searchHistory").expect("get should succeed");
        assert_eq!(value.as_deref(), Some(r#"["bag","shoes"]"#));
    }

    #[test]
    fn test_get_nonexistent() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.get("missing").expect("get should succeed"), None);
    }

    #[test]
    fn test_overwrite() {
        let (store, _temp_dir) = create_test_store();
        store.set("k", "first").expect("set should succeed");
        store.set("k", "second").expect("set should succeed");

        assert_eq!(store.get("k").expect("get should succeed").as_deref(), Some("second"));
        assert_eq!(store.len().expect("len should succeed"), 1);
    }

    #[test]
    fn test_remove() {
        let (store, _temp_dir) = create_test_store();
        store.set("k", "v").expect("set should succeed");
        store.remove("k").expect("remove should succeed");
        store.remove("k").expect("second remove should succeed");

        assert_eq!(store.get("k").expect("get should succeed"), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        {
            let store = LmdbKeyValueStore::new(temp_dir.path(), 10).expect("open should succeed");
            store.set("k", "durable").expect("set should succeed");
        }
        let store = LmdbKeyValueStore::new(temp_dir.path(), 10).expect("reopen should succeed");
        assert_eq!(store.get("k").expect("get should succeed").as_deref(), Some("durable"));
    }
}
