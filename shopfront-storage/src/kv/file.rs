//! Key-value store persisted as one JSON object on disk.
//!
//! Every operation reads the whole file and every write rewrites it. The
//! store holds a handful of small values (search history, preferences), so
//! this stays cheap and keeps the file human-readable. Writes go to a
//! sibling temp file that is then renamed over the store, so an
//! interrupted write leaves the previous contents intact.

use super::KeyValueStore;
use shopfront_core::{ShopfrontError, ShopfrontResult, StorageError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<FileStoreError> for ShopfrontError {
    fn from(e: FileStoreError) -> Self {
        let storage = match e {
            FileStoreError::Io(err) => StorageError::Unavailable {
                reason: err.to_string(),
            },
            FileStoreError::Serde(err) => StorageError::Serialization {
                reason: err.to_string(),
            },
        };
        ShopfrontError::Storage(storage)
    }
}

/// JSON-file-backed key-value store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, FileStoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), FileStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(values)?;
        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, contents)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn update<F>(&self, mutate: F) -> ShopfrontResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ShopfrontError::Storage(StorageError::LockPoisoned))?;
        let mut values = self.load()?;
        mutate(&mut values);
        self.save(&values)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> ShopfrontResult<Option<String>> {
        let values = self.load().map_err(|e| StorageError::ReadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ShopfrontResult<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> ShopfrontResult<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}
