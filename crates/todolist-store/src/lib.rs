//! Key-value storage for todolist.
//!
//! A store holds string values under string keys and is accessed
//! synchronously. The task collection itself lives under a single key; see
//! [`TaskCollection`].

mod collection;
pub mod error;

pub use collection::{DEFAULT_KEY, LoadedTasks, TaskCollection};
pub use error::StoreError;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

/// Synchronous string key-value store.
pub trait KeyValueStore {
    /// Error type bubbled up from the backing store.
    type Error: Into<anyhow::Error>;

    /// Read the value under `key`, or `None` when absent.
    ///
    /// # Errors
    /// Returns a store-specific error when the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    /// Returns a store-specific error when the value cannot be persisted.
    fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error>;
}

/// Store that keeps values in memory for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Store backed by one JSON file holding an object of string values.
///
/// Every operation reads the whole file; every write replaces it atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Use `path` as the backing file. The file is created on first write.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing, treating as empty");
                return Ok(BTreeMap::new());
            }
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;

        let mut staged = NamedTempFile::new_in(dir).map_err(|err| StoreError::io(dir, err))?;
        serde_json::to_writer_pretty(&mut staged, map)?;
        staged
            .persist(&self.path)
            .map_err(|err| StoreError::io(&self.path, err.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error> {
        let mut map = self.read_map()?;
        map.insert(key.to_owned(), value);
        self.write_map(&map)?;
        debug!(path = %self.path.display(), key, "store written");
        Ok(())
    }
}
