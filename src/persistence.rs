//! Key/value persistence of the active theme name.
//!
//! The kit stores one string (the active theme's name) under a configured key.
//! Two stores ship with the crate:
//!
//! - [`FileStorage`]: a JSON object on disk that outlives the process (`local`)
//! - [`MemoryStorage`]: a map that lives as long as the kit (`session`)
//!
//! Any other backend implements [`ThemeStorage`] and is handed to
//! [`ThemeKitBuilder::storage`](crate::ThemeKitBuilder::storage).
//!
//! Storage failures never fail a theme operation: the kit logs and moves on.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{PersistenceConfig, StorageKind};

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt storage file: {0}")]
    Format(#[from] serde_json::Error),

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string key/value store.
pub trait ThemeStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThemeStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.data.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object file.
///
/// The file is read on every `get` and rewritten on every `set`, so several
/// kits pointed at the same file see each other's writes. A missing file
/// reads as empty.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, data: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(data)?)?;
        Ok(())
    }
}

impl ThemeStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self.load()?;
        data.insert(key.to_string(), value.to_string());
        self.save(&data)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut data = self.load()?;
        if data.remove(key).is_some() {
            self.save(&data)?;
        }
        Ok(())
    }
}

/// Builds the store selected by configuration.
///
/// Returns `None` when persistence is disabled, or for
/// [`StorageKind::Custom`], which must be supplied by the caller.
///
/// [`StorageKind::Local`] without a `path` falls back to memory: there is no
/// default location, so unrelated applications never share a state file.
pub fn storage_for(config: &PersistenceConfig) -> Option<Box<dyn ThemeStorage>> {
    if !config.enabled {
        return None;
    }
    match config.storage {
        StorageKind::Local => match &config.path {
            Some(path) => Some(Box::new(FileStorage::new(path))),
            None => {
                tracing::warn!("local storage configured without a path; the active theme is kept in memory only");
                Some(Box::new(MemoryStorage::new()))
            }
        },
        StorageKind::Session => Some(Box::new(MemoryStorage::new())),
        StorageKind::Custom => {
            tracing::warn!("custom storage configured but none supplied; persistence disabled");
            None
        }
    }
}
