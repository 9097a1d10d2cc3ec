use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage is unavailable: {0}")]
    Unavailable(String),
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage holds invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session-scoped key/value storage (mockable for testing)
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Storage that lives only as long as the value itself
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStorage {
    items: HashMap<String, String>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let mut items = HashMap::new();
        items.insert(key.to_string(), value.to_string());
        Self { items }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Session storage backed by a JSON file holding a flat map of key to
/// string value, e.g. `{"org-toc-state": "{\"collapsed\":false,...}"}`.
///
/// Used by the command line tool to carry one browsing session's state
/// between invocations. Every write rewrites the whole file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSessionStorage {
    items: BTreeMap<String, String>,

    #[serde(skip)]
    file_path: Option<PathBuf>,
}

impl FileSessionStorage {
    /// Storage that is never written to disk
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Open the session file at `file_path`, or an ephemeral storage without
    /// one. A missing file starts empty. An unreadable or malformed one also
    /// starts empty, and the next write replaces it.
    pub fn load_or_ephemeral(file_path: Option<&str>) -> Self {
        let Some(path) = file_path else {
            return Self::ephemeral();
        };
        Self::load_from_file(path).unwrap_or_else(|e| {
            log::warn!("Starting a fresh session in {path}: {e}");
            Self {
                items: BTreeMap::new(),
                file_path: Some(PathBuf::from(path)),
            }
        })
    }

    pub fn load_from_file(file_path: &str) -> Result<Self, StorageError> {
        let path = PathBuf::from(file_path);
        let items = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            items,
            file_path: Some(path),
        })
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(path) = &self.file_path {
            fs::write(path, serde_json::to_string(self)?)?;
        }
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Storage that refuses every operation, like a sandboxed browsing context
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct UnavailableSessionStorage {
    pub attempted_writes: std::cell::RefCell<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl UnavailableSessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_attempted_writes(&self) -> Vec<String> {
        self.attempted_writes.borrow().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl SessionStorage for UnavailableSessionStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("access denied".to_string()))
    }

    fn set_item(&mut self, _key: &str, value: &str) -> Result<(), StorageError> {
        self.attempted_writes.borrow_mut().push(value.to_string());
        Err(StorageError::Unavailable("access denied".to_string()))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
