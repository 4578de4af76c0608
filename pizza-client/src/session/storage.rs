// pizza-client/src/session/storage.rs
// Session storage - key-value persistence (JSON file or memory)

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";
pub const USER_ID_KEY: &str = "userId";

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable key-value storage for session fields
///
/// Implementations must be synchronous: a call returns only after the
/// change is durable.
pub trait SessionStorage: Send + Sync + fmt::Debug {
    /// Read one field
    fn get(&self, key: &str) -> Result<Option<String>, SessionStorageError>;

    /// Write several fields in one operation
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), SessionStorageError>;

    /// Remove every field, not just the ones this crate writes
    fn clear(&self) -> Result<(), SessionStorageError>;
}

/// JSON file storage at `{dir}/session.json`
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Create a file storage under `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(SESSION_FILE),
        }
    }

    /// Storage file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a session file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionStorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionStorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write then rename so a crash never leaves a truncated session file
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), SessionStorageError> {
        // A corrupt file is replaced rather than blocking a fresh login
        let mut current = self.load().unwrap_or_else(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Replacing unreadable session file"
            );
            BTreeMap::new()
        });
        for (key, value) in entries {
            current.insert((*key).to_string(), value.clone());
        }
        self.save(&current)
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory storage (nothing survives the process)
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage, e.g. to simulate a previous run
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    /// Snapshot of all stored fields
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), SessionStorageError> {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
