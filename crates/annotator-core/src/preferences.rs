//! Persisted client preferences (panel layout, theme, feature-flag overrides).
//!
//! A flat string-keyed JSON object stored in `<data_dir>/preferences.json`.
//! A missing or unreadable file starts empty. Writes go to a temp file first
//! and are renamed into place; on failure the in-memory value is rolled back.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("Failed to write preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode preference: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Raw key-value persistence used by view models.
pub trait KeyValueStorage: Send + Sync {
    fn read(&self, key: &str) -> Option<Value>;
    fn write(&self, key: &str, value: Value) -> Result<(), PreferencesError>;
    fn delete(&self, key: &str) -> Result<bool, PreferencesError>;
}

pub struct Preferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl Preferences {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::load_from_file(&path).unwrap_or_default();
        debug!(path = %path.display(), keys = values.len(), "preferences loaded");
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Option<BTreeMap<String, Value>> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(values) => Some(values),
            Err(e) => {
                warn!(path = %path.display(), "ignoring corrupt preferences file: {}", e);
                None
            }
        }
    }

    fn save_to_file(&self, values: &BTreeMap<String, Value>) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        let temp_file = self.path.with_extension("json.tmp");
        fs::write(&temp_file, json)?;
        fs::rename(&temp_file, &self.path)?;
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.read(key)?;
        serde_json::from_value(value).ok()
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PreferencesError> {
        self.write(key, serde_json::to_value(value)?)
    }

    pub fn remove(&self, key: &str) -> Result<bool, PreferencesError> {
        self.delete(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.lock().keys().cloned().collect()
    }
}

impl KeyValueStorage for Preferences {
    fn read(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn write(&self, key: &str, value: Value) -> Result<(), PreferencesError> {
        let mut values = self.values.lock();
        let previous = values.insert(key.to_string(), value);
        if let Err(e) = self.save_to_file(&values) {
            // Rollback: restore original value
            match previous {
                Some(previous) => values.insert(key.to_string(), previous),
                None => values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, PreferencesError> {
        let mut values = self.values.lock();
        let Some(previous) = values.remove(key) else {
            return Ok(false);
        };
        if let Err(e) = self.save_to_file(&values) {
            values.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(true)
    }
}
