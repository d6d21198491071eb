//! SettingsBackend trait for abstracting settings persistence.
//!
//! Backends store raw key/value pairs. Normalization, defaults and change
//! detection live in the settings store that wraps a backend.

use serde_json::{Map, Value};
use std::fmt::Debug;
use thiserror::Error;

/// Raw persisted settings, keyed by wire name (`includeH1`, `maxDepth`, ...).
pub type SettingsMap = Map<String, Value>;

/// Error type for settings persistence operations.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Settings storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read settings from '{location}': {message}")]
    ReadFailed { location: String, message: String },

    #[error("Failed to write settings to '{location}': {message}")]
    WriteFailed { location: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// A place where settings are persisted.
///
/// # Implementations
///
/// - `InMemorySettingsBackend`: process-local map (always available)
/// - `JsonFileSettingsBackend` (sidetoc-storage): a JSON file on disk
pub trait SettingsBackend: Send + Sync + Debug {
    /// Reads every stored key. Missing storage reads as an empty map.
    fn read(&self) -> Result<SettingsMap, StorageError>;

    /// Merges `values` into the stored keys.
    fn write(&self, values: SettingsMap) -> Result<(), StorageError>;

    /// Returns a human-readable name for this backend (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// An in-memory settings backend.
#[derive(Debug, Default)]
pub struct InMemorySettingsBackend {
    values: std::sync::RwLock<SettingsMap>,
}

impl InMemorySettingsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with raw values.
    pub fn with_values(values: SettingsMap) -> Self {
        Self {
            values: std::sync::RwLock::new(values),
        }
    }

    /// Number of stored keys.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    /// Returns `true` if the lock is poisoned (safe default).
    pub fn is_empty(&self) -> bool {
        self.values.read().map(|v| v.is_empty()).unwrap_or(true)
    }
}

impl SettingsBackend for InMemorySettingsBackend {
    fn read(&self) -> Result<SettingsMap, StorageError> {
        self.values
            .read()
            .map(|v| v.clone())
            .map_err(|_| StorageError::Unavailable("settings lock poisoned".to_string()))
    }

    fn write(&self, values: SettingsMap) -> Result<(), StorageError> {
        let mut stored = self
            .values
            .write()
            .map_err(|_| StorageError::Unavailable("settings lock poisoned".to_string()))?;
        stored.extend(values);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InMemorySettingsBackend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_merges_keys() {
        let backend = InMemorySettingsBackend::new();
        assert!(backend.is_empty());

        let mut first = SettingsMap::new();
        first.insert("maxDepth".into(), json!(4));
        backend.write(first).unwrap();

        let mut second = SettingsMap::new();
        second.insert("compactMode".into(), json!(true));
        backend.write(second).unwrap();

        let stored = backend.read().unwrap();
        assert_eq!(stored.get("maxDepth"), Some(&json!(4)));
        assert_eq!(stored.get("compactMode"), Some(&json!(true)));
        assert_eq!(backend.len(), 2);
    }
}
