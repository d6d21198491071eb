//! Settings stored as one JSON object in a file.
//!
//! A missing file reads as empty storage. Writes merge into the stored
//! object and replace the file through a sibling temporary file, so a crash
//! mid-write never leaves a truncated document behind.

use log::debug;
use serde_json::Value;
use sidetoc_traits::{SettingsBackend, SettingsMap, StorageError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub struct JsonFileSettingsBackend {
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process.
    write_lock: Mutex<()>,
}

impl JsonFileSettingsBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read_failed(&self, message: impl ToString) -> StorageError {
        StorageError::ReadFailed {
            location: self.location(),
            message: message.to_string(),
        }
    }

    fn write_failed(&self, message: impl ToString) -> StorageError {
        StorageError::WriteFailed {
            location: self.location(),
            message: message.to_string(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SettingsBackend for JsonFileSettingsBackend {
    fn read(&self) -> Result<SettingsMap, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file at {}", self.location());
                return Ok(SettingsMap::new());
            }
            Err(e) => return Err(self.read_failed(e)),
        };
        if contents.trim().is_empty() {
            return Ok(SettingsMap::new());
        }

        match serde_json::from_str::<Value>(&contents).map_err(|e| self.read_failed(e))? {
            Value::Object(map) => Ok(map),
            other => Err(self.read_failed(format!("expected a JSON object, found {}", other))),
        }
    }

    fn write(&self, values: SettingsMap) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut stored = self.read()?;
        stored.extend(values);
        let rendered =
            serde_json::to_string_pretty(&Value::Object(stored)).map_err(|e| self.write_failed(e))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.write_failed(e))?;
        }
        let temp = self.temp_path();
        std::fs::write(&temp, rendered).map_err(|e| self.write_failed(e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| self.write_failed(e))?;
        debug!("Wrote settings to {}", self.location());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "JsonFileSettingsBackend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn map(value: Value) -> SettingsMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let backend = JsonFileSettingsBackend::new(dir.path().join("settings.json"));
        assert!(backend.read().unwrap().is_empty());
    }

    #[test]
    fn test_write_merges_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let backend = JsonFileSettingsBackend::new(&path);

        backend
            .write(map(json!({ "includeH1": true, "maxDepth": 4 })))
            .unwrap();
        backend.write(map(json!({ "maxDepth": 3 }))).unwrap();

        let stored = backend.read().unwrap();
        assert_eq!(stored.get("includeH1"), Some(&json!(true)));
        assert_eq!(stored.get("maxDepth"), Some(&json!(3)));
        assert!(path.exists());
        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn test_corrupt_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let backend = JsonFileSettingsBackend::new(&path);
        assert!(matches!(backend.read(), Err(StorageError::ReadFailed { .. })));

        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(backend.read(), Err(StorageError::ReadFailed { .. })));

        fs::write(&path, "  \n").unwrap();
        assert!(backend.read().unwrap().is_empty());
    }

    #[test]
    fn test_shared_between_backends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        JsonFileSettingsBackend::new(&path)
            .write(map(json!({ "compactMode": true })))
            .unwrap();

        let other = JsonFileSettingsBackend::new(&path);
        assert_eq!(other.read().unwrap().get("compactMode"), Some(&json!(true)));
        assert_eq!(other.name(), "JsonFileSettingsBackend");
    }
}
