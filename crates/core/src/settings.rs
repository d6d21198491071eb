//! The settings store: the one shared, mutable resource.
//!
//! Values are read leniently: unknown keys are ignored, wrong-typed keys fall
//! back to their defaults and `maxDepth` is clamped. Writers get back a
//! [`SettingsChange`] describing which keys moved, which the host fans out to
//! every context. Readers reload the whole settings value on a relevant change
//! rather than patching individual keys.

use crate::error::SettingsError;
use log::{debug, warn};
use serde_json::Value;
use sidetoc_traits::{SettingsBackend, SettingsMap};
use sidetoc_types::Settings;
use std::sync::Arc;

pub const KEY_INCLUDE_H1: &str = "includeH1";
pub const KEY_MAX_DEPTH: &str = "maxDepth";
pub const KEY_SMOOTH_SCROLL: &str = "smoothScroll";
pub const KEY_COMPACT_MODE: &str = "compactMode";

/// The outcome of a write.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsChange {
    pub previous: Settings,
    pub current: Settings,
    pub changed_keys: Vec<&'static str>,
}

impl SettingsChange {
    pub fn is_empty(&self) -> bool {
        self.changed_keys.is_empty()
    }

    /// True when page contexts must re-extract.
    pub fn affects_extraction(&self) -> bool {
        self.changed_keys
            .iter()
            .any(|key| *key == KEY_INCLUDE_H1 || *key == KEY_MAX_DEPTH)
    }

    pub fn touches(&self, key: &str) -> bool {
        self.changed_keys.iter().any(|k| *k == key)
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsStore {
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn load(&self) -> Result<Settings, SettingsError> {
        let raw = self.backend.read()?;
        Ok(parse_settings(&raw))
    }

    /// Loads settings, falling back to defaults if the backend fails.
    pub fn load_or_default(&self) -> Settings {
        self.load().unwrap_or_else(|e| {
            warn!(
                "Could not load settings from {}: {}. Using defaults.",
                self.backend.name(),
                e
            );
            Settings::default()
        })
    }

    /// Normalizes and persists `settings`.
    pub fn save(&self, settings: Settings) -> Result<SettingsChange, SettingsError> {
        let previous = self.load_or_default();
        let current = settings.normalized();

        self.backend.write(settings_to_map(&current))?;

        let change = diff(previous, current);
        debug!(
            "Saved settings to {} (changed: {:?})",
            self.backend.name(),
            change.changed_keys
        );
        Ok(change)
    }
}

/// Reads settings key by key so one bad value does not discard the rest.
pub fn parse_settings(raw: &SettingsMap) -> Settings {
    let defaults = Settings::default();
    let flag = |key: &str, default: bool| raw.get(key).and_then(Value::as_bool).unwrap_or(default);

    let max_depth = raw
        .get(KEY_MAX_DEPTH)
        .and_then(Value::as_f64)
        .map(|depth| depth.round().clamp(0.0, u8::MAX as f64) as u8)
        .unwrap_or(defaults.max_depth);

    Settings {
        include_h1: flag(KEY_INCLUDE_H1, defaults.include_h1),
        max_depth,
        smooth_scroll: flag(KEY_SMOOTH_SCROLL, defaults.smooth_scroll),
        compact_mode: flag(KEY_COMPACT_MODE, defaults.compact_mode),
    }
    .normalized()
}

/// The persisted form of `settings`, keyed by wire name.
pub fn settings_to_map(settings: &Settings) -> SettingsMap {
    let mut values = SettingsMap::new();
    values.insert(KEY_INCLUDE_H1.to_string(), Value::Bool(settings.include_h1));
    values.insert(KEY_MAX_DEPTH.to_string(), Value::from(settings.max_depth));
    values.insert(KEY_SMOOTH_SCROLL.to_string(), Value::Bool(settings.smooth_scroll));
    values.insert(KEY_COMPACT_MODE.to_string(), Value::Bool(settings.compact_mode));
    values
}

fn diff(previous: Settings, current: Settings) -> SettingsChange {
    let mut changed_keys = Vec::new();
    if previous.include_h1 != current.include_h1 {
        changed_keys.push(KEY_INCLUDE_H1);
    }
    if previous.max_depth != current.max_depth {
        changed_keys.push(KEY_MAX_DEPTH);
    }
    if previous.smooth_scroll != current.smooth_scroll {
        changed_keys.push(KEY_SMOOTH_SCROLL);
    }
    if previous.compact_mode != current.compact_mode {
        changed_keys.push(KEY_COMPACT_MODE);
    }
    SettingsChange {
        previous,
        current,
        changed_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sidetoc_traits::InMemorySettingsBackend;

    fn map(value: Value) -> SettingsMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_empty_storage_yields_defaults() {
        let store = SettingsStore::new(Arc::new(InMemorySettingsBackend::new()));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_lenient_parsing() {
        let raw = map(json!({
            "includeH1": "yes",
            "maxDepth": 11,
            "smoothScroll": false,
            "theme": "dark"
        }));
        let settings = parse_settings(&raw);
        assert!(!settings.include_h1);
        assert_eq!(settings.max_depth, 6);
        assert!(!settings.smooth_scroll);
        assert!(!settings.compact_mode);

        let negative = parse_settings(&map(json!({ "maxDepth": -3 })));
        assert_eq!(negative.max_depth, 2);
    }

    #[test]
    fn test_save_reports_changed_keys() {
        let store = SettingsStore::new(Arc::new(InMemorySettingsBackend::new()));

        let change = store
            .save(Settings {
                compact_mode: true,
                ..Settings::default()
            })
            .unwrap();
        assert_eq!(change.changed_keys, vec![KEY_COMPACT_MODE]);
        assert!(!change.affects_extraction());

        let change = store
            .save(Settings {
                compact_mode: true,
                max_depth: 3,
                ..Settings::default()
            })
            .unwrap();
        assert!(change.affects_extraction());
        assert!(change.touches(KEY_MAX_DEPTH));
        assert_eq!(store.load().unwrap().max_depth, 3);
    }

    #[test]
    fn test_save_normalizes() {
        let store = SettingsStore::new(Arc::new(InMemorySettingsBackend::new()));
        let change = store
            .save(Settings {
                max_depth: 1,
                ..Settings::default()
            })
            .unwrap();
        assert_eq!(change.current.max_depth, 2);
        assert_eq!(store.load().unwrap().max_depth, 2);
    }

    #[test]
    fn test_unchanged_save_is_empty() {
        let store = SettingsStore::new(Arc::new(InMemorySettingsBackend::new()));
        let change = store.save(Settings::default()).unwrap();
        assert!(change.is_empty());
    }
}
