//! Conversions between JavaScript values and sidetoc types.

use crate::error::SidetocError;
use log::warn;
use serde::Serialize;
use serde_json::Value;
use sidetoc_core::MutationKind;
use sidetoc_core::settings::parse_settings;
use sidetoc_types::Settings;
use wasm_bindgen::prelude::*;

/// Maps a `MutationRecord.type` string. Unknown types are treated as
/// structural changes.
pub fn parse_mutation_kind(kind: &str) -> MutationKind {
    match kind {
        "attributes" => MutationKind::Attributes,
        "characterData" => MutationKind::CharacterData,
        _ => MutationKind::ChildList,
    }
}

/// Reads a settings object the way the settings store does: unknown keys
/// are ignored, wrong-typed keys fall back to their defaults and `maxDepth`
/// is clamped. Anything that is not an object gives the defaults.
pub fn settings_from_js(value: JsValue) -> Settings {
    match serde_wasm_bindgen::from_value::<Value>(value) {
        Ok(value) => settings_from_value(&value),
        Err(e) => {
            warn!("Unreadable settings value ({}), using defaults", e);
            Settings::default()
        }
    }
}

fn settings_from_value(value: &Value) -> Settings {
    match value {
        Value::Object(map) => parse_settings(map),
        _ => Settings::default(),
    }
}

pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, SidetocError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| SidetocError::message_error(e.to_string()))
}

/// Host timestamps (`performance.now()`, `Date.now()`) as whole milliseconds.
pub fn millis(now: f64) -> u64 {
    if now.is_finite() && now > 0.0 {
        now as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mutation_kinds() {
        assert_eq!(parse_mutation_kind("attributes"), MutationKind::Attributes);
        assert_eq!(parse_mutation_kind("characterData"), MutationKind::CharacterData);
        assert_eq!(parse_mutation_kind("childList"), MutationKind::ChildList);
        assert_eq!(parse_mutation_kind("other"), MutationKind::ChildList);
    }

    #[test]
    fn test_wrong_typed_settings_fall_back() {
        let settings = settings_from_value(&json!({
            "maxDepth": "4",
            "includeH1": "yes",
            "compactMode": true,
        }));
        assert_eq!(
            settings,
            Settings {
                compact_mode: true,
                ..Settings::default()
            }
        );

        assert_eq!(settings_from_value(&json!({ "maxDepth": 4.5 })).max_depth, 5);
        assert_eq!(settings_from_value(&json!({ "maxDepth": -1 })).max_depth, 2);
        assert_eq!(settings_from_value(&Value::Null), Settings::default());
        assert_eq!(settings_from_value(&json!([1, 2])), Settings::default());
    }

    #[test]
    fn test_millis() {
        assert_eq!(millis(1500.7), 1500);
        assert_eq!(millis(-3.0), 0);
        assert_eq!(millis(f64::NAN), 0);
    }
}
