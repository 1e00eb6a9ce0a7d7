//! Unified settings access utilities.
//!
//! The host owns configuration; the translator only reads string values by
//! dot-notation key (e.g. `"CustomFromFile.FilePath"`). `SettingsAccess` is
//! the seam: hosts implement `get_setting` and get typed helpers for free.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default settings file name, relative to the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Trait for read access to host-provided settings.
pub trait SettingsAccess {
    /// Get a setting value by key.
    ///
    /// # Arguments
    /// * `key` - The dot-notation key path (e.g., "CustomFromFile.Observe")
    ///
    /// # Returns
    /// The value as a string if found, None otherwise.
    fn get_setting(&self, key: &str) -> Option<String>;

    /// Get a setting or fall back to `default`.
    fn get_setting_or(&self, key: &str, default: &str) -> String {
        self.get_setting(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Get a boolean setting. Accepts `true`/`false`/`1`/`0`, case-insensitive.
    fn get_bool(&self, key: &str) -> Option<bool> {
        let raw = self.get_setting(key)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => {
                crate::warn!("Ignoring non-boolean value for {}: {:?}", key, raw);
                None
            }
        }
    }

    /// Get an unsigned integer setting.
    fn get_u64(&self, key: &str) -> Option<u64> {
        let raw = self.get_setting(key)?;
        match raw.trim().parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => {
                crate::warn!("Ignoring non-numeric value for {}: {:?}", key, raw);
                None
            }
        }
    }
}

/// Flat key/value maps work as settings directly
impl SettingsAccess for HashMap<String, String> {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Settings backed by a JSON object, e.g.
/// `{"CustomFromFile": {"FilePath": "chs/dictionary.txt", "Observe": true}}`
#[derive(Debug, Clone, Default)]
pub struct JsonSettings {
    root: Map<String, Value>,
}

impl JsonSettings {
    /// Parse settings from a JSON string; the top level must be an object
    pub fn from_json_str(content: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(root)) => Ok(Self { root }),
            Ok(_) => Err("Settings root must be a JSON object".to_string()),
            Err(e) => Err(format!("Failed to parse settings: {}", e)),
        }
    }

    /// Read settings from a file. A missing file yields empty settings.
    pub fn from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            crate::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_json_str(&content)
    }

    /// Deserialize the object stored under `name`.
    ///
    /// Returns Ok(None) when the key is absent or not an object.
    pub fn section<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, String> {
        match self.root.get(name) {
            Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| format!("Invalid settings section {}: {}", name, e)),
            _ => Ok(None),
        }
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        // A literal dotted key wins over the nested path
        if let Some(value) = self.root.get(key) {
            return Some(value);
        }

        let mut parts = key.split('.');
        let mut current = self.root.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

impl SettingsAccess for JsonSettings {
    fn get_setting(&self, key: &str) -> Option<String> {
        match self.lookup(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
