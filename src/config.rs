// Translator configuration - file locations and reload behaviour
// Values come from the host through SettingsAccess, keyed under the
// `CustomFromFile` section.

use crate::reload::SupervisorConfig;
use crate::util::{JsonSettings, SettingsAccess};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings section all keys live under
pub const SETTINGS_SECTION: &str = "CustomFromFile";

pub const DEFAULT_DICTIONARY_PATH: &str = "chs/dictionary.txt";
pub const DEFAULT_LEDGER_PATH: &str = "chs/notMatch.txt";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Configuration for a file translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TranslatorConfig {
    /// Dictionary file
    pub file_path: PathBuf,
    /// Unresolved ledger file
    pub out_file_path: PathBuf,
    /// Watch the dictionary file and reload on change
    pub observe: bool,
    /// How often the watcher checks the modification time
    pub poll_interval_ms: u64,
    /// Treat the first observed modification time as a baseline
    pub skip_first_observation: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(DEFAULT_DICTIONARY_PATH),
            out_file_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            observe: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            skip_first_observation: true,
        }
    }
}

fn key(name: &str) -> String {
    format!("{}.{}", SETTINGS_SECTION, name)
}

impl TranslatorConfig {
    /// Build a configuration from host settings, falling back to defaults
    pub fn from_settings<S: SettingsAccess + ?Sized>(settings: &S) -> Self {
        let defaults = Self::default();
        let config = Self {
            file_path: settings
                .get_setting(&key("FilePath"))
                .map(PathBuf::from)
                .unwrap_or(defaults.file_path),
            out_file_path: settings
                .get_setting(&key("OutFilePath"))
                .map(PathBuf::from)
                .unwrap_or(defaults.out_file_path),
            observe: settings.get_bool(&key("Observe")).unwrap_or(defaults.observe),
            poll_interval_ms: settings
                .get_u64(&key("PollIntervalMs"))
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.poll_interval_ms),
            skip_first_observation: settings
                .get_bool(&key("SkipFirstObservation"))
                .unwrap_or(defaults.skip_first_observation),
        };
        crate::debug!("Translator config: {:?}", config);
        config
    }

    /// Build a configuration from a JSON settings file.
    ///
    /// A `CustomFromFile` object is read as typed JSON values; otherwise the
    /// dotted keys go through `from_settings`.
    pub fn from_json(settings: &JsonSettings) -> Result<Self, String> {
        let config = match settings.section::<Self>(SETTINGS_SECTION)? {
            Some(config) => config.normalized(),
            None => Self::from_settings(settings),
        };
        crate::debug!("Translator config: {:?}", config);
        Ok(config)
    }

    fn normalized(mut self) -> Self {
        if self.poll_interval_ms == 0 {
            self.poll_interval_ms = DEFAULT_POLL_INTERVAL_MS;
        }
        self
    }

    /// Watcher settings derived from this configuration
    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            poll_interval_ms: self.poll_interval_ms,
            skip_first_observation: self.skip_first_observation,
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
