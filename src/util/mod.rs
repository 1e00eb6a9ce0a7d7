//! Shared utilities.
//!
//! - `settings`: SettingsAccess trait and the JSON settings source

mod settings;

pub use settings::{JsonSettings, SettingsAccess, DEFAULT_SETTINGS_FILE};
