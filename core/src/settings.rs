//! Persisted global settings
//!
//! Stored as TOML through `confy` under the `countdown-to` app name.
//! Missing fields in an existing file fall back to the built-in defaults.

use std::path::{Path, PathBuf};

use countdown_types::Settings;

use crate::error::ConfigError;

pub const APP_NAME: &str = "countdown-to";

/// Load settings from the default location, creating the file if needed.
pub fn try_load_settings() -> Result<Settings, ConfigError> {
    confy::load(APP_NAME, None).map_err(ConfigError::Load)
}

/// Load settings, falling back to defaults if the file is unreadable.
pub fn load_settings() -> Settings {
    try_load_settings().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Using default settings");
        Settings::default()
    })
}

pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    confy::load_path(path).map_err(ConfigError::Load)
}

pub fn save_settings(settings: &Settings) -> Result<(), ConfigError> {
    confy::store(APP_NAME, None, settings).map_err(ConfigError::Store)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    confy::store_path(path, settings).map_err(ConfigError::Store)
}

/// Location of the default settings file
pub fn settings_path() -> Result<PathBuf, ConfigError> {
    confy::get_configuration_file_path(APP_NAME, None).map_err(ConfigError::Locate)
}
