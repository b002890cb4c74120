//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Keysafe base directory (~/.keysafe).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".keysafe"))
}

/// Get the main config file path (~/.keysafe/keysafe.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("keysafe.json5"))
}

/// Get the settings record directory (~/.keysafe/settings).
pub fn settings_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("settings"))
}
