//! Configuration loading and persistence.

use super::{Config, KeySourceConfig};
use crate::error::ConfigError;
use crate::paths;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Length of a hex-encoded 32-byte key.
const HEX_KEY_LEN: usize = 64;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "loading configuration");
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid json5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Settings directory, falling back to `~/.keysafe/settings`.
    pub fn storage_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::settings_dir(),
        }
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Key source shape
        match &self.cipher.key {
            KeySourceConfig::Generated => {}
            KeySourceConfig::Hex { value } => {
                let hex = value.expose_secret().trim();
                if hex.len() != HEX_KEY_LEN {
                    errors.push(format!(
                        "cipher.key.value must be {} hex characters, got {}",
                        HEX_KEY_LEN,
                        hex.len()
                    ));
                } else if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    errors.push("cipher.key.value contains non-hex characters".to_string());
                }
            }
            KeySourceConfig::Env { var } => {
                if var.trim().is_empty() {
                    errors.push("cipher.key.var must not be empty".to_string());
                }
            }
            KeySourceConfig::File { path } => {
                if path.as_os_str().is_empty() {
                    errors.push("cipher.key.path must not be empty".to_string());
                }
            }
        }

        // 2. Owner registry
        let mut seen = HashSet::new();
        for owner in &self.storage.owners {
            if owner.get() <= 0 {
                errors.push(format!("storage.owners: owner id {} must be positive", owner));
            }
            if !seen.insert(*owner) {
                errors.push(format!("storage.owners: duplicate owner id {}", owner));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}
