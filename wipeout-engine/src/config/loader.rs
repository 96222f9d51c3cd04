//! Configuration file loading and validation

use std::path::Path;

use wipeout_utils::{config_file, Result, WipeoutError};

use super::AppConfig;

/// Loads [`AppConfig`] from TOML
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> Result<AppConfig> {
        Self::load_from(&config_file())
    }

    /// Load from the default location and validate
    pub fn load_and_validate() -> Result<AppConfig> {
        let path = config_file();
        let config = Self::load_from(&path)?;
        Self::validate(&config, &path)?;
        Ok(config)
    }

    /// Load from an explicit path, falling back to defaults if absent
    pub fn load_from(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| WipeoutError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = toml::from_str(&content).map_err(|e| WipeoutError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from an explicit path and validate
    pub fn load_and_validate_from(path: &Path) -> Result<AppConfig> {
        let config = Self::load_from(path)?;
        Self::validate(&config, path)?;
        Ok(config)
    }

    /// Reject settings a session cannot run with
    pub fn validate(config: &AppConfig, path: &Path) -> Result<()> {
        let invalid = |message: &str| WipeoutError::ConfigInvalid {
            path: path.to_path_buf(),
            message: message.into(),
        };

        if config.session.idle_cutoff_ms == 0 {
            return Err(invalid("session.idle_cutoff_ms must be positive"));
        }
        if config.session.tick_interval_ms == 0 {
            return Err(invalid("session.tick_interval_ms must be positive"));
        }
        if config.session.quick_durations.iter().any(|m| *m == 0) {
            return Err(invalid("session.quick_durations must all be positive"));
        }
        if config.document.header_delimiter.trim().is_empty() {
            return Err(invalid("document.header_delimiter must not be empty"));
        }

        Ok(())
    }
}
