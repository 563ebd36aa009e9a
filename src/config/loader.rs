use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;
use crate::prefs::PreferencesFile;

/// Why a config file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// `crossover/config.toml` under the platform config dir, or under the
    /// working directory when there is none.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crossover")
            .join("config.toml")
    }

    /// [`Config::load_from`] on [`Config::config_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// A missing file means defaults. A present file must parse and pass
    /// [`Config::validate`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Timeouts and channel sizes must be non-zero, and the lock
    /// acknowledgment must end before an unlock wait would give up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ipc.timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "ipc.timeout_ms must be greater than zero".to_string(),
            });
        }

        if self.ipc.buffer == 0 || self.bus.capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "ipc.buffer and bus.capacity must be greater than zero".to_string(),
            });
        }

        if self.lock.ack_ms >= self.lock.unlock_wait_ms {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "lock.ack_ms ({}) must be shorter than lock.unlock_wait_ms ({})",
                    self.lock.ack_ms, self.lock.unlock_wait_ms
                ),
            });
        }

        Ok(())
    }

    /// Preference file location, honoring the override.
    pub fn preferences_file(&self) -> PreferencesFile {
        let path = self
            .preferences
            .path
            .clone()
            .unwrap_or_else(PreferencesFile::default_path);
        PreferencesFile::new(path)
    }

    /// Directory imported crosshairs are copied into.
    pub fn custom_catalog_dir(&self) -> PathBuf {
        self.catalog.custom_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("crossover")
                .join("crosshairs")
        })
    }
}
