//! Durable storage for the aggregate.
//!
//! Only the store calls this, and only on an explicit commit.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::Preferences;

pub const PREFERENCES_FILENAME: &str = "crossover-settings.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to read preferences '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preferences '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write preferences '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// JSON file holding the committed aggregate.
#[derive(Debug, Clone)]
pub struct PreferencesFile {
    path: PathBuf,
}

impl PreferencesFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<data dir>/crossover/crossover-settings.json`, falling back to the
    /// current directory when the platform has no data dir.
    pub fn default_path() -> PathBuf {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("crossover").join(PREFERENCES_FILENAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the committed aggregate. `Ok(None)` when nothing was saved yet.
    pub fn load(&self) -> Result<Option<Preferences>, PersistError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| PersistError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;

        let prefs = serde_json::from_str(&content).map_err(|e| PersistError::ParseError {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(Some(prefs))
    }

    /// Load, or fall back to defaults when the file is missing or unreadable.
    pub fn load_or_default(&self) -> Preferences {
        match self.load() {
            Ok(Some(prefs)) => {
                tracing::info!(path = %self.path.display(), "Preferences loaded");
                prefs
            }
            Ok(None) => {
                tracing::info!("No saved preferences found, using defaults");
                Preferences::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load preferences, using defaults");
                Preferences::default()
            }
        }
    }

    /// Write the aggregate, replacing the file through a sibling temp file.
    pub fn save(&self, prefs: &Preferences) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(prefs)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistError::WriteError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| PersistError::WriteError {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| PersistError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), "Wrote preferences file");
        Ok(())
    }
}
