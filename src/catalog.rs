//! Crosshair image catalog.
//!
//! The catalog is the union of a bundled directory and a user directory.
//! Identifiers are bare file names; a name present in both directories is
//! listed once.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Config;
use crate::prefs::FALLBACK_CROSSHAIR;

/// Supported crosshair image extensions.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "svg", "gif", "jpg", "jpeg", "webp"];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unsupported image format: '{path}'")]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid crosshair path: '{path}'")]
    InvalidPath { path: PathBuf },

    #[error("Failed to import crosshair '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CrosshairCatalog {
    builtin_dir: Option<PathBuf>,
    custom_dir: PathBuf,
}

impl CrosshairCatalog {
    pub fn new(builtin_dir: Option<PathBuf>, custom_dir: PathBuf) -> Self {
        Self {
            builtin_dir,
            custom_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.catalog.builtin_dir.clone(), config.custom_catalog_dir())
    }

    /// Every available identifier, sorted and deduplicated.
    ///
    /// Missing directories contribute nothing.
    pub fn list(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(dir) = &self.builtin_dir {
            read_dir_into(dir, &mut names);
        }
        read_dir_into(&self.custom_dir, &mut names);

        names.sort();
        names.dedup();
        tracing::debug!(count = names.len(), "Listed crosshair catalog");
        names
    }

    /// Copy an image into the user directory and return its identifier.
    pub fn import(&self, source: &Path) -> Result<String, CatalogError> {
        if !is_supported(source) {
            return Err(CatalogError::UnsupportedFormat {
                path: source.to_path_buf(),
            });
        }

        let filename = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CatalogError::InvalidPath {
                path: source.to_path_buf(),
            })?
            .to_string();

        fs::create_dir_all(&self.custom_dir).map_err(|e| CatalogError::Io {
            path: self.custom_dir.clone(),
            source: e,
        })?;

        let dest = self.custom_dir.join(&filename);
        fs::copy(source, &dest).map_err(|e| CatalogError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;

        tracing::info!(crosshair = %filename, "Imported custom crosshair");
        Ok(filename)
    }
}

/// The identifier to render for `selected`.
///
/// Unknown identifiers render as [`FALLBACK_CROSSHAIR`]; the stored value is
/// left alone so the selection survives a catalog that is temporarily
/// missing a file.
pub fn resolve_crosshair<'a>(selected: &'a str, catalog: &[String]) -> &'a str {
    if catalog.iter().any(|name| name == selected) {
        selected
    } else {
        FALLBACK_CROSSHAIR
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn read_dir_into(dir: &Path, names: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_supported(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            names.push(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"img").unwrap();
    }

    #[test]
    fn list_merges_sorts_and_dedups() {
        let builtin = TempDir::new().unwrap();
        let custom = TempDir::new().unwrap();
        touch(builtin.path(), "target-dot.png");
        touch(builtin.path(), "chevron.svg");
        touch(custom.path(), "target-dot.png");
        touch(custom.path(), "mine.WEBP");
        touch(custom.path(), "notes.txt");

        let catalog =
            CrosshairCatalog::new(Some(builtin.path().to_path_buf()), custom.path().to_path_buf());

        assert_eq!(
            catalog.list(),
            vec!["chevron.svg", "mine.WEBP", "target-dot.png"]
        );
    }

    #[test]
    fn list_tolerates_missing_dirs() {
        let catalog = CrosshairCatalog::new(
            Some(PathBuf::from("/nonexistent/builtin")),
            PathBuf::from("/nonexistent/custom"),
        );
        assert!(catalog.list().is_empty());
    }

    #[test]
    fn import_copies_into_custom_dir() {
        let src = TempDir::new().unwrap();
        let custom = TempDir::new().unwrap();
        touch(src.path(), "scope.png");

        let catalog = CrosshairCatalog::new(None, custom.path().join("crosshairs"));
        let id = catalog.import(&src.path().join("scope.png")).unwrap();

        assert_eq!(id, "scope.png");
        assert_eq!(catalog.list(), vec!["scope.png"]);
    }

    #[test]
    fn import_rejects_unsupported_format() {
        let custom = TempDir::new().unwrap();
        let catalog = CrosshairCatalog::new(None, custom.path().to_path_buf());
        assert!(matches!(
            catalog.import(Path::new("/tmp/readme.md")),
            Err(CatalogError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn resolve_falls_back_for_unknown() {
        let catalog = vec!["dot.png".to_string()];
        assert_eq!(resolve_crosshair("dot.png", &catalog), "dot.png");
        assert_eq!(resolve_crosshair("gone.png", &catalog), FALLBACK_CROSSHAIR);
    }
}
