//! The file-backed store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::ConfigDocument;

const CONFIG_FILE_NAME: &str = "dendrite-admin.toml";

/// File-backed configuration store.
///
/// The path is threaded in explicitly by the caller; there is no
/// process-wide config file state.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by the default path: `$HOME/.config/dendrite-admin.toml`
    /// when `$HOME/.config` exists, `$HOME/.dendrite-admin.toml` otherwise.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingHome`] when `$HOME` is not set.
    pub fn default_location() -> ConfigResult<Self> {
        let home = std::env::var_os("HOME").ok_or(ConfigError::MissingHome)?;
        let home = PathBuf::from(home);
        let dot_config = home.join(".config");
        let path = if dot_config.is_dir() {
            dot_config.join(CONFIG_FILE_NAME)
        } else {
            home.join(format!(".{CONFIG_FILE_NAME}"))
        };
        Ok(Self::new(path))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document; a missing file yields the default
    /// document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file exists but cannot be read,
    /// [`ConfigError::Parse`] when it is not valid TOML.
    pub fn load(&self) -> ConfigResult<ConfigDocument> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "config file not found, using defaults");
            return Ok(ConfigDocument::default());
        }
        debug!(path = %self.path.display(), "reading config file");
        let raw = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the whole document back, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serialize`] when the document cannot be rendered,
    /// [`ConfigError::Io`] when the file cannot be written.
    pub fn save(&self, document: &ConfigDocument) -> ConfigResult<()> {
        debug!(path = %self.path.display(), "writing config file");
        let rendered = toml::to_string_pretty(document)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, rendered).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let store = ConfigStore::new(dir.path().join("absent.toml"));
        let doc = store.load().expect("defaults load");
        assert_eq!(doc, ConfigDocument::default());
    }

    #[test]
    fn round_trip_preserves_document() {
        let dir = TempDir::new().expect("temp dir");
        let store = ConfigStore::new(dir.path().join("nested").join("config.toml"));

        let doc = ConfigDocument {
            access_token: Some("syt_token".to_string()),
            server: Some("https://matrix.example.test".to_string()),
            database_uri: Some("sqlite:///tmp/dendrite.db".to_string()),
            headers: std::collections::BTreeMap::from([(
                "X-Forwarded-For".to_string(),
                "10.0.0.1".to_string(),
            )]),
            override_password_length_check: true,
            ..ConfigDocument::default()
        };

        store.save(&doc).expect("save succeeds");
        let loaded = store.load().expect("load succeeds");
        assert_eq!(loaded, doc);
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "access_token = [unclosed").expect("write fixture");

        let err = ConfigStore::new(&path).load().expect_err("parse should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
