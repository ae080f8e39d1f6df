//! Core configuration.
//!
//! Resolution order for the config file:
//! 1. Explicit path from the host
//! 2. `<config dir>/smrm/config.toml`
//! 3. Compiled defaults
//!
//! Keys missing from the file take their defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const APP_DIR: &str = "smrm";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "smrm.db";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    /// Database file; the per-user data directory when unset
    pub database_path: Option<PathBuf>,
    /// Written into export bundles as `version`
    pub app_version: String,
    pub media: MediaConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MediaConfig {
    /// Photos staged per form
    pub max_per_record: usize,
    /// Thumbnail long side in pixels
    pub thumbnail_size: u32,
    pub thumbnail_quality: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub page_size: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            app_version: "1.0.0".to_string(),
            media: MediaConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_per_record: 5,
            thumbnail_size: 200,
            thumbnail_quality: 0.6,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl CoreConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Explicit file, then the per-user file, then defaults.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            let config = Self::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            info!(path = %path.display(), "Loaded config");
            return Ok(config);
        }

        if let Some(path) = user_config_path().filter(|p| p.exists()) {
            let config = Self::load(&path)
                .with_context(|| format!("loading user config {}", path.display()))?;
            info!(path = %path.display(), "Loaded user config");
            return Ok(config);
        }

        debug!("No config file, using defaults");
        Ok(Self::default())
    }

    /// Configured database path, or the per-user default.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(Self::default_database_path)
    }

    /// `<data dir>/smrm/smrm.db`, or `./smrm_data/smrm.db` without a data dir.
    pub fn default_database_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("./smrm_data"))
            .join(DATABASE_FILE)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.media.max_per_record, 5);
        assert_eq!(config.media.thumbnail_size, 200);
        assert_eq!(config.history.page_size, 20);
        assert_eq!(config.app_version, "1.0.0");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = CoreConfig::from_toml(
            r#"
            app_version = "2.1.0"

            [history]
            page_size = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.app_version, "2.1.0");
        assert_eq!(config.history.page_size, 50);
        assert_eq!(config.media, MediaConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_path = \"/tmp/custom.db\"").unwrap();
        writeln!(file, "[media]\nmax_per_record = 3").unwrap();

        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.media.max_per_record, 3);
        assert_eq!(config.media.thumbnail_quality, 0.6);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(CoreConfig::load(&missing), Err(ConfigError::Read { .. })));
        assert!(matches!(
            CoreConfig::from_toml("history = 3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(CoreConfig::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn test_default_database_path() {
        let path = CoreConfig::default_database_path();
        assert!(path.ends_with("smrm.db"));
    }
}
