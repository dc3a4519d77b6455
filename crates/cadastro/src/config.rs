//! Configuration management for cadastro.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "cadastro";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "documents.db";

/// Default session file name.
const SESSION_FILE_NAME: &str = "session.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CADASTRO_`)
/// 2. TOML config file at `~/.config/cadastro/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document store configuration.
    pub storage: StorageConfig,
    /// Session persistence configuration.
    pub session: SessionConfig,
    /// Screen behavior configuration.
    pub ui: UiConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/cadastro/documents.db`
    pub database_path: Option<PathBuf>,
}

/// Session-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path to the file holding the signed-in session.
    /// Defaults to `~/.local/share/cadastro/session.json`
    pub session_path: Option<PathBuf>,
}

/// Screen-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// How long the success banner stays visible, in milliseconds.
    pub success_banner_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            success_banner_ms: 3_000,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CADASTRO_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.ui.success_banner_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "success_banner_ms must be greater than 0".to_string(),
            });
        }

        if self.database_path() == self.session_path() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "database_path and session_path must differ (both {})",
                    self.database_path().display()
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the session file path, resolving defaults if not set.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.session
            .session_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(SESSION_FILE_NAME))
    }

    /// Get the success banner lifetime as a Duration.
    #[must_use]
    pub fn success_banner(&self) -> Duration {
        Duration::from_millis(self.ui.success_banner_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.session.session_path.is_none());
        assert_eq!(config.ui.success_banner_ms, 3_000);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_banner() {
        let mut config = Config::default();
        config.ui.success_banner_ms = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("success_banner_ms"));
    }

    #[test]
    fn test_validate_shared_paths() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/tmp/same"));
        config.session.session_path = Some(PathBuf::from("/tmp/same"));

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must differ"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("documents.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_session_path_default() {
        let path = Config::default().session_path();
        assert!(path.to_string_lossy().contains("session.json"));
    }

    #[test]
    fn test_success_banner_duration() {
        assert_eq!(
            Config::default().success_banner(),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("cadastro"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "cadastro_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[ui]\nsuccess_banner_ms = 1500\n\n[storage]\ndatabase_path = \"/tmp/cadastro.db\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.ui.success_banner_ms, 1500);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/cadastro.db"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_ui_config_deserialize() {
        let ui: UiConfig = serde_json::from_str(r#"{"success_banner_ms": 250}"#).unwrap();
        assert_eq!(ui.success_banner_ms, 250);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("success_banner_ms"));
        assert!(json.contains("database_path"));
        assert!(json.contains("session_path"));
    }
}
