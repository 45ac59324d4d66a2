//! Configuration management for the Denshikawa client.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application name used for config directory.
const APP_NAME: &str = "Denshikawa";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Default API base URL (local development server).
const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API connection settings.
    pub api: ApiSettings,

    /// Pagination behavior.
    pub paging: PagingSettings,

    /// Preferred chapter language (ISO 639-1).
    pub language: String,

    /// Override for the session file location.
    pub session_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            paging: PagingSettings::default(),
            language: "en".to_string(),
            session_file: None,
        }
    }
}

/// API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the Denshikawa API server.
    pub base_url: String,

    /// Fixed request timeout in seconds. There is no per-call override.
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("denshikawa-cli/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiSettings {
    /// Returns the request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Pagination behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingSettings {
    /// Page size requested for listings and searches.
    pub page_size: u64,

    /// Upper bound the server accepts for `limit`.
    pub max_page_size: u64,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "api.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "api.base_url".to_string(),
                message: "must be a valid URL".to_string(),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "api.timeout_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.paging.page_size == 0 || self.paging.page_size > self.paging.max_page_size {
            return Err(ConfigError::InvalidValue {
                key: "paging.page_size".to_string(),
                message: format!("must be between 1 and {}", self.paging.max_page_size),
            });
        }

        Ok(())
    }

    /// Returns the effective session file path, using config or default.
    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.session_file {
            Ok(path.clone())
        } else {
            Ok(Self::config_dir()?.join("auth-storage.json"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.paging.page_size, 20);
        assert_eq!(config.language, "en");
        assert!(config.session_file.is_none());
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.api.base_url = "https://api.denshikawa.example".to_string();
        let file = NamedTempFile::new().unwrap();

        config.save_to(file.path()).unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.api.base_url, config.api.base_url);
        assert_eq!(loaded.paging.page_size, config.paging.page_size);
    }

    #[test]
    fn test_load_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.paging.page_size = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_path_override() {
        let mut config = Config::default();
        config.session_file = Some(PathBuf::from("/tmp/session.json"));
        assert_eq!(
            config.session_path().unwrap(),
            PathBuf::from("/tmp/session.json")
        );
    }
}
