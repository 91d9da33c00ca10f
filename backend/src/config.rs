//! Configuration for the care tracker backend.
//!
//! Configuration is resolved in three layers, highest precedence first:
//! 1. Environment variables prefixed with `CARE_TRACKER_`
//! 2. A YAML file (`care_tracker.yaml`, or the path in `CARE_TRACKER_CONFIG`)
//! 3. Built-in defaults

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::FileConnection;

/// Default configuration file, relative to the working directory
pub const CONFIG_FILE_NAME: &str = "care_tracker.yaml";

pub const ENV_CONFIG_PATH: &str = "CARE_TRACKER_CONFIG";
pub const ENV_HOST: &str = "CARE_TRACKER_HOST";
pub const ENV_PORT: &str = "CARE_TRACKER_PORT";
pub const ENV_STORAGE: &str = "CARE_TRACKER_STORAGE";
pub const ENV_DATA_DIR: &str = "CARE_TRACKER_DATA_DIR";
pub const ENV_LOG: &str = "CARE_TRACKER_LOG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origins: vec!["http://localhost:8080".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root of the file store. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileConnection::default_directory().context("No data directory configured"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default locations and the process environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME));
        let mut config = Self::from_file_or_default(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a YAML file; a missing file yields the defaults
    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply `CARE_TRACKER_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PORT} must be a port number, got {port:?}"))?;
        }
        if let Some(backend) = lookup(ENV_STORAGE) {
            self.storage.backend = match backend.trim().to_ascii_lowercase().as_str() {
                "memory" => StorageBackend::Memory,
                "file" => StorageBackend::File,
                other => bail!("{ENV_STORAGE} must be 'memory' or 'file', got {other:?}"),
            };
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "server:\n  port: 4100\nstorage:\n  backend: memory\n";
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::from_file_or_default(&temp_dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("care_tracker.yaml");
        std::fs::write(&path, "server: [not, a, map]").unwrap();
        assert!(AppConfig::from_file_or_default(&path).is_err());
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                (ENV_HOST, "0.0.0.0"),
                (ENV_PORT, "8088"),
                (ENV_STORAGE, "Memory"),
                (ENV_DATA_DIR, "/srv/care"),
                (ENV_LOG, "debug"),
            ]))
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8088");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.resolved_data_dir().unwrap(), PathBuf::from("/srv/care"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_env_values_are_rejected() {
        let mut config = AppConfig::default();
        assert!(config.apply_env_overrides(env(&[(ENV_PORT, "eighty")])).is_err());
        assert!(config.apply_env_overrides(env(&[(ENV_STORAGE, "cloud")])).is_err());
    }
}
