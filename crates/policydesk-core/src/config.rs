//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which selects the session storage backend and remembers the last user.
//!
//! Configuration is stored at `~/.config/policydesk/config.json`.
//! `POLICYDESK_STORAGE` and `POLICYDESK_DATA_DIR` override the file.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{FileStore, KeyValueStore, KeyringStore, MemoryStore};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "policydesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the storage backend
pub const STORAGE_ENV: &str = "POLICYDESK_STORAGE";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "POLICYDESK_DATA_DIR";

/// Where the session record is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Process memory only; sessions end with the process
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" | "keychain" => Ok(StorageBackend::Keyring),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageBackend,
    pub data_dir: Option<PathBuf>,
    pub last_user_id: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment overrides on top of the file values
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(STORAGE_ENV).ok(),
            std::env::var(DATA_DIR_ENV).ok(),
        )
    }

    fn apply_overrides(&mut self, storage: Option<String>, data_dir: Option<String>) -> Result<()> {
        if let Some(storage) = storage.filter(|s| !s.trim().is_empty()) {
            self.storage = storage
                .parse()
                .with_context(|| format!("Invalid {}", STORAGE_ENV))?;
        }
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Build the configured session store
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        let store: Box<dyn KeyValueStore> = match self.storage {
            StorageBackend::File => Box::new(FileStore::new(self.data_dir()?)),
            StorageBackend::Keyring => Box::new(KeyringStore::new(APP_NAME)),
            StorageBackend::Memory => Box::new(MemoryStore::new()),
        };
        debug!(backend = store.name(), "Session store opened");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("file".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert_eq!(" Keychain ".parse::<StorageBackend>().unwrap(), StorageBackend::Keyring);
        assert_eq!("MEMORY".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: Config = serde_json::from_str(r#"{"last_user_id":"u1"}"#).unwrap();
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.data_dir, None);
        assert_eq!(config.last_user_id.as_deref(), Some("u1"));

        let config: Config = serde_json::from_str(r#"{"storage":"keyring"}"#).unwrap();
        assert_eq!(config.storage, StorageBackend::Keyring);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(Some("memory".to_string()), Some("/tmp/pd".to_string()))
            .unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/pd"));

        // Blank values leave the config alone
        config.apply_overrides(Some(" ".to_string()), Some(String::new())).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);

        assert!(config.apply_overrides(Some("redis".to_string()), None).is_err());
    }

    #[test]
    fn test_open_store_matches_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(config.open_store().unwrap().name(), "file");

        config.storage = StorageBackend::Memory;
        assert_eq!(config.open_store().unwrap().name(), "memory");

        config.storage = StorageBackend::Keyring;
        assert_eq!(config.open_store().unwrap().name(), "keyring");
    }
}
