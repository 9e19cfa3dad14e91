//! Config management use case

use crate::error::{DiarioError, Result};
use crate::infrastructure::{Config, FileSystemRepository, JournalRepository};

pub const CONFIG_KEYS: [&str; 5] = [
    "remote.url",
    "remote.key",
    "remote.table",
    "remote.timeout",
    "passphrase",
];

/// Service for managing journal configuration
pub struct ConfigService {
    repository: FileSystemRepository,
}

impl ConfigService {
    /// Create a new config service
    pub fn new(repository: FileSystemRepository) -> Self {
        ConfigService { repository }
    }

    /// Get a single config value
    pub fn get(&self, key: &str) -> Result<String> {
        let config = self.repository.load_config()?;
        Self::read_key(&config, key)
    }

    /// Set a config value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut config = self.repository.load_config()?;

        match key {
            "remote.url" => config.remote.url = value.trim().to_string(),
            "remote.key" => config.remote.anon_key = value.trim().to_string(),
            "remote.table" => {
                if value.trim().is_empty() {
                    return Err(DiarioError::Config(
                        "remote.table cannot be empty".to_string(),
                    ));
                }
                config.remote.table = value.trim().to_string();
            }
            "remote.timeout" => {
                config.remote.timeout_secs = value.trim().parse().map_err(|_| {
                    DiarioError::Config(format!(
                        "Invalid timeout: '{}'. Expected a number of seconds",
                        value
                    ))
                })?;
            }
            "passphrase" => {
                if value.is_empty() {
                    return Err(DiarioError::Config(
                        "passphrase cannot be empty".to_string(),
                    ));
                }
                config.passphrase = value.to_string();
            }
            _ => return Err(Self::unknown_key(key)),
        }

        self.repository.save_config(&config)
    }

    /// List all config values as key/value pairs
    pub fn list(&self) -> Result<Vec<(&'static str, String)>> {
        let config = self.repository.load_config()?;
        CONFIG_KEYS
            .iter()
            .map(|key| Ok((*key, Self::read_key(&config, key)?)))
            .collect()
    }

    fn read_key(config: &Config, key: &str) -> Result<String> {
        match key {
            "remote.url" => Ok(config.remote.url.clone()),
            "remote.key" => Ok(config.remote.anon_key.clone()),
            "remote.table" => Ok(config.remote.table.clone()),
            "remote.timeout" => Ok(config.remote.timeout_secs.to_string()),
            "passphrase" => Ok(config.passphrase.clone()),
            _ => Err(Self::unknown_key(key)),
        }
    }

    fn unknown_key(key: &str) -> DiarioError {
        DiarioError::Config(format!(
            "Unknown config key: '{}'. Valid keys are: {}",
            key,
            CONFIG_KEYS.join(", ")
        ))
    }
}
