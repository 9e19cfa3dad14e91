//! Configuration management

use crate::error::{DiarioError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_TABLE: &str = "messages";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PASSPHRASE: &str = "1606";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Shared login passphrase. Not a security boundary.
    #[serde(default = "default_passphrase")]
    pub passphrase: String,
}

/// Connection settings for the hosted datastore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: String::new(),
            anon_key: String::new(),
            table: default_table(),
            timeout_secs: default_timeout(),
        }
    }
}

impl RemoteConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_passphrase() -> String {
    DEFAULT_PASSPHRASE.to_string()
}

impl Config {
    /// Create a new config pointing at the given remote
    pub fn new(url: Option<String>, anon_key: Option<String>) -> Self {
        Config {
            remote: RemoteConfig {
                url: url.unwrap_or_default(),
                anon_key: anon_key.unwrap_or_default(),
                ..RemoteConfig::default()
            },
            passphrase: default_passphrase(),
        }
    }

    /// Load config from .diario/config.toml in the given directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(".diario").join("config.toml");

        let contents = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DiarioError::NotDiarioDirectory(path.to_path_buf())
            } else {
                DiarioError::Io(e)
            }
        })?;

        toml::from_str(&contents)
            .map_err(|e| DiarioError::Config(format!("Failed to parse config.toml: {}", e)))
    }

    /// Save config to .diario/config.toml in the given directory
    pub fn save_to_dir(&self, path: &Path) -> Result<()> {
        let diario_dir = path.join(".diario");
        let config_path = diario_dir.join("config.toml");

        if !diario_dir.exists() {
            fs::create_dir(&diario_dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Remote settings with DIARIO_REMOTE_URL / DIARIO_REMOTE_KEY applied on top
    pub fn effective_remote(&self) -> RemoteConfig {
        let mut remote = self.remote.clone();
        if let Ok(url) = std::env::var("DIARIO_REMOTE_URL") {
            remote.url = url;
        }
        if let Ok(key) = std::env::var("DIARIO_REMOTE_KEY") {
            remote.anon_key = key;
        }
        remote
    }
}
