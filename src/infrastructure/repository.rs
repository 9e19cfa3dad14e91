//! Journal directory discovery and layout

use crate::error::{DiarioError, Result};
use crate::infrastructure::{Config, KeyValueStorage};
use std::fs;
use std::path::{Path, PathBuf};

/// Abstract repository for journal operations
pub trait JournalRepository {
    /// Load configuration from .diario/config.toml
    fn load_config(&self) -> Result<Config>;

    /// Save configuration to .diario/config.toml
    fn save_config(&self, config: &Config) -> Result<()>;

    /// Create .diario directory structure
    fn initialize(&self) -> Result<()>;

    /// Key-value storage backing the local fallback store and the session
    fn storage(&self) -> KeyValueStorage;
}

/// File system implementation of JournalRepository
#[derive(Debug, Clone)]
pub struct FileSystemRepository {
    pub root: PathBuf,
}

impl FileSystemRepository {
    /// Create a new repository with the given root directory
    pub fn new(root: PathBuf) -> Self {
        FileSystemRepository { root }
    }

    /// Discover journal root by walking up from current directory
    /// First checks DIARIO_ROOT environment variable, then falls back to discovery
    pub fn discover() -> Result<Self> {
        if let Ok(root_path) = std::env::var("DIARIO_ROOT") {
            let path = PathBuf::from(root_path);
            if Self::has_diario_dir(&path) {
                return Ok(FileSystemRepository::new(path));
            } else {
                return Err(DiarioError::Config(format!(
                    "DIARIO_ROOT is set to '{}' but no .diario directory found. \
                    Run 'diario init' in that directory or unset DIARIO_ROOT.",
                    path.display()
                )));
            }
        }

        let current_dir = std::env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    /// Discover journal root by walking up from a specific starting directory
    pub fn discover_from(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();

        loop {
            if Self::has_diario_dir(&current) {
                return Ok(FileSystemRepository::new(current));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(DiarioError::NotDiarioDirectory(start.to_path_buf())),
            }
        }
    }

    fn has_diario_dir(path: &Path) -> bool {
        path.join(".diario").is_dir()
    }
}

impl JournalRepository for FileSystemRepository {
    fn load_config(&self) -> Result<Config> {
        Config::load_from_dir(&self.root)
    }

    fn save_config(&self, config: &Config) -> Result<()> {
        config.save_to_dir(&self.root)
    }

    fn initialize(&self) -> Result<()> {
        let diario_dir = self.root.join(".diario");

        if diario_dir.exists() {
            return Err(DiarioError::Config(format!(
                "Directory already initialized: {}",
                self.root.display()
            )));
        }

        fs::create_dir_all(diario_dir.join("storage"))?;
        Ok(())
    }

    fn storage(&self) -> KeyValueStorage {
        KeyValueStorage::new(self.root.join(".diario").join("storage"))
    }
}
