//! On-device key-value storage
//!
//! Each key is one file under `.diario/storage/`. Values are plain text.

use crate::error::{DiarioError, Result};
use std::fs;
use std::path::PathBuf;

/// Key holding the serialized entry collection
pub const MESSAGES_KEY: &str = "messages";
/// Presence flag recording that the local entries were copied to the remote store
pub const MIGRATED_KEY: &str = "migrated_to_supabase";
pub const USER_KEY: &str = "user";
pub const AUTHENTICATED_KEY: &str = "isAuthenticated";

#[derive(Debug, Clone)]
pub struct KeyValueStorage {
    dir: PathBuf,
}

impl KeyValueStorage {
    pub fn new(dir: PathBuf) -> Self {
        KeyValueStorage { dir }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(DiarioError::Config(format!("Invalid storage key: '{}'", key)));
        }
        Ok(self.dir.join(key))
    }

    /// Read a value; `None` when the key was never set
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DiarioError::Io(e)),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Write a value by writing a temp file beside it and renaming it into place.
    ///
    /// On Windows, `rename` does not overwrite existing files, so the old value is removed first.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp_path = self
            .dir
            .join(format!(".{}.tmp-{}", key, std::process::id()));
        fs::write(&tmp_path, value)?;

        if cfg!(windows) && path.exists() {
            fs::remove_file(&path)?;
        }

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Remove a key; removing a missing key is not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DiarioError::Io(e)),
        }
    }
}
