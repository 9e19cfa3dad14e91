//! Error types for diario

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for diario application
#[derive(Debug, Error)]
pub enum DiarioError {
    #[error("Not a diario directory: {0}")]
    NotDiarioDirectory(PathBuf),

    #[error("Remote store unreachable: {0}")]
    Connectivity(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Malformed stored data: {0}")]
    Parse(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl DiarioError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            DiarioError::NotDiarioDirectory(_) => 2,
            DiarioError::NotFound(_) => 3,
            DiarioError::Session(_) => 4,
            _ => 1,
        }
    }

    /// Whether this error means the remote store could not be used
    pub fn is_connectivity(&self) -> bool {
        matches!(self, DiarioError::Connectivity(_) | DiarioError::Parse(_))
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            DiarioError::NotDiarioDirectory(path) => {
                format!(
                    "Not a diario directory: {}\n\n\
                    Suggestions:\n\
                    • Run 'diario init' in this directory to create a new journal\n\
                    • Navigate to an existing diario directory\n\
                    • Set DIARIO_ROOT environment variable to your journal path",
                    path.display()
                )
            }
            DiarioError::NotFound(id) => {
                format!(
                    "No entry with id '{}'\n\n\
                    Suggestions:\n\
                    • Use 'diario list' to see entry ids\n\
                    • Entries written while offline only exist in the local store",
                    id
                )
            }
            DiarioError::Session(msg) => {
                format!(
                    "{}\n\n\
                    Suggestions:\n\
                    • Log in first: diario login Esposa <passphrase>\n\
                    • Valid users: Esposa, Esposo",
                    msg
                )
            }
            DiarioError::Config(msg) => {
                if msg.contains("Unknown config key") {
                    format!(
                        "{}\n\n\
                        Example: diario config remote.url https://example.supabase.co",
                        msg
                    )
                } else {
                    msg.clone()
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using DiarioError
pub type Result<T> = std::result::Result<T, DiarioError>;
