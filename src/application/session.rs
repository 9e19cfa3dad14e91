//! Login session use case
//!
//! The session lives in the `user` and `isAuthenticated` storage keys. The
//! passphrase check is a gate for the household, not access control.

use crate::domain::Author;
use crate::error::{DiarioError, Result};
use crate::infrastructure::storage::{AUTHENTICATED_KEY, USER_KEY};
use crate::infrastructure::KeyValueStorage;
use std::str::FromStr;
use tracing::{debug, warn};

/// The logged-in user, handed to whatever writes entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub author: Author,
}

/// Service for logging in and out
pub struct SessionService {
    storage: KeyValueStorage,
    passphrase: String,
}

impl SessionService {
    pub fn new(storage: KeyValueStorage, passphrase: impl Into<String>) -> Self {
        SessionService {
            storage,
            passphrase: passphrase.into(),
        }
    }

    pub fn login(&self, user: &str, passphrase: &str) -> Result<Session> {
        let author = Author::from_str(user).map_err(DiarioError::Session)?;
        if passphrase != self.passphrase {
            return Err(DiarioError::Session("Incorrect passphrase".to_string()));
        }

        self.storage.set(USER_KEY, author.as_str())?;
        self.storage.set(AUTHENTICATED_KEY, "true")?;
        debug!(user = %author, "logged in");

        Ok(Session { author })
    }

    pub fn logout(&self) -> Result<()> {
        self.storage.remove(USER_KEY)?;
        self.storage.remove(AUTHENTICATED_KEY)
    }

    /// The stored session, if both keys are present and valid
    pub fn current(&self) -> Result<Option<Session>> {
        let authenticated = self.storage.get(AUTHENTICATED_KEY)?;
        if authenticated.as_deref().map(str::trim) != Some("true") {
            return Ok(None);
        }

        let Some(user) = self.storage.get(USER_KEY)? else {
            return Ok(None);
        };

        match Author::from_str(&user) {
            Ok(author) => Ok(Some(Session { author })),
            Err(e) => {
                warn!(error = %e, "ignoring stored session");
                Ok(None)
            }
        }
    }

    /// The current session, or a `Session` error when nobody is logged in
    pub fn require(&self) -> Result<Session> {
        self.current()?
            .ok_or_else(|| DiarioError::Session("Not logged in".to_string()))
    }
}
