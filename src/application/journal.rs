//! Persistence facade over the remote store and the local fallback
//!
//! Callers get one CRUD contract. Which store serves a call depends on the
//! session's [`ConnectivityState`]: remote while `Online`, local otherwise.
//! Remote failures are logged, recorded in a side-channel and downgrade the
//! session to `Offline`; they never reach the caller as a hard fault.

use crate::domain::{sort_newest_first, ConnectivityState, JournalEntry};
use crate::error::{DiarioError, Result};
use crate::infrastructure::{
    FileSystemRepository, JournalRepository, LocalStore, RemoteBackend, RemoteStore,
};
use std::fmt;
use tracing::{debug, info, warn};

/// What a migration attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Remote store not reachable, nothing attempted
    Offline,
    /// The local flag says this already ran
    AlreadyMigrated,
    /// No local entries to copy
    NothingToMigrate,
    /// Remote store already has entries, assumed migrated
    RemoteNotEmpty,
    /// Copied this many entries
    Migrated(usize),
    /// Bulk insert failed; retried next session
    Failed,
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationOutcome::Offline => write!(f, "Remote store unreachable, migration skipped"),
            MigrationOutcome::AlreadyMigrated => write!(f, "Local entries were already migrated"),
            MigrationOutcome::NothingToMigrate => write!(f, "No local entries to migrate"),
            MigrationOutcome::RemoteNotEmpty => {
                write!(f, "Remote store already has entries, migration skipped")
            }
            MigrationOutcome::Migrated(n) => write!(f, "Migrated {} entries", n),
            MigrationOutcome::Failed => write!(f, "Migration failed, will retry next time"),
        }
    }
}

pub struct JournalService<R: RemoteBackend> {
    remote: R,
    local: LocalStore,
    state: ConnectivityState,
    last_failure: Option<DiarioError>,
}

impl<R: RemoteBackend> JournalService<R> {
    /// Create a service in the `Unknown` state; the first operation probes
    pub fn new(remote: R, local: LocalStore) -> Self {
        JournalService {
            remote,
            local,
            state: ConnectivityState::Unknown,
            last_failure: None,
        }
    }

    /// Create a service and probe the remote store right away
    pub fn connect(remote: R, local: LocalStore) -> Self {
        let mut service = Self::new(remote, local);
        service.probe_connectivity();
        service
    }

    pub fn status(&self) -> ConnectivityState {
        self.state
    }

    /// Most recent remote failure, if any
    pub fn last_failure(&self) -> Option<&DiarioError> {
        self.last_failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<DiarioError> {
        self.last_failure.take()
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Lightweight read against the remote store
    pub fn probe_connectivity(&mut self) -> bool {
        let reachable = match self.remote.probe() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "remote store probe failed");
                self.last_failure = Some(DiarioError::Connectivity(e.to_string()));
                false
            }
        };

        self.state = self.state.after_probe(reachable);
        info!(state = %self.state, "connectivity resolved");
        self.state.is_online()
    }

    /// Entries newest-first; empty on failure, see [`Self::last_failure`]
    pub fn list_entries(&mut self) -> Vec<JournalEntry> {
        if !self.use_remote() {
            return self.local.list();
        }

        match self.remote.list() {
            Ok(mut entries) => {
                sort_newest_first(&mut entries);
                entries
            }
            Err(e) => {
                self.degrade("list", e);
                Vec::new()
            }
        }
    }

    /// Store a new entry. Title and content are expected to be non-empty.
    pub fn create_entry(
        &mut self,
        title: &str,
        content: &str,
        author: &str,
    ) -> Result<JournalEntry> {
        if !self.use_remote() {
            return self.local.create(title, content, author);
        }

        self.remote
            .create(title, content, author)
            .map_err(|e| self.fail("create", e))
    }

    pub fn update_entry(&mut self, id: &str, title: &str, content: &str) -> Result<JournalEntry> {
        if !self.use_remote() {
            return self.local.update(id, title, content);
        }

        self.remote
            .update(id, title, content)
            .map_err(|e| self.fail("update", e))
    }

    /// Whether an entry with this id existed and was removed
    pub fn delete_entry(&mut self, id: &str) -> bool {
        let result = if self.use_remote() {
            self.remote.delete(id).map_err(|e| self.fail("delete", e))
        } else {
            self.local.delete(id)
        };

        result.unwrap_or_else(|e| {
            warn!(id = %id, error = %e, "delete failed");
            false
        })
    }

    /// Copy local entries to the remote store once.
    ///
    /// A remote store that already holds entries counts as migrated.
    pub fn migrate_local_to_remote(&mut self) -> MigrationOutcome {
        if !self.use_remote() {
            return MigrationOutcome::Offline;
        }
        if self.local.is_migrated() {
            return MigrationOutcome::AlreadyMigrated;
        }

        let entries = self.local.list();
        if entries.is_empty() {
            return MigrationOutcome::NothingToMigrate;
        }

        match self.remote.list() {
            Ok(existing) if !existing.is_empty() => {
                info!(rows = existing.len(), "remote store not empty, skipping migration");
                self.mark_migrated();
                return MigrationOutcome::RemoteNotEmpty;
            }
            Ok(_) => {}
            Err(e) => {
                self.degrade("migrate", e);
                return MigrationOutcome::Failed;
            }
        }

        match self.remote.insert_all(&entries) {
            Ok(()) => {
                info!(count = entries.len(), "migrated local entries to remote store");
                self.mark_migrated();
                MigrationOutcome::Migrated(entries.len())
            }
            Err(e) => {
                self.degrade("migrate", e);
                MigrationOutcome::Failed
            }
        }
    }

    fn use_remote(&mut self) -> bool {
        if self.state.is_unknown() {
            self.probe_connectivity();
        }
        self.state.is_online()
    }

    fn mark_migrated(&self) {
        if let Err(e) = self.local.mark_migrated() {
            warn!(error = %e, "failed to record migration flag");
        }
    }

    /// Record a remote failure and drop to the local store for the rest of the session
    fn degrade(&mut self, operation: &str, err: DiarioError) -> String {
        let message = format!("{} failed: {}", operation, err);
        warn!(
            operation = operation,
            error = %err,
            "remote store failed, switching to local store"
        );
        self.state = self.state.after_remote_failure();
        self.last_failure = Some(DiarioError::Connectivity(message.clone()));
        message
    }

    /// Map a remote error for the caller, degrading on connectivity problems
    fn fail(&mut self, operation: &str, err: DiarioError) -> DiarioError {
        if err.is_connectivity() {
            DiarioError::Connectivity(self.degrade(operation, err))
        } else {
            debug!(operation = operation, error = %err, "remote operation rejected");
            err
        }
    }
}

/// Build the service for the journal at `repository` and probe the remote store
pub fn connect_journal(repository: &FileSystemRepository) -> Result<JournalService<RemoteStore>> {
    let config = repository.load_config()?;
    let remote = RemoteStore::new(&config.effective_remote())?;
    let local = LocalStore::new(repository.storage());

    Ok(JournalService::connect(remote, local))
}

/// Like [`connect_journal`], also running the one-time migration when online
pub fn open_journal(repository: &FileSystemRepository) -> Result<JournalService<RemoteStore>> {
    let mut service = connect_journal(repository)?;
    if service.status().is_online() {
        let outcome = service.migrate_local_to_remote();
        debug!(outcome = %outcome, "startup migration");
    }

    Ok(service)
}
