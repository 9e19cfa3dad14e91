//! Infrastructure layer - External I/O and persistence

pub mod config;
pub mod local_store;
pub mod remote_store;
pub mod repository;
pub mod storage;

pub use config::{Config, RemoteConfig};
pub use local_store::LocalStore;
pub use remote_store::{RemoteBackend, RemoteStore};
pub use repository::{FileSystemRepository, JournalRepository};
pub use storage::KeyValueStorage;
