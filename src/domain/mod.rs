//! Domain layer - Business logic and domain models

pub mod connectivity;
pub mod entry;

pub use connectivity::ConnectivityState;
pub use entry::{sort_newest_first, Author, JournalEntry, StoredEntry};
