//! Application layer - Use cases and orchestration

pub mod init;
pub mod journal;
pub mod manage_config;
pub mod session;

pub use journal::{connect_journal, open_journal, JournalService, MigrationOutcome};
pub use manage_config::ConfigService;
pub use session::{Session, SessionService};
