//! diario - Shared household journal
//!
//! Journal entries live in a hosted datastore when it is reachable and in
//! on-device storage otherwise, with a one-time migration from the latter to
//! the former.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::DiarioError;
