//! Connectivity state of the remote store for one session

use std::fmt;

/// Which store backs the session's operations.
///
/// `Offline` is sticky: once a session has been downgraded nothing moves it
/// back to `Online`. A new session starts again from `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    /// No probe has run yet
    #[default]
    Unknown,
    /// Remote store reachable, operations go remote
    Online,
    /// Remote store unreachable, operations go to the local fallback
    Offline,
}

impl ConnectivityState {
    /// State after a probe of the remote store
    pub fn after_probe(self, reachable: bool) -> Self {
        match (self, reachable) {
            (ConnectivityState::Offline, _) => ConnectivityState::Offline,
            (_, true) => ConnectivityState::Online,
            (_, false) => ConnectivityState::Offline,
        }
    }

    /// State after a remote operation failed
    pub fn after_remote_failure(self) -> Self {
        ConnectivityState::Offline
    }

    pub fn is_online(self) -> bool {
        self == ConnectivityState::Online
    }

    pub fn is_unknown(self) -> bool {
        self == ConnectivityState::Unknown
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectivityState::Unknown => "unknown",
            ConnectivityState::Online => "online",
            ConnectivityState::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
