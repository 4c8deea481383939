//! The backend service seam.
//!
//! The application only ever does two things with the backend: ask it to
//! connect once at startup, and hand a reference to it to controllers.  The
//! WebSocket implementation lives in `infrastructure::jeebus`.

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// Link state as seen by the backend client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// `connect` has not been called yet.
    #[default]
    Idle,
    Connecting,
    Connected,
    /// The attempt failed; the string is the reason.
    Failed(String),
    /// The server closed a previously established connection.
    Closed,
}

impl ConnectionStatus {
    /// `true` while an attempt is in flight or the link is up.
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionStatus::Connecting | ConnectionStatus::Connected)
    }
}

/// The surface of the backend service the application consumes.
#[cfg_attr(test, automock)]
pub trait BackendClient: Send + Sync {
    /// Starts connecting to `service` and returns immediately.  The outcome
    /// is the client's business.
    fn connect(&self, service: &str);

    /// Current link state.
    fn status(&self) -> ConnectionStatus;
}

/// Shared handle to the backend client, injected into controllers.
pub type BackendHandle = Arc<dyn BackendClient>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active_only_for_connecting_and_connected() {
        assert!(ConnectionStatus::Connecting.is_active());
        assert!(ConnectionStatus::Connected.is_active());
        assert!(!ConnectionStatus::Idle.is_active());
        assert!(!ConnectionStatus::Closed.is_active());
        assert!(!ConnectionStatus::Failed("x".into()).is_active());
    }
}
