//! Agent lifecycle state as reported by the session layer.

use serde::{Deserialize, Serialize};

/// State of the remote conversational agent inside a session.
///
/// Mirrors the states the external agent runtime reports; the core only
/// ever branches on `Failed` (and renders the rest).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum AgentState {
    /// No session in progress.
    #[default]
    Idle,
    /// Session is dialing or the agent is warming up.
    Connecting,
    /// Agent is live and audible.
    Connected,
    /// Agent reported failure reasons; see `FailureNotice`.
    Failed,
}

impl AgentState {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_labels() {
        assert_eq!(AgentState::Idle.to_string(), "idle");
        assert_eq!(AgentState::Connecting.to_string(), "connecting");
        assert_eq!(AgentState::Connected.to_string(), "connected");
        assert_eq!(AgentState::Failed.to_string(), "failed");
    }
}
