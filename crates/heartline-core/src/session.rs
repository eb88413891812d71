//! Session seam.
//!
//! This module defines the `SessionHandle` trait which is implemented
//! by the managed session in the `heartline-session` crate.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::agent::AgentState;
use crate::error::Result;

/// Point-in-time view of the live session, published on the watch channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Whether the media link is up.
    pub connected: bool,
    /// Agent lifecycle state.
    pub agent: AgentState,
    /// Failure reasons reported by the agent, empty unless failed.
    pub reasons: Vec<String>,
    /// Counts media links over the process lifetime. The watch channel
    /// keeps only the latest value, so a sampler that reads two connected
    /// snapshots with different epochs knows the call was torn down and
    /// redialed in between.
    pub epoch: u64,
}

impl SessionSnapshot {
    /// Clears the link fields back to disconnected while keeping the
    /// epoch, so samplers can still tell which link they last saw.
    pub fn clear_link(&mut self) {
        self.connected = false;
        self.agent = AgentState::Idle;
        self.reasons.clear();
    }
}

// Forward declaration - heartline-session will provide this.
// We use dynamic dispatch to avoid circular dependencies.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Starts the session. Idempotent while a session is already live.
    async fn start(&self) -> Result<()>;

    /// Ends the session and tears down the media link. Idempotent.
    async fn end(&self);

    /// Whether the media link is currently up.
    fn is_connected(&self) -> bool;

    /// Current agent lifecycle state.
    fn agent_state(&self) -> AgentState;

    /// Failure reasons reported by the agent, empty unless failed.
    fn failure_reasons(&self) -> Vec<String>;

    /// Subscribes to session snapshots.
    ///
    /// The receiver always observes the latest value; intermediate states
    /// may be skipped but the final state of any transition is never lost.
    /// Samplers that must notice a skipped disconnect compare `epoch`.
    fn watch(&self) -> watch::Receiver<SessionSnapshot>;
}
