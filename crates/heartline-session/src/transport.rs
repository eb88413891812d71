//! Media transport seam.
//!
//! The voice stack itself (codecs, media protocol, audio devices) is a
//! pre-built external collaborator. This module defines the narrow
//! boundary the client talks to it through: dial with connection
//! details, then observe lifecycle events. Audio never crosses this
//! boundary.

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use heartline_core::Result;

/// Everything needed to dial the media server for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDetails {
    /// Media server endpoint.
    pub server_url: String,
    /// Short-lived participant token minted by the gateway.
    pub token: String,
    /// Server-side session identifier.
    pub session_id: String,
}

impl ConnectionDetails {
    /// Details for an in-process session with no remote media server.
    pub fn local() -> Self {
        Self {
            server_url: "loopback://local".to_string(),
            token: String::new(),
            session_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Lifecycle events a transport reports while a session is live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Media link established.
    LinkUp,
    /// The remote agent joined and finished initializing.
    AgentReady,
    /// The remote agent failed with the given reasons.
    AgentFailed(Vec<String>),
    /// Link closed, remote hangup or network loss.
    Closed,
}

/// Boundary to the pre-built media stack.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Dials the media server and returns the event stream for the
    /// session. Dropping or closing the stream means the link is gone.
    async fn connect(&self, details: &ConnectionDetails) -> Result<mpsc::Receiver<TransportEvent>>;

    /// Tears the link down. Idempotent.
    async fn disconnect(&self);
}
