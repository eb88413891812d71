//! In-process simulated transport.
//!
//! Plays back a scripted session without any media stack: link up,
//! then agent ready (or a scripted failure) after a configurable delay,
//! then optionally a remote hangup. Useful for offline development and
//! for testing timeout handling.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use heartline_core::Result;

use crate::transport::{ConnectionDetails, MediaTransport, TransportEvent};

/// A transport that simulates the remote side.
pub struct LoopbackTransport {
    ready_delay: Duration,
    failure: Option<Vec<String>>,
    disconnect_after: Option<Duration>,
    live: Mutex<Option<CancellationToken>>,
}

impl LoopbackTransport {
    /// Creates a transport whose agent becomes ready after `ready_delay`.
    pub fn new(ready_delay: Duration) -> Self {
        Self {
            ready_delay,
            failure: None,
            disconnect_after: None,
            live: Mutex::new(None),
        }
    }

    /// Creates a transport with a ready delay in seconds.
    pub fn ready_in_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Scripts an agent failure instead of readiness.
    pub fn with_failure(mut self, reasons: Vec<String>) -> Self {
        self.failure = Some(reasons);
        self
    }

    /// Scripts a remote hangup this long after link-up.
    pub fn with_disconnect_after(mut self, after: Duration) -> Self {
        self.disconnect_after = Some(after);
        self
    }
}

#[async_trait]
impl MediaTransport for LoopbackTransport {
    async fn connect(&self, details: &ConnectionDetails) -> Result<mpsc::Receiver<TransportEvent>> {
        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();

        {
            let mut live = self.live.lock().await;
            if let Some(previous) = live.replace(cancel.clone()) {
                previous.cancel();
            }
        }

        tracing::debug!("[LoopbackTransport] Simulating session {}", details.session_id);
        tokio::spawn(feed(
            tx,
            self.ready_delay,
            self.failure.clone(),
            self.disconnect_after,
            cancel,
        ));
        Ok(rx)
    }

    async fn disconnect(&self) {
        if let Some(cancel) = self.live.lock().await.take() {
            cancel.cancel();
        }
    }
}

/// Plays the scripted events until done or cancelled.
async fn feed(
    tx: mpsc::Sender<TransportEvent>,
    ready_delay: Duration,
    mut failure: Option<Vec<String>>,
    disconnect_after: Option<Duration>,
    cancel: CancellationToken,
) {
    if tx.send(TransportEvent::LinkUp).await.is_err() {
        return;
    }

    let ready_at = tokio::time::sleep(ready_delay);
    tokio::pin!(ready_at);
    let mut ready_pending = true;

    let close_at = tokio::time::sleep(disconnect_after.unwrap_or_default());
    tokio::pin!(close_at);
    let mut close_scripted = disconnect_after.is_some();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = &mut ready_at, if ready_pending => {
                ready_pending = false;
                let event = match failure.take() {
                    Some(reasons) => TransportEvent::AgentFailed(reasons),
                    None => TransportEvent::AgentReady,
                };
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            _ = &mut close_at, if close_scripted => {
                close_scripted = false;
                let _ = tx.send(TransportEvent::Closed).await;
                return;
            }
        }
    }
}
