//! Managed session lifecycle.
//!
//! `ManagedSession` owns one call at a time: it fetches connection
//! details, dials the transport, translates transport events into
//! session snapshots on a watch channel, and enforces the
//! agent-readiness deadline. Consumers only see the `SessionHandle`
//! trait.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use heartline_core::Result;
use heartline_core::agent::AgentState;
use heartline_core::session::{SessionHandle, SessionSnapshot};

use crate::gateway::GatewayClient;
use crate::transport::{ConnectionDetails, MediaTransport, TransportEvent};

/// Reason recorded when the agent misses the readiness deadline. The
/// wording matters: the failure classifier keys on it to explain agent
/// warm-up to the user.
pub const AGENT_INIT_TIMEOUT_REASON: &str = "Agent did not complete initializing in time";

struct LiveTask {
    cancel: CancellationToken,
    driver: JoinHandle<()>,
}

/// `SessionHandle` implementation over a gateway and a media transport.
///
/// Without a gateway the session dials with locally generated details,
/// which is what `--offline` mode and tests do.
pub struct ManagedSession {
    gateway: Option<GatewayClient>,
    transport: Arc<dyn MediaTransport>,
    ready_deadline: Duration,
    state: watch::Sender<SessionSnapshot>,
    live: Mutex<Option<LiveTask>>,
    /// Hands each dial a fresh snapshot epoch.
    links: AtomicU64,
}

impl ManagedSession {
    /// Creates a session manager.
    ///
    /// # Arguments
    ///
    /// * `gateway` - signaling client, or `None` to dial locally
    /// * `transport` - media transport to drive
    /// * `ready_deadline` - how long the agent gets to finish initializing
    pub fn new(
        gateway: Option<GatewayClient>,
        transport: Arc<dyn MediaTransport>,
        ready_deadline: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            gateway,
            transport,
            ready_deadline,
            state,
            live: Mutex::new(None),
            links: AtomicU64::new(0),
        }
    }

    async fn dial(&self) -> Result<mpsc::Receiver<TransportEvent>> {
        let details = match &self.gateway {
            Some(gateway) => gateway.connection_details().await?,
            None => ConnectionDetails::local(),
        };
        tracing::info!("[ManagedSession] Dialing session {}", details.session_id);
        self.transport.connect(&details).await
    }
}

#[async_trait]
impl SessionHandle for ManagedSession {
    /// Starts a session.
    ///
    /// A second call while a session is live or a dial is in flight is a
    /// no-op; a driver that already exited on a remote close does not
    /// count as live and its slot is reclaimed for the redial. The guard
    /// is not held across the dial; the pending state is re-validated
    /// afterwards so an `end()` issued mid-dial wins.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Session` when signaling or the transport
    /// dial fails. Agent failures after this point are not errors here;
    /// they surface through the watch channel.
    async fn start(&self) -> Result<()> {
        let epoch;
        {
            let mut live = self.live.lock().await;
            if live.as_ref().is_some_and(|task| task.driver.is_finished()) {
                // The driver exits on its own when the remote side hangs
                // up; reap it here so the slot does not block the redial.
                *live = None;
            }
            if live.is_some() || self.state.borrow().agent == AgentState::Connecting {
                tracing::debug!("[ManagedSession] start() ignored, session already live");
                return Ok(());
            }
            epoch = self.links.fetch_add(1, Ordering::Relaxed) + 1;
            self.state.send_modify(|snap| {
                snap.clear_link();
                snap.agent = AgentState::Connecting;
            });
        }

        let events = match self.dial().await {
            Ok(events) => events,
            Err(e) => {
                self.state.send_modify(|snap| snap.clear_link());
                return Err(e);
            }
        };

        let mut live = self.live.lock().await;
        if self.state.borrow().agent != AgentState::Connecting {
            // end() hit while the dial was in flight; abandon the link.
            drop(live);
            self.transport.disconnect().await;
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let driver = tokio::spawn(drive(
            events,
            self.state.clone(),
            self.ready_deadline,
            epoch,
            cancel.clone(),
        ));
        *live = Some(LiveTask { cancel, driver });
        Ok(())
    }

    async fn end(&self) {
        let task = { self.live.lock().await.take() };
        match task {
            Some(task) => {
                tracing::info!("[ManagedSession] Ending session");
                task.cancel.cancel();
                self.transport.disconnect().await;
                let _ = task.driver.await;
            }
            None => {
                // A dial may still be in flight; resetting the pending
                // state makes the dialer abandon it on return.
                self.state.send_modify(|snap| {
                    if snap.agent == AgentState::Connecting {
                        snap.clear_link();
                    }
                });
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    fn agent_state(&self) -> AgentState {
        self.state.borrow().agent
    }

    fn failure_reasons(&self) -> Vec<String> {
        self.state.borrow().reasons.clone()
    }

    fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }
}

/// Event loop for one live session.
///
/// Runs until the transport closes or the session is cancelled, then
/// resets the snapshot to disconnected. The link epoch is stamped onto
/// the snapshot together with `connected`, in one publish.
async fn drive(
    mut events: mpsc::Receiver<TransportEvent>,
    state: watch::Sender<SessionSnapshot>,
    ready_deadline: Duration,
    epoch: u64,
    cancel: CancellationToken,
) {
    let deadline = tokio::time::sleep(ready_deadline);
    tokio::pin!(deadline);
    let mut deadline_armed = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("[ManagedSession] Driver cancelled");
                break;
            }
            _ = &mut deadline, if deadline_armed => {
                deadline_armed = false;
                tracing::warn!(
                    "[ManagedSession] Agent not ready after {:?}, marking failed",
                    ready_deadline
                );
                state.send_modify(|snap| {
                    snap.agent = AgentState::Failed;
                    snap.reasons = vec![AGENT_INIT_TIMEOUT_REASON.to_string()];
                });
                // Keep draining events; the failure watcher decides when
                // to tear the session down.
            }
            event = events.recv() => {
                match event {
                    Some(TransportEvent::LinkUp) => {
                        tracing::info!("[ManagedSession] Media link {} up", epoch);
                        state.send_modify(|snap| {
                            snap.connected = true;
                            snap.epoch = epoch;
                        });
                    }
                    Some(TransportEvent::AgentReady) => {
                        deadline_armed = false;
                        tracing::info!("[ManagedSession] Agent ready");
                        state.send_modify(|snap| snap.agent = AgentState::Connected);
                    }
                    Some(TransportEvent::AgentFailed(reasons)) => {
                        deadline_armed = false;
                        tracing::warn!("[ManagedSession] Agent failed: {:?}", reasons);
                        state.send_modify(|snap| {
                            snap.agent = AgentState::Failed;
                            snap.reasons = reasons;
                        });
                    }
                    Some(TransportEvent::Closed) | None => {
                        tracing::info!("[ManagedSession] Media link closed");
                        break;
                    }
                }
            }
        }
    }

    state.send_modify(|snap| snap.clear_link());
}
