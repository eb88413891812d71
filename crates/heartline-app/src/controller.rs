//! Application controller.
//!
//! This module provides the `AppController` which orchestrates the identity
//! store, the live session handle and the post-trial surfaces behind the
//! rendering loop, plus the background watchers that drive the trial
//! countdown and classify agent failures.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{RwLock, watch};
use tokio_util::sync::CancellationToken;

use heartline_core::Result;
use heartline_core::agent::{AgentState, FailureNotice};
use heartline_core::config::AppConfig;
use heartline_core::identity::{Identity, IdentityStore};
use heartline_core::session::SessionHandle;
use heartline_core::suggestion::{
    FlowStep, Suggestion, SuggestionFlow, SuggestionSink, SuggestionText,
};
use heartline_core::trial::{OfferFlag, TrialClock, TrialState};
use heartline_core::view::View;

use crate::toast::{Toast, ToastCenter};

/// Cadence of the trial countdown recomputation.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Orchestrates the whole client behind the rendering loop.
///
/// `AppController` answers the two questions every frame asks: which view
/// to render, and what is on it. User commands mutate state through it,
/// and its background watchers keep the derived state current while a
/// session is live.
///
/// # Responsibilities
///
/// - Routing renders to exactly one of the four views
/// - Forwarding user commands (email, call control, suggestion flow)
/// - Driving the trial countdown while a session is connected
/// - Classifying agent failures into toasts and ending failed sessions
///
/// # Thread Safety
///
/// Shared state lives behind `tokio::sync::RwLock` with a single logical
/// writer per field: only the trial driver raises the offer flag, only
/// user commands clear it. No guard is held across a remote await.
pub struct AppController {
    /// Resolved product configuration.
    config: AppConfig,
    /// Identity over local profile storage and the optional remote directory.
    identity: Arc<IdentityStore>,
    /// Handle to the managed session.
    session: Arc<dyn SessionHandle>,
    /// Remote sink for feature suggestions, when configured.
    suggestion_sink: Option<Arc<dyn SuggestionSink>>,
    /// Whether the post-trial offer screen should show.
    offer: RwLock<OfferFlag>,
    /// Position inside the post-trial suggestion flow.
    flow: RwLock<SuggestionFlow>,
    /// Raised alerts awaiting display.
    toasts: RwLock<ToastCenter>,
    /// Latest countdown state, `None` outside a connected session.
    trial_state: RwLock<Option<TrialState>>,
    /// Change signal the render loop selects on.
    changed: watch::Sender<()>,
}

impl AppController {
    /// Creates a new `AppController`.
    ///
    /// # Arguments
    ///
    /// * `config` - Resolved product configuration
    /// * `identity` - Identity store over local and remote backends
    /// * `session` - Handle to the managed session
    /// * `suggestion_sink` - Remote suggestion sink, or `None` when not configured
    pub fn new(
        config: AppConfig,
        identity: Arc<IdentityStore>,
        session: Arc<dyn SessionHandle>,
        suggestion_sink: Option<Arc<dyn SuggestionSink>>,
    ) -> Self {
        let toasts = ToastCenter::new(config.toast_ttl_secs);
        let (changed, _) = watch::channel(());
        Self {
            config,
            identity,
            session,
            suggestion_sink,
            offer: RwLock::new(OfferFlag::new()),
            flow: RwLock::new(SuggestionFlow::new()),
            toasts: RwLock::new(toasts),
            trial_state: RwLock::new(None),
            changed,
        }
    }

    /// The resolved configuration, for rendering static copy.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Restores a previously stored identity before the first render.
    pub async fn restore_identity(&self) -> Identity {
        let identity = self.identity.load().await;
        self.notify();
        identity
    }

    /// Current identity snapshot.
    pub async fn identity(&self) -> Identity {
        self.identity.identity().await
    }

    /// Submits the email address from the auth view.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Validation` when the trimmed input is
    /// empty; the form stays up and shows the message inline.
    pub async fn submit_email(&self, raw: &str) -> Result<Identity> {
        let identity = self.identity.submit_email(raw).await?;
        self.notify();
        Ok(identity)
    }

    /// Starts a call.
    ///
    /// A lingering post-trial offer is cleared first so the session view
    /// takes over immediately and a later disconnect does not resurface
    /// the old offer. Alerts from a previous attempt are dismissed so the
    /// new call starts with a clean screen.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Session` when the gateway or transport
    /// refuses the dial.
    pub async fn start_call(&self) -> Result<()> {
        self.offer.write().await.dismiss();
        self.flow.write().await.reset();
        self.toasts.write().await.dismiss_all();
        self.notify();
        self.session.start().await
    }

    /// Ends the call without raising the post-trial offer.
    pub async fn end_call(&self) {
        self.session.end().await;
        self.notify();
    }

    /// Dismisses the post-trial offer without leaving a suggestion.
    /// Safe to call when no offer is showing.
    pub async fn dismiss_offer(&self) {
        self.offer.write().await.dismiss();
        self.flow.write().await.reset();
        self.notify();
    }

    /// Advances the post-trial flow from the offer to the entry form.
    pub async fn proceed_to_suggest(&self) {
        self.flow.write().await.proceed();
        self.notify();
    }

    /// Validates and submits a feature suggestion, then shows the thanks
    /// note. Records are keyed by the stored email, falling back to the
    /// literal `"unknown"`.
    ///
    /// With no sink configured the suggestion is accepted locally so the
    /// flow still completes.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Validation` for empty or over-long text
    /// and the sink's error when the remote write fails. Either way the
    /// flow stays on the entry form for a retry.
    pub async fn submit_suggestion(&self, raw: &str) -> Result<()> {
        let text = SuggestionText::validate(raw)?;
        let email = self.identity.identity().await.email_or_unknown();
        let suggestion = Suggestion::new(email, text);

        match &self.suggestion_sink {
            Some(sink) => {
                sink.submit(&suggestion).await?;
                tracing::info!("[AppController] Suggestion stored for {}", suggestion.email);
            }
            None => {
                tracing::info!("[AppController] No suggestion sink configured, accepting locally");
            }
        }

        self.flow.write().await.complete();
        self.notify();
        Ok(())
    }

    /// Leaves the thanks note, returning to the welcome view.
    pub async fn acknowledge_thanks(&self) {
        self.offer.write().await.dismiss();
        self.flow.write().await.reset();
        self.notify();
    }

    /// Selects the view to render from the current inputs.
    pub async fn view(&self) -> View {
        let authenticated = self.identity.identity().await.authenticated;
        let connected = self.session.is_connected();
        let offer_visible = self.offer.read().await.is_visible();
        View::select(authenticated, connected, offer_visible)
    }

    /// The step currently shown on the trial-ended screen.
    pub async fn flow_step(&self) -> FlowStep {
        self.flow.read().await.step()
    }

    /// Latest trial countdown state, `None` outside a connected session.
    pub async fn trial_state(&self) -> Option<TrialState> {
        *self.trial_state.read().await
    }

    /// Toasts still inside their display window, pruned as of now.
    pub async fn active_toasts(&self) -> Vec<Toast> {
        self.toasts.write().await.active(Utc::now())
    }

    /// Whether the media link is currently up.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Current agent lifecycle state, for the session view status line.
    pub fn agent_state(&self) -> AgentState {
        self.session.agent_state()
    }

    /// Subscribes to change notifications. The receiver wakes whenever
    /// any rendered state may have changed; the value carries nothing.
    pub fn subscribe_changes(&self) -> watch::Receiver<()> {
        self.changed.subscribe()
    }

    /// Starts the background watchers for a running application.
    ///
    /// Both tasks live until `cancel` fires. Call once after construction;
    /// nothing raises the offer flag or toasts without them.
    pub fn spawn_watchers(self: &Arc<Self>, cancel: &CancellationToken) {
        let controller = Arc::clone(self);
        let token = cancel.clone();
        tokio::spawn(async move {
            controller.drive_trial_clock(token).await;
        });

        let controller = Arc::clone(self);
        let token = cancel.clone();
        tokio::spawn(async move {
            controller.watch_session(token).await;
        });

        tracing::debug!("[AppController] Watchers spawned");
    }

    /// Drives the trial countdown while a session is connected.
    ///
    /// Parks on session snapshots until the media link comes up, arms the
    /// clock with the connect time, then recomputes the countdown once per
    /// second. Snapshots are sampled, not streamed, so each tick also
    /// compares the link epoch: a hang-up and redial that both land
    /// between two samples leave `connected` true but bump the epoch, and
    /// the clock restarts for the new call. When the free window runs out
    /// the offer flag is raised before the session is ended so the next
    /// disconnected render lands on the offer screen, not the welcome
    /// screen. A disconnect before expiry stops the clock without raising
    /// anything.
    async fn drive_trial_clock(&self, cancel: CancellationToken) {
        let mut clock = TrialClock::new(self.config.timing.clone());
        let mut snapshots = self.session.watch();

        loop {
            // Park until a session connects
            while !snapshots.borrow().connected {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    changed = snapshots.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }

            let mut epoch = snapshots.borrow().epoch;
            clock.start(Utc::now());
            let mut ticker = tokio::time::interval(TICK_INTERVAL);

            // Tick until the window runs out or the session goes away
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = ticker.tick() => {}
                }

                let (connected, current_epoch) = {
                    let snap = snapshots.borrow();
                    (snap.connected, snap.epoch)
                };
                if !connected {
                    clock.stop();
                    break;
                }
                if current_epoch != epoch {
                    tracing::info!("[TrialDriver] New link while ticking, restarting countdown");
                    epoch = current_epoch;
                    clock.start(Utc::now());
                }

                let Some(tick) = clock.tick(Utc::now()) else {
                    break;
                };
                self.publish_trial_state(Some(tick.state)).await;

                if tick.just_ended {
                    self.finish_trial().await;
                    break;
                }
            }

            self.publish_trial_state(None).await;
        }
    }

    /// Raises the post-trial offer, then ends the session.
    ///
    /// Order matters: the offer must be visible before the disconnect can
    /// be observed, otherwise a render between the two would fall back to
    /// the welcome view.
    async fn finish_trial(&self) {
        tracing::info!("[TrialDriver] Free window exhausted, ending session");
        self.offer.write().await.raise();
        self.flow.write().await.reset();
        self.notify();
        self.session.end().await;
    }

    /// Publishes the countdown state for rendering, waking the render
    /// loop only when the visible value actually changed.
    async fn publish_trial_state(&self, state: Option<TrialState>) {
        let changed = {
            let mut current = self.trial_state.write().await;
            let changed = *current != state;
            *current = state;
            changed
        };
        if changed {
            self.notify();
        }
    }

    /// Mirrors session snapshots into the UI and classifies failures.
    ///
    /// Every snapshot change pokes the change notifier so render loops
    /// pick up connects and disconnects. A transition into failed while
    /// the link is up raises exactly one toast per occurrence, latched
    /// until the next disconnect, and then ends the session.
    async fn watch_session(&self, cancel: CancellationToken) {
        let mut snapshots = self.session.watch();
        let mut latched = false;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }

            let snapshot = snapshots.borrow().clone();
            if !snapshot.connected {
                latched = false;
            } else if snapshot.agent.is_failed() && !latched {
                latched = true;
                self.report_failure(&snapshot.reasons).await;
            }
            self.notify();
        }
    }

    /// Raises the failure toast, then tears the session down.
    async fn report_failure(&self, reasons: &[String]) {
        let notice = FailureNotice::classify(reasons);
        tracing::warn!(
            "[SessionWatcher] Agent failed (init_timeout: {}): {:?}",
            notice.init_timeout,
            notice.reasons
        );
        self.toasts
            .write()
            .await
            .push(notice.title(), notice.description_lines());
        self.notify();
        self.session.end().await;
    }

    fn notify(&self) {
        self.changed.send_replace(());
    }
}
