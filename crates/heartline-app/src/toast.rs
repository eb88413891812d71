//! Transient user-facing alerts.

use chrono::{DateTime, TimeDelta, Utc};

/// A transient alert raised by a background watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    /// Display lines under the title, already formatted.
    pub body: Vec<String>,
    pub raised_at: DateTime<Utc>,
}

/// Holds raised toasts and prunes them after a fixed display window.
///
/// There is no background dismissal task; callers pass the current time
/// to `active` on their render cadence and expiry falls out of pruning.
#[derive(Debug)]
pub struct ToastCenter {
    ttl: TimeDelta,
    toasts: Vec<Toast>,
}

impl ToastCenter {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: TimeDelta::seconds(ttl_secs as i64),
            toasts: Vec::new(),
        }
    }

    /// Raises a toast stamped with the current time.
    pub fn push(&mut self, title: impl Into<String>, body: Vec<String>) {
        let toast = Toast {
            title: title.into(),
            body,
            raised_at: Utc::now(),
        };
        tracing::debug!("[ToastCenter] Raised toast: {}", toast.title);
        self.toasts.push(toast);
    }

    /// Returns the toasts still inside their display window as of `now`,
    /// dropping the expired ones.
    pub fn active(&mut self, now: DateTime<Utc>) -> Vec<Toast> {
        let ttl = self.ttl;
        self.toasts.retain(|toast| now - toast.raised_at < ttl);
        self.toasts.clone()
    }

    /// Drops every toast immediately.
    pub fn dismiss_all(&mut self) {
        self.toasts.clear();
    }
}
