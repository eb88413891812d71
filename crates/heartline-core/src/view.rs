//! View selection.
//!
//! Exactly one screen is visible at any time, chosen from three live
//! signals. Selection is a total, side-effect-free function; everything
//! that changes the inputs (authenticating, connecting, raising or
//! clearing the offer flag) lives with the components that own those
//! signals.

use serde::{Deserialize, Serialize};

/// The four screens of the product.
///
/// `Display` renders a lowercase label for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum View {
    /// Email gate.
    Auth,
    /// Signed in, ready to start a call.
    Welcome,
    /// Live call with the agent.
    Session,
    /// Post-trial offer and suggestion flow.
    #[strum(serialize = "trial ended")]
    TrialEnded,
}

impl View {
    /// Selects the visible screen.
    ///
    /// Precedence, first match wins:
    /// 1. not authenticated → `Auth`
    /// 2. authenticated, not connected, offer raised → `TrialEnded`
    /// 3. authenticated, not connected, no offer → `Welcome`
    /// 4. authenticated, connected → `Session`
    ///
    /// The offer flag is only consulted while disconnected, so an active
    /// call always renders the session screen.
    pub fn select(authenticated: bool, connected: bool, offer_visible: bool) -> Self {
        match (authenticated, connected, offer_visible) {
            (false, _, _) => View::Auth,
            (true, false, true) => View::TrialEnded,
            (true, false, false) => View::Welcome,
            (true, true, _) => View::Session,
        }
    }
}
