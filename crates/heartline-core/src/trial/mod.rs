//! Free-trial countdown domain.
//!
//! The product gives every call a fixed warm-up window (the agent loads
//! models) followed by a fixed free window, then force-ends the session.
//! The countdown is pure wall-clock math driven by an external ticker so
//! the remaining time survives slow or suspended drivers.
//!
//! # Module Structure
//!
//! - `model`: `TrialPhase`, `TrialState`, `TrialTick`
//! - `clock`: `TrialClock` state machine with the one-shot end latch
//! - `offer`: `OfferFlag` shared between the clock driver and the views

mod clock;
mod model;
mod offer;

// Re-export public API
pub use clock::TrialClock;
pub use model::{TrialPhase, TrialState, TrialTick};
pub use offer::OfferFlag;
