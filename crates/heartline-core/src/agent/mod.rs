//! Agent state and failure classification.
//!
//! The conversational agent runs remotely; this module only models the
//! lifecycle states the session layer reports and turns raw failure
//! reasons into the notice the user sees.

mod notice;
mod state;

// Re-export public API
pub use notice::FailureNotice;
pub use state::AgentState;
