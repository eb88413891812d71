//! Suggestion domain module.
//!
//! The post-trial exchange: the user trades a feature suggestion for the
//! promise of more free minutes. Validation and flow stepping live here;
//! the app layer wires them to persistence and the offer flag.
//!
//! # Module Structure
//!
//! - `model`: `Suggestion` record and text validation
//! - `repository`: `SuggestionSink` persistence trait
//! - `flow`: forward-only step tracker for the trial-ended screen

mod flow;
mod model;
mod repository;

// Re-export public API
pub use flow::{FlowStep, SuggestionFlow};
pub use model::{Suggestion, SuggestionText, MAX_SUGGESTION_CHARS};
pub use repository::SuggestionSink;
