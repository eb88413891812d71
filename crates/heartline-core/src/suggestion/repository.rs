//! Suggestion persistence trait.

use async_trait::async_trait;

use super::model::Suggestion;
use crate::error::Result;

/// Remote sink for submitted suggestions.
///
/// The app layer treats this as optional: with no sink configured a
/// submission succeeds locally and the flow still advances.
#[async_trait]
pub trait SuggestionSink: Send + Sync {
    /// Persists a suggestion.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Remote` when the backend rejects the write
    /// or cannot be reached. Callers keep the flow on the entry step and
    /// surface the error inline so the user can retry.
    async fn submit(&self, suggestion: &Suggestion) -> Result<()>;
}
