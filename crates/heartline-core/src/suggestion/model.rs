//! Suggestion model and text validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HeartlineError, Result};

/// Maximum suggestion length in Unicode scalar values.
pub const MAX_SUGGESTION_CHARS: usize = 500;

/// A user-submitted feature request.
///
/// Created once at submission time and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Submitter's email, or the literal `"unknown"` when none is stored.
    pub email: String,
    /// The suggestion text, already validated.
    pub text: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl Suggestion {
    /// Creates a suggestion stamped with the current time.
    pub fn new(email: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Validator for raw suggestion input.
pub struct SuggestionText;

impl SuggestionText {
    /// Validates raw input and returns the trimmed text.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Validation` when the trimmed text is empty
    /// or longer than [`MAX_SUGGESTION_CHARS`] characters. Length is counted
    /// in Unicode scalar values, not bytes.
    pub fn validate(raw: &str) -> Result<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(HeartlineError::validation("Please enter a suggestion"));
        }
        if trimmed.chars().count() > MAX_SUGGESTION_CHARS {
            return Err(HeartlineError::validation(format!(
                "Suggestions are limited to {} characters",
                MAX_SUGGESTION_CHARS
            )));
        }
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_surrounding_whitespace() {
        let text = SuggestionText::validate("  more languages  ").unwrap();
        assert_eq!(text, "more languages");
    }

    #[test]
    fn test_validate_rejects_empty_input() {
        let err = SuggestionText::validate("").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Please enter a suggestion"));
    }

    #[test]
    fn test_validate_rejects_whitespace_only_input() {
        let err = SuggestionText::validate("   \n\t ").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_accepts_exactly_500_chars() {
        let raw = "x".repeat(500);
        let text = SuggestionText::validate(&raw).unwrap();
        assert_eq!(text.chars().count(), 500);
    }

    #[test]
    fn test_validate_rejects_501_chars() {
        let raw = "x".repeat(501);
        let err = SuggestionText::validate(&raw).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_counts_chars_not_bytes() {
        // 500 three-byte scalars is 1500 bytes but still within the limit.
        let raw = "あ".repeat(500);
        assert!(SuggestionText::validate(&raw).is_ok());
        let over = "あ".repeat(501);
        assert!(SuggestionText::validate(&over).is_err());
    }

    #[test]
    fn test_suggestion_new_stamps_creation_time() {
        let before = Utc::now();
        let suggestion = Suggestion::new("a@b.c", "voice picker");
        assert!(suggestion.created_at >= before);
        assert_eq!(suggestion.email, "a@b.c");
        assert_eq!(suggestion.text, "voice picker");
    }
}
