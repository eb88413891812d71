//! Identity domain model.

use serde::{Deserialize, Serialize};

/// The current user identity.
///
/// `authenticated` is what the view router consumes; `email` keys remote
/// records and may be absent while unauthenticated.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Identity {
    /// Email address, when one has been submitted or restored.
    pub email: Option<String>,
    /// Whether the user has passed the email gate this process lifetime.
    pub authenticated: bool,
}

impl Identity {
    /// An identity restored from a previously stored email.
    pub fn returning(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            authenticated: true,
        }
    }

    /// The email to key remote records by, with the product's fallback
    /// for records created before authentication completed.
    pub fn email_or_unknown(&self) -> String {
        self.email.clone().unwrap_or_else(|| "unknown".to_string())
    }
}
