//! Identity storage traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Durable local key-value storage for the user profile.
///
/// This is the source of truth for authentication. Implementations live in
/// the infrastructure crate.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Reads the stored email address, if any.
    async fn load_email(&self) -> Result<Option<String>>;

    /// Stores the email address, replacing any previous value.
    async fn store_email(&self, email: &str) -> Result<()>;
}

/// Remote user directory, written to on a best-effort basis.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Registers an email in the remote directory.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Conflict` when the email is already
    /// registered, and `HeartlineError::Remote` for any other failure.
    /// Callers treat a conflict as success.
    async fn register(&self, email: &str, created_at: DateTime<Utc>) -> Result<()>;
}
