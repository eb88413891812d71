//! Identity store orchestration.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::model::Identity;
use super::repository::{ProfileStore, UserDirectory};
use crate::error::{HeartlineError, Result};

/// Orchestrates identity state over a local profile store and an optional
/// remote user directory.
///
/// `IdentityStore` is responsible for:
/// - Restoring a previously stored email on startup
/// - Validating and persisting a newly submitted email
/// - Keeping the in-memory identity snapshot the views render from
///
/// The local store is the source of truth for authentication. The remote
/// directory is written on a best-effort basis and can never block or fail
/// the sign-in flow.
pub struct IdentityStore {
    /// Current identity snapshot.
    identity: RwLock<Identity>,
    /// Local durable storage (required).
    profile_store: Arc<dyn ProfileStore>,
    /// Remote directory (optional, best-effort).
    user_directory: Option<Arc<dyn UserDirectory>>,
}

impl IdentityStore {
    /// Creates a new `IdentityStore` with storage backends.
    ///
    /// # Arguments
    ///
    /// * `profile_store` - Local durable storage for the profile
    /// * `user_directory` - Remote directory, or `None` when not configured
    pub fn new(
        profile_store: Arc<dyn ProfileStore>,
        user_directory: Option<Arc<dyn UserDirectory>>,
    ) -> Self {
        Self {
            identity: RwLock::new(Identity::default()),
            profile_store,
            user_directory,
        }
    }

    /// Restores identity from local storage.
    ///
    /// A stored email means the user has authenticated before, so the
    /// identity starts authenticated. A storage read failure degrades to an
    /// unauthenticated start instead of failing startup.
    pub async fn load(&self) -> Identity {
        match self.profile_store.load_email().await {
            Ok(Some(email)) => {
                tracing::info!("[IdentityStore] Restored identity for {}", email);
                let restored = Identity::returning(email);
                *self.identity.write().await = restored.clone();
                restored
            }
            Ok(None) => Identity::default(),
            Err(e) => {
                tracing::warn!(
                    "[IdentityStore] Failed to read stored profile, starting unauthenticated: {}",
                    e
                );
                Identity::default()
            }
        }
    }

    /// Returns the current identity snapshot.
    pub async fn identity(&self) -> Identity {
        self.identity.read().await.clone()
    }

    /// Submits an email address, authenticating the user.
    ///
    /// The input is trimmed; an empty submission is a validation error. The
    /// remote directory is written first (duplicate registrations count as
    /// success, any other remote failure is logged and swallowed), then the
    /// email is persisted locally and the identity marked authenticated.
    /// A local storage failure degrades to in-memory authentication; a
    /// broken disk must not lock the user out of the product.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Validation` when the trimmed input is empty,
    /// and passes through local store errors that are not storage failures.
    pub async fn submit_email(&self, raw: &str) -> Result<Identity> {
        let email = raw.trim();
        if email.is_empty() {
            return Err(HeartlineError::validation("Please enter your email"));
        }

        // At most one remote write per submission, never fatal
        if let Some(directory) = &self.user_directory {
            match directory.register(email, chrono::Utc::now()).await {
                Ok(()) => {
                    tracing::debug!("[IdentityStore] Registered {} remotely", email);
                }
                Err(e) if e.is_conflict() => {
                    // Already registered, that's okay - just continue
                    tracing::debug!("[IdentityStore] {} already registered", email);
                }
                Err(e) => {
                    tracing::warn!(
                        "[IdentityStore] Remote registration failed (continuing with local store): {}",
                        e
                    );
                }
            }
        }

        // Exactly one local write; a broken disk degrades to an in-memory
        // login, any other error propagates
        if let Err(e) = self.profile_store.store_email(email).await {
            if !e.is_local_storage() {
                return Err(e);
            }
            tracing::warn!(
                "[IdentityStore] Failed to persist profile locally, authenticating in memory: {}",
                e
            );
        }

        let authenticated = Identity::returning(email);
        *self.identity.write().await = authenticated.clone();
        Ok(authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    // Mock ProfileStore with a scripted failure
    struct MockProfileStore {
        email: Mutex<Option<String>>,
        writes: Mutex<u32>,
        failure: Option<HeartlineError>,
    }

    impl MockProfileStore {
        fn new() -> Self {
            Self {
                email: Mutex::new(None),
                writes: Mutex::new(0),
                failure: None,
            }
        }

        fn with_email(email: &str) -> Self {
            let store = Self::new();
            *store.email.lock().unwrap() = Some(email.to_string());
            store
        }

        fn failing() -> Self {
            Self::failing_with(HeartlineError::io("disk unavailable"))
        }

        fn failing_with(error: HeartlineError) -> Self {
            Self {
                email: Mutex::new(None),
                writes: Mutex::new(0),
                failure: Some(error),
            }
        }

        fn write_count(&self) -> u32 {
            *self.writes.lock().unwrap()
        }
    }

    #[async_trait]
    impl ProfileStore for MockProfileStore {
        async fn load_email(&self) -> Result<Option<String>> {
            if let Some(e) = &self.failure {
                return Err(e.clone());
            }
            Ok(self.email.lock().unwrap().clone())
        }

        async fn store_email(&self, email: &str) -> Result<()> {
            *self.writes.lock().unwrap() += 1;
            if let Some(e) = &self.failure {
                return Err(e.clone());
            }
            *self.email.lock().unwrap() = Some(email.to_string());
            Ok(())
        }
    }

    // Mock UserDirectory with a scripted outcome
    struct MockUserDirectory {
        outcome: Mutex<Option<HeartlineError>>,
        registrations: Mutex<Vec<String>>,
    }

    impl MockUserDirectory {
        fn succeeding() -> Self {
            Self {
                outcome: Mutex::new(None),
                registrations: Mutex::new(Vec::new()),
            }
        }

        fn failing_with(error: HeartlineError) -> Self {
            Self {
                outcome: Mutex::new(Some(error)),
                registrations: Mutex::new(Vec::new()),
            }
        }

        fn registered(&self) -> Vec<String> {
            self.registrations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserDirectory for MockUserDirectory {
        async fn register(&self, email: &str, _created_at: DateTime<Utc>) -> Result<()> {
            self.registrations.lock().unwrap().push(email.to_string());
            match self.outcome.lock().unwrap().clone() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn test_load_restores_stored_email() {
        let profile = Arc::new(MockProfileStore::with_email("ada@example.com"));
        let store = IdentityStore::new(profile, None);

        let identity = store.load().await;

        assert!(identity.authenticated);
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
        assert_eq!(store.identity().await, identity);
    }

    #[tokio::test]
    async fn test_load_degrades_on_storage_error() {
        let profile = Arc::new(MockProfileStore::failing());
        let store = IdentityStore::new(profile, None);

        let identity = store.load().await;

        assert!(!identity.authenticated);
        assert_eq!(identity.email, None);
    }

    #[tokio::test]
    async fn test_submit_email_trims_and_persists() {
        let profile = Arc::new(MockProfileStore::new());
        let store = IdentityStore::new(profile.clone(), None);

        let identity = store.submit_email("  a@b.com  ").await.unwrap();

        assert!(identity.authenticated);
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
        assert_eq!(profile.email.lock().unwrap().as_deref(), Some("a@b.com"));
        assert_eq!(profile.write_count(), 1);
    }

    #[tokio::test]
    async fn test_submit_empty_email_is_rejected() {
        let profile = Arc::new(MockProfileStore::new());
        let store = IdentityStore::new(profile.clone(), None);

        let err = store.submit_email("   ").await.unwrap_err();

        assert!(err.is_validation());
        // No side effect ran
        assert_eq!(profile.write_count(), 0);
        assert!(!store.identity().await.authenticated);
    }

    #[tokio::test]
    async fn test_remote_conflict_is_treated_as_success() {
        let profile = Arc::new(MockProfileStore::new());
        let directory = Arc::new(MockUserDirectory::failing_with(HeartlineError::conflict(
            "email already registered",
        )));
        let store = IdentityStore::new(profile.clone(), Some(directory.clone()));

        let identity = store.submit_email("ada@example.com").await.unwrap();

        assert!(identity.authenticated);
        assert_eq!(directory.registered(), vec!["ada@example.com"]);
        assert_eq!(profile.write_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_does_not_block_authentication() {
        let profile = Arc::new(MockProfileStore::new());
        let directory = Arc::new(MockUserDirectory::failing_with(HeartlineError::remote(
            "connection refused",
        )));
        let store = IdentityStore::new(profile.clone(), Some(directory));

        let identity = store.submit_email("ada@example.com").await.unwrap();

        assert!(identity.authenticated);
        assert_eq!(profile.email.lock().unwrap().as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_local_write_failure_still_authenticates_in_memory() {
        let profile = Arc::new(MockProfileStore::failing());
        let store = IdentityStore::new(profile, None);

        let identity = store.submit_email("ada@example.com").await.unwrap();

        assert!(identity.authenticated);
        assert!(store.identity().await.authenticated);
    }

    #[tokio::test]
    async fn test_non_storage_write_failure_propagates() {
        let profile = Arc::new(MockProfileStore::failing_with(HeartlineError::internal(
            "worker panicked",
        )));
        let store = IdentityStore::new(profile, None);

        let err = store.submit_email("ada@example.com").await.unwrap_err();

        assert!(matches!(err, HeartlineError::Internal(_)));
        assert!(!store.identity().await.authenticated);
    }

    #[tokio::test]
    async fn test_at_most_one_remote_write_per_submission() {
        let profile = Arc::new(MockProfileStore::new());
        let directory = Arc::new(MockUserDirectory::succeeding());
        let store = IdentityStore::new(profile, Some(directory.clone()));

        store.submit_email("ada@example.com").await.unwrap();

        assert_eq!(directory.registered().len(), 1);
    }
}
