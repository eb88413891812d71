//! TOML-backed profile store.
//!
//! The local analog of the product's browser storage: one small file
//! holding the signed-in email. This file is the source of truth for
//! authentication; the remote directory is only a best-effort mirror.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use heartline_core::identity::ProfileStore;
use heartline_core::{HeartlineError, Result};

use crate::paths::HeartlinePaths;
use crate::storage::AtomicTomlFile;

/// On-disk shape of `profile.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredProfile {
    email: Option<String>,
    /// RFC 3339 timestamp of the last write.
    #[serde(default)]
    updated_at: String,
}

/// `ProfileStore` implementation over an atomic TOML file.
pub struct TomlProfileStore {
    file: Arc<AtomicTomlFile<StoredProfile>>,
}

impl TomlProfileStore {
    /// Creates a store over the platform profile path.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(HeartlinePaths::profile_file()?))
    }

    /// Creates a store over an explicit path.
    pub fn new(path: PathBuf) -> Self {
        let file = Arc::new(AtomicTomlFile::new(path));
        tracing::debug!("[TomlProfileStore] Profile file at {}", file.path().display());
        Self { file }
    }
}

#[async_trait]
impl ProfileStore for TomlProfileStore {
    async fn load_email(&self) -> Result<Option<String>> {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || Ok(file.load()?.and_then(|profile| profile.email)))
            .await
            .map_err(|e| HeartlineError::internal(format!("Failed to join task: {}", e)))?
    }

    async fn store_email(&self, email: &str) -> Result<()> {
        let file = self.file.clone();
        let email = email.to_string();
        tokio::task::spawn_blocking(move || {
            file.update(StoredProfile::default(), |profile| {
                profile.email = Some(email);
                profile.updated_at = Utc::now().to_rfc3339();
                Ok(())
            })
        })
        .await
        .map_err(|e| HeartlineError::internal(format!("Failed to join task: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_then_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlProfileStore::new(temp_dir.path().join("profile.toml"));

        store.store_email("ana@example.com").await.unwrap();

        let loaded = store.load_email().await.unwrap();
        assert_eq!(loaded.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn test_load_without_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlProfileStore::new(temp_dir.path().join("profile.toml"));

        assert!(store.load_email().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_replaces_previous_email() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlProfileStore::new(temp_dir.path().join("profile.toml"));

        store.store_email("first@example.com").await.unwrap();
        store.store_email("second@example.com").await.unwrap();

        let loaded = store.load_email().await.unwrap();
        assert_eq!(loaded.as_deref(), Some("second@example.com"));
    }

    #[tokio::test]
    async fn test_store_stamps_a_parseable_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("profile.toml");
        let store = TomlProfileStore::new(path.clone());

        store.store_email("ana@example.com").await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let profile: StoredProfile = toml::from_str(&raw).unwrap();
        assert!(DateTime::parse_from_rfc3339(&profile.updated_at).is_ok());
    }

    #[tokio::test]
    async fn test_load_tolerates_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("profile.toml");
        std::fs::write(&path, "").unwrap();

        let store = TomlProfileStore::new(path);
        assert!(store.load_email().await.unwrap().is_none());
    }
}
