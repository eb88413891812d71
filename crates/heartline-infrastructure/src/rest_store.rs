//! REST record store.
//!
//! Thin client for the hosted record backend: a user directory and a
//! feature-suggestion inbox. Both are write-only from this client and
//! best-effort from the product's point of view; callers decide whether
//! a failure blocks anything.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;

use heartline_core::identity::UserDirectory;
use heartline_core::suggestion::{Suggestion, SuggestionSink};
use heartline_core::{HeartlineError, Result};

/// SQLSTATE code Postgres raises on unique-constraint violations. The
/// backend embeds it in error bodies for duplicate inserts.
const DUPLICATE_KEY_SQLSTATE: &str = "23505";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct UserRecord<'a> {
    email: &'a str,
    created_at: String,
}

#[derive(Debug, Serialize)]
struct SuggestionRecord<'a> {
    email: &'a str,
    suggestion: &'a str,
    created_at: String,
}

/// REST client for the user directory and suggestion inbox.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestStore {
    /// Creates a store against the given base URL.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Builds a store from `HEARTLINE_API_URL` / `HEARTLINE_API_KEY`.
    ///
    /// Returns `None` when no API URL is configured; the client runs
    /// fine without a record backend.
    pub fn try_from_env() -> Option<Self> {
        let base_url = env::var("HEARTLINE_API_URL").ok()?;
        let api_key = env::var("HEARTLINE_API_KEY").ok();
        Some(Self::new(base_url, api_key))
    }

    async fn post_record<B: Serialize>(&self, collection: &str, body: &B) -> Result<()> {
        let url = format!("{}/{}", self.base_url, collection);

        let mut request = self.client.post(&url).json(body).timeout(REQUEST_TIMEOUT);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await.map_err(|e| {
            HeartlineError::remote(format!("Request to {} failed: {}", collection, e))
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("[RestStore] Stored record in {}", collection);
            return Ok(());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(map_failure(collection, status, &error_text))
    }
}

/// Maps a failed response to the error taxonomy.
///
/// Duplicate keys arrive either as a plain 409 or as a Postgres error
/// body carrying SQLSTATE 23505.
fn map_failure(collection: &str, status: StatusCode, body: &str) -> HeartlineError {
    if status == StatusCode::CONFLICT || body.contains(DUPLICATE_KEY_SQLSTATE) {
        return HeartlineError::conflict(format!("{} already contains this record", collection));
    }
    HeartlineError::remote(format!("{} API error ({}): {}", collection, status, body))
}

#[async_trait]
impl UserDirectory for RestStore {
    async fn register(&self, email: &str, created_at: DateTime<Utc>) -> Result<()> {
        let record = UserRecord {
            email,
            created_at: created_at.to_rfc3339(),
        };
        self.post_record("users", &record).await
    }
}

#[async_trait]
impl SuggestionSink for RestStore {
    async fn submit(&self, suggestion: &Suggestion) -> Result<()> {
        let record = SuggestionRecord {
            email: &suggestion.email,
            suggestion: &suggestion.text,
            created_at: suggestion.created_at.to_rfc3339(),
        };
        self.post_record("feature_suggestions", &record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let store = RestStore::new("https://records.example.com/", None);
        assert_eq!(store.base_url, "https://records.example.com");
    }

    #[test]
    fn test_conflict_status_maps_to_conflict() {
        let err = map_failure("users", StatusCode::CONFLICT, "duplicate key");
        assert!(err.is_conflict());
    }

    #[test]
    fn test_sqlstate_in_body_maps_to_conflict() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        let err = map_failure("users", StatusCode::BAD_REQUEST, body);
        assert!(err.is_conflict());
    }

    #[test]
    fn test_other_failures_map_to_remote() {
        let err = map_failure("feature_suggestions", StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(err.is_remote());
        assert!(err.to_string().contains("feature_suggestions"));
    }

    #[test]
    fn test_suggestion_record_serializes_wire_field_names() {
        let record = SuggestionRecord {
            email: "ana@example.com",
            suggestion: "more languages",
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["suggestion"], "more languages");
        assert!(json["created_at"].is_string());
    }
}
