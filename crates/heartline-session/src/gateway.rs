//! Connection-details signaling client.
//!
//! Before dialing the media server the client asks the gateway for a
//! participant token. The gateway is also where agent dispatch happens:
//! when a named agent is configured it is passed along so the backend
//! routes the session to it.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use heartline_core::{HeartlineError, Result};

use crate::transport::ConnectionDetails;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire shape of the gateway response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsResponse {
    server_url: String,
    room_name: String,
    participant_token: String,
}

/// Client for the connection-details endpoint.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    agent_name: Option<String>,
}

impl GatewayClient {
    /// Creates a client against the given gateway base URL.
    pub fn new(base_url: impl Into<String>, agent_name: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            agent_name,
        }
    }

    /// Fetches connection details for a new session.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Session` when the gateway cannot be
    /// reached, rejects the request, or responds with an unparseable
    /// body.
    pub async fn connection_details(&self) -> Result<ConnectionDetails> {
        let url = format!("{}/api/connection-details", self.base_url);

        let mut request = self.client.get(&url).timeout(REQUEST_TIMEOUT);
        if let Some(agent_name) = &self.agent_name {
            request = request.query(&[("agentName", agent_name.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HeartlineError::session(format!("Failed to reach gateway: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HeartlineError::session(format!(
                "Gateway error ({}): {}",
                status, error_text
            )));
        }

        let details: DetailsResponse = response.json().await.map_err(|e| {
            HeartlineError::session(format!("Failed to parse gateway response: {}", e))
        })?;

        Ok(ConnectionDetails {
            server_url: details.server_url,
            token: details.participant_token,
            session_id: details.room_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = GatewayClient::new("https://gw.example.com/", None);
        assert_eq!(client.base_url, "https://gw.example.com");
    }

    #[test]
    fn test_response_parses_wire_field_names() {
        let json = r#"{
            "serverUrl": "wss://media.example.com",
            "roomName": "room-42",
            "participantName": "caller",
            "participantToken": "tok-abc"
        }"#;

        let details: DetailsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(details.server_url, "wss://media.example.com");
        assert_eq!(details.room_name, "room-42");
        assert_eq!(details.participant_token, "tok-abc");
    }
}
