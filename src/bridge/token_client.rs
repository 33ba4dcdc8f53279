use reqwest::Client;
use serde::Deserialize;

use crate::bridge::MediaCredentials;
use crate::error::{AppError, Result};

/// Authenticated client for the backend's token endpoint.
///
/// One fetch per session: a failure is reported once and the session
/// stalls. There is deliberately no retry or backoff here, and no timeout
/// beyond the transport's default.
#[derive(Clone)]
pub struct TokenClient {
    client: Client,
    base_url: String,
    bearer_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: String,
    server_url: String,
}

impl TokenClient {
    pub fn new(base_url: &str, bearer_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.to_string(),
        }
    }

    /// GET /livekit/token?roomId=..&participantName=..
    pub async fn fetch(&self, room_id: &str, identity: &str) -> Result<MediaCredentials> {
        let url = format!("{}/livekit/token", self.base_url);

        let res = self
            .client
            .get(&url)
            .query(&[("roomId", room_id), ("participantName", identity)])
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| AppError::TokenError(format!("Token fetch failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::TokenError(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: TokenResponse = res
            .json()
            .await
            .map_err(|e| AppError::TokenError(format!("Malformed token response: {}", e)))?;

        Ok(MediaCredentials {
            token: parsed.token,
            server_url: parsed.server_url,
        })
    }
}
