//! LiveKit access token issuance.
//!
//! All media transport (SFU routing, track negotiation, ICE) is handled by
//! the external LiveKit deployment. This backend only mints short-lived,
//! room-scoped access tokens signed with the LiveKit API secret.

pub mod grants;

pub use grants::{AccessTokenClaims, VideoGrant};

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;

/// Token plus the media server address the client should dial
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub server_url: String,
}

/// Mints LiveKit access tokens.
///
/// Issuance is stateless: each call produces a fresh token from
/// `(room_id, identity)`, the signing secret, and the current time. Tokens
/// are never persisted and cannot be revoked; room existence is the
/// caller's concern and is not re-checked during the token's lifetime.
#[derive(Clone)]
pub struct AccessTokenIssuer {
    api_key: String,
    encoding_key: EncodingKey,
    ttl_seconds: u64,
    server_url: String,
}

impl AccessTokenIssuer {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.livekit_api_key.clone(),
            encoding_key: EncodingKey::from_secret(config.livekit_api_secret.as_bytes()),
            ttl_seconds: config.livekit_token_ttl_seconds,
            server_url: config.livekit_url.clone(),
        }
    }

    /// Issue a token scoped to joining `room_id` as `identity`.
    ///
    /// The `jti` is fresh per call, so two issuances for the same inputs
    /// yield distinct tokens even within the same clock second.
    pub fn issue(&self, room_id: &str, identity: &str) -> Result<IssuedToken> {
        let now = Utc::now().timestamp();

        let claims = AccessTokenClaims {
            iss: self.api_key.clone(),
            sub: identity.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            nbf: now,
            exp: now + self.ttl_seconds as i64,
            video: VideoGrant::room_join(room_id),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            server_url: self.server_url.clone(),
        })
    }
}
