use serde::{Deserialize, Serialize};

/// LiveKit video grant, serialized camelCase as the media server expects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room_join: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_publish: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_subscribe: Option<bool>,
}

impl VideoGrant {
    /// Grant scoped to joining a single room
    pub fn room_join(room_id: &str) -> Self {
        Self {
            room_join: true,
            room: Some(room_id.to_string()),
            can_publish: None,
            can_subscribe: None,
        }
    }
}

/// Claims of a LiveKit access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String, // API key
    pub sub: String, // participant identity
    pub jti: String, // fresh per token, makes issuance non-idempotent
    pub nbf: i64,
    pub exp: i64,
    pub video: VideoGrant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_serializes_camel_case() {
        let grant = VideoGrant::room_join("room-1");
        let json = serde_json::to_value(&grant).unwrap();

        assert_eq!(json["roomJoin"], true);
        assert_eq!(json["room"], "room-1");
        // Unset capabilities are omitted entirely
        assert!(json.get("canPublish").is_none());
        assert!(json.get("canSubscribe").is_none());
    }
}
