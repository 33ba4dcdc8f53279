use serde::{Deserialize, Serialize};

/// JWT Claims for the backend's own tokens. The same token is presented as
/// a bearer credential on REST calls and as the `token` query parameter on
/// the chat WebSocket upgrade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Request for a guest session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRequest {
    pub display_name: String,
}

/// Response carrying the guest's identity and credential
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestResponse {
    pub user_id: String,
    pub token: String,
    pub expires_in: u64,
}
