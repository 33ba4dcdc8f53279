use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::livekit::IssuedToken;
use crate::state::AppState;

/// LiveKit token routes
pub fn livekit_routes() -> Router<AppState> {
    Router::new().route("/livekit/token", get(get_token))
}

/// Query parameters for the token endpoint. Both are optional at the serde
/// layer so that missing parameters surface as a 400 with the usual error
/// envelope instead of an extractor rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenQuery {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
}

/// Validate the token request parameters. Runs before any store access.
fn validate_params(query: &TokenQuery) -> Result<(&str, &str)> {
    let room_id = query
        .room_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing or invalid roomId".to_string()))?;

    let participant_name = query
        .participant_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing or invalid participantName".to_string()))?;

    Ok((room_id, participant_name))
}

/// GET /livekit/token?roomId=..&participantName=..
///
/// Issues a LiveKit access token scoped to the given room, provided the
/// room exists at issuance time. Existence is not re-validated during the
/// token's lifetime.
async fn get_token(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<IssuedToken>> {
    state.auth.validate_token(bearer.token())?;

    let (room_id, participant_name) = validate_params(&query)?;

    if !state.room_repo.room_exists(room_id).await? {
        return Err(AppError::NotFound(format!(
            "Room {} not found, cannot create media session",
            room_id
        )));
    }

    let issued = state.livekit.issue(room_id, participant_name)?;

    tracing::info!(
        room_id = %room_id,
        participant = %participant_name,
        "LiveKit token issued"
    );

    Ok(Json(issued))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(room_id: Option<&str>, participant_name: Option<&str>) -> TokenQuery {
        TokenQuery {
            room_id: room_id.map(str::to_string),
            participant_name: participant_name.map(str::to_string),
        }
    }

    #[test]
    fn accepts_well_formed_params() {
        let q = query(Some("room-abc"), Some("alice"));
        assert_eq!(validate_params(&q).unwrap(), ("room-abc", "alice"));
    }

    #[test]
    fn rejects_missing_room_id() {
        assert!(validate_params(&query(None, Some("alice"))).is_err());
        assert!(validate_params(&query(Some(""), Some("alice"))).is_err());
        assert!(validate_params(&query(Some("   "), Some("alice"))).is_err());
    }

    #[test]
    fn rejects_missing_participant_name() {
        assert!(validate_params(&query(Some("room-abc"), None)).is_err());
        assert!(validate_params(&query(Some("room-abc"), Some(""))).is_err());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let q = query(Some("  room-abc "), Some(" alice "));
        assert_eq!(validate_params(&q).unwrap(), ("room-abc", "alice"));
    }
}
