use axum::{extract::State, routing::post, Json, Router};

use crate::auth::guest_identity;
use crate::error::{AppError, Result};
use crate::models::{GuestRequest, GuestResponse};
use crate::state::AppState;

/// Auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/guest", post(guest_session))
}

/// POST /auth/guest - Issue a guest session token.
///
/// The returned token serves both as the REST bearer credential and as the
/// `token` query parameter on the chat WebSocket upgrade.
async fn guest_session(
    State(state): State<AppState>,
    Json(request): Json<GuestRequest>,
) -> Result<Json<GuestResponse>> {
    let display = request.display_name.trim();
    if display.is_empty() {
        return Err(AppError::BadRequest("Display name is required".to_string()));
    }
    if display.len() > 100 {
        return Err(AppError::BadRequest(
            "Display name must be at most 100 characters".to_string(),
        ));
    }

    let user_id = guest_identity(display);
    let token = state.auth.issue_token(&user_id, display)?;

    tracing::info!(user_id = %user_id, "Guest session issued");

    Ok(Json(GuestResponse {
        user_id,
        token,
        expires_in: state.auth.expiry_seconds(),
    }))
}
