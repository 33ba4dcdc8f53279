use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;

use crate::error::{AppError, Result};
use crate::models::{CreateRoomRequest, CreateRoomResponse, Room, RoomResponse};
use crate::state::AppState;

/// Room routes
pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/create-room", post(create_room))
        .route("/room/{slug}", get(get_room_by_slug))
}

/// Slugs are lowercase alphanumeric with hyphens, e.g. "cohort-chat".
fn validate_slug(input: &str) -> Result<&str> {
    let slug = input.trim();

    if slug.is_empty() {
        return Err(AppError::BadRequest("Room slug is required".to_string()));
    }
    if slug.len() > 64 {
        return Err(AppError::BadRequest(
            "Room slug must be at most 64 characters".to_string(),
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::BadRequest(
            "Room slug may only contain lowercase letters, digits and hyphens".to_string(),
        ));
    }

    Ok(slug)
}

/// POST /create-room - Create a new room
async fn create_room(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>)> {
    let claims = state.auth.validate_token(bearer.token())?;
    let slug = validate_slug(&request.slug)?;

    let room = Room::new(slug.to_string(), state.config.room_ttl_seconds);
    state.room_repo.create_room(&room).await?;

    tracing::info!(room_id = %room.id, slug = %room.slug, user_id = %claims.sub, "Room created");

    Ok((StatusCode::CREATED, Json(room.into())))
}

/// GET /room/:slug - Resolve a room slug to its id
async fn get_room_by_slug(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Path(slug): Path<String>,
) -> Result<Json<RoomResponse>> {
    state.auth.validate_token(bearer.token())?;

    let room = state
        .room_repo
        .get_room_by_slug(slug.trim())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Room {} not found", slug)))?;

    Ok(Json(room.into()))
}
