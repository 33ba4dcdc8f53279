pub mod auth;
pub mod health;
pub mod livekit;
pub mod rooms;

use axum::Router;

use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(rooms::room_routes())
        .merge(livekit::livekit_routes())
        .merge(auth::auth_routes())
        .merge(health::health_routes())
        .with_state(state)
}
