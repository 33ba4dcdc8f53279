use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use huddle_backend::api;
use huddle_backend::auth::AuthService;
use huddle_backend::config::Config;
use huddle_backend::livekit::AccessTokenIssuer;
use huddle_backend::redis::{create_pool, RoomRepository};
use huddle_backend::state::AppState;
use huddle_backend::ws::ws_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Huddle Backend...");

    // Load configuration; missing LiveKit credentials abort here
    let config = Config::from_env()?;
    tracing::info!(
        host = %config.server_host,
        port = %config.server_port,
        livekit_url = %config.livekit_url,
        "Configuration loaded"
    );

    // Create Redis connection pool
    let redis_pool = create_pool(&config)?;
    let room_repo = RoomRepository::new(redis_pool);

    // Test Redis connection
    match room_repo.health_check().await {
        Ok(true) => tracing::info!("Redis connection established"),
        Ok(false) => tracing::warn!("Redis health check returned false"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Redis");
            // Continue anyway, might recover later
        }
    }

    // Create auth service and LiveKit token issuer
    let auth = AuthService::new(&config);
    let livekit = AccessTokenIssuer::new(&config);

    // Create application state
    let state = AppState::new(config.clone(), auth, livekit, room_repo);

    // Build router
    let app = Router::new()
        .merge(api::create_router(state.clone()))
        .merge(ws_routes().with_state(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Handle shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down...");
        },
    }
}
