use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Config;
use crate::livekit::AccessTokenIssuer;
use crate::redis::RoomRepository;
use crate::ws::ConnectionsManager;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub livekit: Arc<AccessTokenIssuer>,
    pub room_repo: Arc<RoomRepository>,
    pub connections: Arc<ConnectionsManager>,
}

impl AppState {
    pub fn new(
        config: Config,
        auth: AuthService,
        livekit: AccessTokenIssuer,
        room_repo: RoomRepository,
    ) -> Self {
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            livekit: Arc::new(livekit),
            room_repo: Arc::new(room_repo),
            connections: Arc::new(ConnectionsManager::new()),
        }
    }
}
