use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_seconds: u64,
    pub livekit_api_key: String,
    pub livekit_api_secret: String,
    pub livekit_url: String,
    pub livekit_token_ttl_seconds: u64,
    pub room_ttl_seconds: u64,
}

impl Config {
    /// Load configuration from the environment. Everything needed to mint
    /// LiveKit tokens is required here, so a misconfigured deployment fails
    /// at startup rather than on the first `/livekit/token` request.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingJwtSecret)?,
            jwt_expiry_seconds: env::var("JWT_EXPIRY_SECONDS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
            livekit_api_key: env::var("LIVEKIT_API_KEY")
                .map_err(|_| ConfigError::MissingLiveKitApiKey)?,
            livekit_api_secret: env::var("LIVEKIT_API_SECRET")
                .map_err(|_| ConfigError::MissingLiveKitApiSecret)?,
            livekit_url: env::var("LIVEKIT_URL").map_err(|_| ConfigError::MissingLiveKitUrl)?,
            livekit_token_ttl_seconds: env::var("LIVEKIT_TOKEN_TTL_SECONDS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            room_ttl_seconds: env::var("ROOM_TTL_SECONDS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("JWT_SECRET environment variable is required")]
    MissingJwtSecret,
    #[error("LIVEKIT_API_KEY environment variable is required")]
    MissingLiveKitApiKey,
    #[error("LIVEKIT_API_SECRET environment variable is required")]
    MissingLiveKitApiSecret,
    #[error("LIVEKIT_URL environment variable is required")]
    MissingLiveKitUrl,
}
