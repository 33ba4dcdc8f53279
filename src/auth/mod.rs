use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Claims;

/// JWT Authentication Service
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: u64,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiry_seconds: config.jwt_expiry_seconds,
        }
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_seconds
    }

    /// Generate a JWT token for a user session
    pub fn issue_token(&self, user_id: &str, name: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let exp = now + self.expiry_seconds as i64;

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            iat: now,
            exp,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a JWT token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Extract token from query string format: "token=xxx"
    pub fn extract_from_query(&self, query: &str) -> Result<Claims> {
        let token = query
            .split('&')
            .find_map(|pair| {
                let mut parts = pair.split('=');
                match (parts.next(), parts.next()) {
                    (Some("token"), Some(value)) => Some(value),
                    _ => None,
                }
            })
            .ok_or_else(|| AppError::Unauthorized("Token not found in query".to_string()))?;

        self.validate_token(token)
    }
}

/// Generate a guest user id from a display name, e.g. "alice-7K2P".
/// Uppercase suffix excludes confusing chars (O/0, I/1, etc.)
pub fn guest_identity(display_name: &str) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::rng();

    let slugified: String = display_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();

    let suffix: String = (0..4)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    format!("{}-{}", slugified.trim_matches('-'), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_host: "localhost".to_string(),
            server_port: 8080,
            redis_url: "redis://localhost".to_string(),
            jwt_secret: "test-secret-key".to_string(),
            jwt_expiry_seconds: 86400,
            livekit_api_key: "devkey".to_string(),
            livekit_api_secret: "devsecret-devsecret-devsecret-32".to_string(),
            livekit_url: "wss://livekit.example.com".to_string(),
            livekit_token_ttl_seconds: 3600,
            room_ttl_seconds: 86400,
        }
    }

    #[test]
    fn test_issue_and_validate_token() {
        let config = test_config();
        let auth = AuthService::new(&config);

        let token = auth
            .issue_token("alice-7K2P", "Alice")
            .expect("Should issue token");

        let claims = auth.validate_token(&token).expect("Should validate token");

        assert_eq!(claims.sub, "alice-7K2P");
        assert_eq!(claims.name, "Alice");
    }

    #[test]
    fn test_extract_from_query() {
        let config = test_config();
        let auth = AuthService::new(&config);

        let token = auth
            .issue_token("alice-7K2P", "Alice")
            .expect("Should issue token");

        let query = format!("roomId=room-456&token={}", token);
        let claims = auth
            .extract_from_query(&query)
            .expect("Should extract from query");

        assert_eq!(claims.sub, "alice-7K2P");
    }

    #[test]
    fn test_invalid_token() {
        let config = test_config();
        let auth = AuthService::new(&config);

        let result = auth.validate_token("invalid-token");
        assert!(result.is_err());
    }

    #[test]
    fn test_guest_identity_shape() {
        let id = guest_identity("Alice Smith");
        assert!(id.starts_with("alice-smith-"));
        assert_eq!(id.len(), "alice-smith-".len() + 4);

        // Distinct per call
        assert_ne!(guest_identity("bob"), guest_identity("bob"));
    }
}
