use deadpool_redis::Pool;
use redis::AsyncCommands;

use crate::error::{AppError, Result};
use crate::models::Room;

/// Room repository for Redis operations.
///
/// Rooms are stored twice: the full record under `room:{id}` and a slug
/// index under `room:slug:{slug}` pointing at the id. Both carry the same
/// TTL, so a room and its slug expire together.
#[derive(Clone)]
pub struct RoomRepository {
    pool: Pool,
}

impl RoomRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new room with TTL. Fails if the slug is already taken.
    pub async fn create_room(&self, room: &Room) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let slug_key = format!("room:slug:{}", room.slug);

        // SET NX on the slug index doubles as the uniqueness check.
        let claimed: bool = redis::cmd("SET")
            .arg(&slug_key)
            .arg(&room.id)
            .arg("NX")
            .arg("EX")
            .arg(room.ttl_seconds as i64)
            .query_async(&mut *conn)
            .await?;

        if !claimed {
            return Err(AppError::RoomExists(room.slug.clone()));
        }

        let key = format!("room:{}", room.id);
        let json = serde_json::to_string(room)?;

        redis::cmd("SETEX")
            .arg(&key)
            .arg(room.ttl_seconds as i64)
            .arg(&json)
            .query_async::<()>(&mut *conn)
            .await?;

        tracing::info!(room_id = %room.id, slug = %room.slug, "Room created");
        Ok(())
    }

    /// Get room by ID
    pub async fn get_room(&self, room_id: &str) -> Result<Option<Room>> {
        let mut conn = self.pool.get().await?;
        let key = format!("room:{}", room_id);

        let json: Option<String> = conn.get(&key).await?;

        match json {
            Some(data) => {
                let room: Room = serde_json::from_str(&data)?;
                Ok(Some(room))
            }
            None => Ok(None),
        }
    }

    /// Get room by slug via the slug index
    pub async fn get_room_by_slug(&self, slug: &str) -> Result<Option<Room>> {
        let mut conn = self.pool.get().await?;
        let slug_key = format!("room:slug:{}", slug);

        let room_id: Option<String> = conn.get(&slug_key).await?;

        match room_id {
            Some(id) => self.get_room(&id).await,
            None => Ok(None),
        }
    }

    /// Existence read used by the token issuer
    pub async fn room_exists(&self, room_id: &str) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let key = format!("room:{}", room_id);

        let exists: bool = conn.exists(&key).await?;
        Ok(exists)
    }

    /// Check Redis connection health
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.pool.get().await?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| AppError::RedisError(e.to_string()))?;

        Ok(pong == "PONG")
    }
}
