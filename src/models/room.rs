use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Room metadata stored in Redis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl Room {
    pub fn new(slug: String, ttl_seconds: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            slug,
            created_at: Utc::now(),
            ttl_seconds,
        }
    }
}

/// Request to create a room
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub slug: String,
}

/// Response after creating a room
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub id: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl From<Room> for CreateRoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            slug: room.slug,
            created_at: room.created_at,
        }
    }
}

/// Response for a room lookup by slug
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub slug: String,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            slug: room.slug,
        }
    }
}
