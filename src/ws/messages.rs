use serde::{Deserialize, Serialize};

/// Client -> server chat frames.
///
/// Wire format matches the browser client: `{"type": "join-room", "roomId": ..}`,
/// `{"type": "leave-room", "roomId": ..}`, `{"type": "chat", "roomId": .., "message": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinRoom { room_id: String },
    LeaveRoom { room_id: String },
    Chat { room_id: String, message: String },
}

/// Server -> client chat frames.
///
/// `Connected` is always the first frame on a new connection and carries the
/// identity resolved from the connection's token. `Chat` is relayed to every
/// member of the room, the sender included; dropping self-echoes is the
/// client's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Connected {
        user_id: String,
    },
    Chat {
        room_id: String,
        sender: String,
        message: String,
    },
    Error {
        code: u16,
        message: String,
    },
}

impl ServerMessage {
    pub fn error(code: u16, message: &str) -> Self {
        Self::Error {
            code,
            message: message.to_string(),
        }
    }
}
