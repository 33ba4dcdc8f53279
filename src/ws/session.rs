use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::Claims;
use crate::ws::ServerMessage;

/// Per-connection state tracked by the socket task. A connection may join
/// several rooms over its lifetime; `joined_rooms` drives disconnect cleanup.
#[derive(Debug)]
pub struct WsSessionState {
    pub conn_id: String,
    pub user_id: String,
    pub name: String,
    pub joined_rooms: Vec<String>,
}

impl WsSessionState {
    pub fn new(conn_id: String, claims: &Claims) -> Self {
        Self {
            conn_id,
            user_id: claims.sub.clone(),
            name: claims.name.clone(),
            joined_rooms: Vec::new(),
        }
    }

    pub fn add_room(&mut self, room_id: String) {
        if !self.joined_rooms.contains(&room_id) {
            self.joined_rooms.push(room_id);
        }
    }

    pub fn remove_room(&mut self, room_id: &str) {
        self.joined_rooms.retain(|r| r != room_id);
    }

    pub fn is_in_room(&self, room_id: &str) -> bool {
        self.joined_rooms.iter().any(|r| r == room_id)
    }
}

/// Client connection handle for sending messages
#[derive(Clone)]
pub struct ClientHandle {
    pub conn_id: String,
    pub user_id: String,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl ClientHandle {
    pub fn new(
        conn_id: String,
        user_id: String,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Self {
        Self {
            conn_id,
            user_id,
            sender,
        }
    }

    pub fn send(&self, msg: ServerMessage) -> Result<(), mpsc::error::SendError<ServerMessage>> {
        self.sender.send(msg)
    }
}

/// Connections of a single chat room
pub struct RoomConnections {
    clients: dashmap::DashMap<String, ClientHandle>, // conn_id -> ClientHandle
}

impl RoomConnections {
    pub fn new() -> Self {
        Self {
            clients: dashmap::DashMap::new(),
        }
    }

    pub fn add_client(&self, handle: ClientHandle) {
        self.clients.insert(handle.conn_id.clone(), handle);
    }

    pub fn remove_client(&self, conn_id: &str) -> Option<ClientHandle> {
        self.clients.remove(conn_id).map(|(_, v)| v)
    }

    /// Relay a message to every connection in the room, sender included.
    pub fn broadcast(&self, msg: ServerMessage) {
        for client in self.clients.iter() {
            let _ = client.send(msg.clone());
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for RoomConnections {
    fn default() -> Self {
        Self::new()
    }
}

/// Global connections manager - tracks all chat rooms
pub struct ConnectionsManager {
    rooms: dashmap::DashMap<String, Arc<RoomConnections>>, // room_id -> RoomConnections
}

impl ConnectionsManager {
    pub fn new() -> Self {
        Self {
            rooms: dashmap::DashMap::new(),
        }
    }

    pub fn get_or_create_room(&self, room_id: &str) -> Arc<RoomConnections> {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(RoomConnections::new()))
            .clone()
    }

    pub fn get_room(&self, room_id: &str) -> Option<Arc<RoomConnections>> {
        self.rooms.get(room_id).map(|r| r.clone())
    }

    pub fn remove_client_from_room(&self, room_id: &str, conn_id: &str) -> Option<ClientHandle> {
        if let Some(room) = self.rooms.get(room_id) {
            let handle = room.remove_client(conn_id);

            // Clean up empty rooms
            if room.is_empty() {
                self.rooms.remove(room_id);
            }

            handle
        } else {
            None
        }
    }

    pub fn broadcast_to_room(&self, room_id: &str, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(room_id) {
            room.broadcast(msg);
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for ConnectionsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(conn_id: &str, user_id: &str) -> (ClientHandle, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            ClientHandle::new(conn_id.to_string(), user_id.to_string(), tx),
            rx,
        )
    }

    #[test]
    fn broadcast_reaches_every_member_including_sender() {
        let manager = ConnectionsManager::new();
        let room = manager.get_or_create_room("room-1");

        let (alice, mut alice_rx) = handle("c1", "alice");
        let (bob, mut bob_rx) = handle("c2", "bob");
        room.add_client(alice);
        room.add_client(bob);

        let msg = ServerMessage::Chat {
            room_id: "room-1".to_string(),
            sender: "alice".to_string(),
            message: "hi".to_string(),
        };
        manager.broadcast_to_room("room-1", msg.clone());

        assert_eq!(alice_rx.try_recv().unwrap(), msg);
        assert_eq!(bob_rx.try_recv().unwrap(), msg);
    }

    #[test]
    fn empty_rooms_are_dropped_after_last_client_leaves() {
        let manager = ConnectionsManager::new();
        let room = manager.get_or_create_room("room-1");

        let (alice, _alice_rx) = handle("c1", "alice");
        room.add_client(alice);
        assert_eq!(manager.room_count(), 1);

        manager.remove_client_from_room("room-1", "c1");
        assert_eq!(manager.room_count(), 0);
    }

    #[test]
    fn session_tracks_joined_rooms_without_duplicates() {
        let claims = Claims {
            sub: "alice".to_string(),
            name: "Alice".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        let mut session = WsSessionState::new("c1".to_string(), &claims);

        session.add_room("a".to_string());
        session.add_room("a".to_string());
        session.add_room("b".to_string());
        assert_eq!(session.joined_rooms, vec!["a", "b"]);
        assert!(session.is_in_room("a"));

        session.remove_room("a");
        assert!(!session.is_in_room("a"));
    }
}
