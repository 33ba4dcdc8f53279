use chrono::{DateTime, Utc};

use crate::ws::ClientMessage;

/// Phases of a call session. The media channel is gated behind two
/// resolutions that always happen in order: the chat identity handshake,
/// then the token fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Idle,
    AwaitingIdentity,
    AwaitingToken,
    Ready,
    Closed,
}

/// Credentials for the media connection, as returned by the token endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct MediaCredentials {
    pub token: String,
    pub server_url: String,
}

/// One entry in the append-only chat log
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub id: u64,
    pub text: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
}

/// Inputs observed by the bridge
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// The chat socket's identity handshake resolved
    ChatConnected { user_id: String },
    /// The token endpoint returned credentials
    TokenIssued { token: String, server_url: String },
    /// The token fetch failed; terminal for this session
    TokenFetchFailed { reason: String },
    /// A chat frame arrived from the relay
    ChatMessage {
        room_id: String,
        sender: String,
        message: String,
    },
    /// The chat socket went away without an explicit leave
    ChatClosed,
}

/// Effects the caller must carry out
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeAction {
    /// Send a join-room frame on the chat socket
    AnnounceJoin(ClientMessage),
    /// Request a token for the resolved identity
    FetchToken { room_id: String, identity: String },
    /// Both gates passed; dial the media server
    ConnectMedia(MediaCredentials),
    /// Send a leave-room frame before closing the chat socket
    AnnounceLeave(ClientMessage),
}

/// Client-side coordinator joining the chat and media channel lifecycles
/// under one logical call session.
///
/// The bridge owns no sockets. It consumes [`BridgeEvent`]s and returns
/// [`BridgeAction`]s, so the same logic drives any transport and is
/// testable without I/O. The two channels stay independently cancelable:
/// closing one never blocks or fails the other's teardown.
#[derive(Debug)]
pub struct SessionBridge {
    room_id: String,
    phase: BridgePhase,
    stalled: bool,
    identity: Option<String>,
    media: Option<MediaCredentials>,
    log: Vec<ChatEntry>,
    next_entry_id: u64,
    announced_join: bool,
}

impl SessionBridge {
    pub fn new(room_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            phase: BridgePhase::Idle,
            stalled: false,
            identity: None,
            media: None,
            log: Vec::new(),
            next_entry_id: 0,
            announced_join: false,
        }
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// True once a token fetch has failed. The session then shows an
    /// indefinite loading state; there is no retry.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn media_credentials(&self) -> Option<&MediaCredentials> {
        self.media.as_ref()
    }

    pub fn messages(&self) -> &[ChatEntry] {
        &self.log
    }

    /// Begin the session: the caller is opening the chat socket and the
    /// bridge now waits for the identity handshake.
    pub fn start(&mut self) {
        if self.phase == BridgePhase::Idle {
            self.phase = BridgePhase::AwaitingIdentity;
        }
    }

    /// Feed one observed event through the state machine.
    pub fn handle_event(&mut self, event: BridgeEvent) -> Vec<BridgeAction> {
        if self.phase == BridgePhase::Closed {
            return Vec::new();
        }

        match event {
            BridgeEvent::ChatConnected { user_id } => self.on_chat_connected(user_id),
            BridgeEvent::TokenIssued { token, server_url } => {
                self.on_token_issued(MediaCredentials { token, server_url })
            }
            BridgeEvent::TokenFetchFailed { reason } => {
                tracing::error!(room_id = %self.room_id, reason = %reason, "Token fetch failed");
                self.stalled = true;
                Vec::new()
            }
            BridgeEvent::ChatMessage {
                room_id,
                sender,
                message,
            } => {
                self.on_chat_message(&room_id, sender, message);
                Vec::new()
            }
            BridgeEvent::ChatClosed => {
                self.phase = BridgePhase::Closed;
                Vec::new()
            }
        }
    }

    fn on_chat_connected(&mut self, user_id: String) -> Vec<BridgeAction> {
        if self.phase != BridgePhase::AwaitingIdentity {
            return Vec::new();
        }

        self.identity = Some(user_id.clone());
        self.announced_join = true;
        self.phase = BridgePhase::AwaitingToken;

        vec![
            BridgeAction::AnnounceJoin(ClientMessage::JoinRoom {
                room_id: self.room_id.clone(),
            }),
            BridgeAction::FetchToken {
                room_id: self.room_id.clone(),
                identity: user_id,
            },
        ]
    }

    fn on_token_issued(&mut self, credentials: MediaCredentials) -> Vec<BridgeAction> {
        // The identity gate already passed, or no fetch was requested.
        if self.phase != BridgePhase::AwaitingToken || self.stalled {
            return Vec::new();
        }

        self.media = Some(credentials.clone());
        self.phase = BridgePhase::Ready;

        vec![BridgeAction::ConnectMedia(credentials)]
    }

    fn on_chat_message(&mut self, room_id: &str, sender: String, message: String) {
        if room_id != self.room_id {
            return;
        }
        // Self-echo: the relay fans chat out to the full room including us,
        // and the local entry was already appended by send_chat.
        if self.identity.as_deref() == Some(sender.as_str()) {
            return;
        }

        self.append(message, sender);
    }

    /// Record an outgoing chat message and produce the frame to put on the
    /// wire. Returns `None` until the identity has resolved.
    pub fn send_chat(&mut self, text: &str) -> Option<ClientMessage> {
        if self.phase == BridgePhase::Closed || text.trim().is_empty() {
            return None;
        }
        let identity = self.identity.clone()?;

        self.append(text.to_string(), identity);

        Some(ClientMessage::Chat {
            room_id: self.room_id.clone(),
            message: text.to_string(),
        })
    }

    /// Explicit teardown: announce departure if membership was announced,
    /// then close. Safe to call in any phase, including after the media
    /// channel failed or never connected.
    pub fn close(&mut self) -> Vec<BridgeAction> {
        if self.phase == BridgePhase::Closed {
            return Vec::new();
        }

        let actions = if self.announced_join {
            vec![BridgeAction::AnnounceLeave(ClientMessage::LeaveRoom {
                room_id: self.room_id.clone(),
            })]
        } else {
            Vec::new()
        };

        self.phase = BridgePhase::Closed;
        actions
    }

    fn append(&mut self, text: String, sender: String) {
        let entry = ChatEntry {
            id: self.next_entry_id,
            text,
            sender,
            timestamp: Utc::now(),
        };
        self.next_entry_id += 1;
        self.log.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn connected_bridge() -> SessionBridge {
        let mut bridge = SessionBridge::new("room-abc");
        bridge.start();
        bridge.handle_event(BridgeEvent::ChatConnected {
            user_id: "alice".to_string(),
        });
        bridge
    }

    #[test]
    fn identity_handshake_announces_join_then_fetches_token() {
        let mut bridge = SessionBridge::new("room-abc");
        bridge.start();
        assert_eq!(bridge.phase(), BridgePhase::AwaitingIdentity);

        let actions = bridge.handle_event(BridgeEvent::ChatConnected {
            user_id: "alice".to_string(),
        });

        assert_eq!(
            actions,
            vec![
                BridgeAction::AnnounceJoin(ClientMessage::JoinRoom {
                    room_id: "room-abc".to_string()
                }),
                BridgeAction::FetchToken {
                    room_id: "room-abc".to_string(),
                    identity: "alice".to_string()
                },
            ]
        );
        assert_eq!(bridge.phase(), BridgePhase::AwaitingToken);
        assert_eq!(bridge.identity(), Some("alice"));
    }

    #[test]
    fn media_connects_only_after_both_gates() {
        let mut bridge = SessionBridge::new("room-abc");
        bridge.start();

        // A token arriving before the identity resolves is impossible in the
        // normal flow; if it happens, it must not open the media channel.
        let actions = bridge.handle_event(BridgeEvent::TokenIssued {
            token: "tok".to_string(),
            server_url: "wss://lk".to_string(),
        });
        assert!(actions.is_empty());
        assert_eq!(bridge.phase(), BridgePhase::AwaitingIdentity);

        bridge.handle_event(BridgeEvent::ChatConnected {
            user_id: "alice".to_string(),
        });
        let actions = bridge.handle_event(BridgeEvent::TokenIssued {
            token: "tok".to_string(),
            server_url: "wss://lk".to_string(),
        });

        assert_eq!(
            actions,
            vec![BridgeAction::ConnectMedia(MediaCredentials {
                token: "tok".to_string(),
                server_url: "wss://lk".to_string()
            })]
        );
        assert_eq!(bridge.phase(), BridgePhase::Ready);
    }

    #[test]
    fn token_fetch_failure_stalls_the_session_for_good() {
        let mut bridge = connected_bridge();

        let actions = bridge.handle_event(BridgeEvent::TokenFetchFailed {
            reason: "503 from backend".to_string(),
        });
        assert!(actions.is_empty());
        assert!(bridge.is_stalled());

        // No retry: a late token must not revive the session.
        let actions = bridge.handle_event(BridgeEvent::TokenIssued {
            token: "tok".to_string(),
            server_url: "wss://lk".to_string(),
        });
        assert!(actions.is_empty());
        assert_ne!(bridge.phase(), BridgePhase::Ready);

        // Chat keeps working while the media side is stalled.
        bridge.handle_event(BridgeEvent::ChatMessage {
            room_id: "room-abc".to_string(),
            sender: "bob".to_string(),
            message: "still here".to_string(),
        });
        assert_eq!(bridge.messages().len(), 1);
    }

    #[test]
    fn self_echo_is_never_appended() {
        let mut bridge = connected_bridge();

        let frame = bridge.send_chat("hello").expect("Should produce a frame");
        assert_eq!(
            frame,
            ClientMessage::Chat {
                room_id: "room-abc".to_string(),
                message: "hello".to_string()
            }
        );
        assert_eq!(bridge.messages().len(), 1);

        // The relay echoes our own message back; it must not duplicate.
        bridge.handle_event(BridgeEvent::ChatMessage {
            room_id: "room-abc".to_string(),
            sender: "alice".to_string(),
            message: "hello".to_string(),
        });
        assert_eq!(bridge.messages().len(), 1);

        bridge.handle_event(BridgeEvent::ChatMessage {
            room_id: "room-abc".to_string(),
            sender: "bob".to_string(),
            message: "hi alice".to_string(),
        });
        assert_eq!(bridge.messages().len(), 2);
        assert_eq!(bridge.messages()[1].sender, "bob");
    }

    #[test]
    fn log_is_ordered_and_append_only() {
        let mut bridge = connected_bridge();

        bridge.send_chat("one");
        bridge.handle_event(BridgeEvent::ChatMessage {
            room_id: "room-abc".to_string(),
            sender: "bob".to_string(),
            message: "two".to_string(),
        });
        bridge.send_chat("three");

        let ids: Vec<u64> = bridge.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        let texts: Vec<&str> = bridge.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn frames_for_other_rooms_are_ignored() {
        let mut bridge = connected_bridge();

        bridge.handle_event(BridgeEvent::ChatMessage {
            room_id: "another-room".to_string(),
            sender: "bob".to_string(),
            message: "wrong room".to_string(),
        });
        assert!(bridge.messages().is_empty());
    }

    #[test]
    fn close_announces_leave_once_membership_was_announced() {
        let mut bridge = connected_bridge();

        let actions = bridge.close();
        assert_eq!(
            actions,
            vec![BridgeAction::AnnounceLeave(ClientMessage::LeaveRoom {
                room_id: "room-abc".to_string()
            })]
        );
        assert_eq!(bridge.phase(), BridgePhase::Closed);

        // Closed is terminal.
        assert!(bridge.close().is_empty());
        assert!(bridge.send_chat("late").is_none());
        let actions = bridge.handle_event(BridgeEvent::ChatConnected {
            user_id: "alice".to_string(),
        });
        assert!(actions.is_empty());
    }

    #[test]
    fn close_before_join_announces_nothing() {
        let mut bridge = SessionBridge::new("room-abc");
        bridge.start();

        // Chat never connected, so there is no membership to renounce and
        // nothing about the media channel blocks the teardown.
        assert!(bridge.close().is_empty());
        assert_eq!(bridge.phase(), BridgePhase::Closed);
    }

    #[test]
    fn chat_teardown_is_independent_of_media_state() {
        let mut bridge = connected_bridge();
        bridge.handle_event(BridgeEvent::TokenFetchFailed {
            reason: "boom".to_string(),
        });

        // Stalled media must not prevent the chat-side leave.
        let actions = bridge.close();
        assert_eq!(actions.len(), 1);
        assert_eq!(bridge.phase(), BridgePhase::Closed);
    }

    #[test]
    fn send_chat_requires_a_resolved_identity() {
        let mut bridge = SessionBridge::new("room-abc");
        bridge.start();
        assert!(bridge.send_chat("too early").is_none());
        assert!(bridge.send_chat("").is_none());
    }
}
