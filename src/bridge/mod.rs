//! Client-side session bridge.
//!
//! A call session runs over two independently-authenticated channels: the
//! chat WebSocket (identity comes from its `connected` handshake) and the
//! LiveKit media connection (credentials come from the token endpoint).
//! [`SessionBridge`] joins the two lifecycles under one logical session
//! keyed by room id, gating the media connection until both the identity
//! and the token have resolved.

pub mod state;
pub mod token_client;

pub use state::{
    BridgeAction, BridgeEvent, BridgePhase, ChatEntry, MediaCredentials, SessionBridge,
};
pub use token_client::TokenClient;
