use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::ws::{ClientHandle, ClientMessage, ServerMessage, WsSessionState};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct WsQueryParams {
    pub token: String,
}

/// WebSocket routes
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

/// WebSocket upgrade handler. The token is carried in the query string
/// because browsers cannot set headers on WebSocket requests.
async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsQueryParams>,
) -> Result<Response, AppError> {
    let claims = state.auth.validate_token(&params.token)?;

    tracing::info!(user_id = %claims.sub, "WebSocket upgrade request");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, claims)))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, claims: crate::models::Claims) {
    let conn_id = Uuid::new_v4().to_string();
    let user_id = claims.sub.clone();

    tracing::info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connected");

    // Create message channel for sending to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let mut session = WsSessionState::new(conn_id.clone(), &claims);
    let client_handle = ClientHandle::new(conn_id.clone(), user_id.clone(), tx.clone());

    // The identity handshake: the first frame resolves this connection's
    // identity for the client's session bridge.
    let _ = tx.send(ServerMessage::Connected {
        user_id: user_id.clone(),
    });

    // Split socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Task for sending messages to client
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Process incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Err(e) = handle_message(&text, &client_handle, &mut session, &state).await {
                    tracing::warn!(conn_id = %conn_id, error = %e, "Error handling chat frame");
                    let code = match e {
                        AppError::NotFound(_) => 404,
                        _ => 400,
                    };
                    let _ = client_handle.send(ServerMessage::error(code, &e.to_string()));
                }
            }
            Ok(Message::Ping(_data)) => {
                tracing::trace!(conn_id = %conn_id, "Ping received");
            }
            Ok(Message::Close(_)) => {
                tracing::info!(conn_id = %conn_id, "WebSocket close received");
                break;
            }
            Err(e) => {
                tracing::error!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Cleanup on disconnect: leave every room this connection had joined.
    // Room teardown is independent per room and cannot fail.
    tracing::info!(conn_id = %conn_id, user_id = %user_id, "WebSocket disconnected, cleaning up");

    for room_id in &session.joined_rooms {
        state.connections.remove_client_from_room(room_id, &conn_id);
    }

    send_task.abort();
}

/// Handle an incoming chat frame. The relay is a pass-through: nothing is
/// persisted, and chat messages are fanned out to the full room membership
/// including the sender.
async fn handle_message(
    text: &str,
    client_handle: &ClientHandle,
    session: &mut WsSessionState,
    state: &AppState,
) -> Result<(), AppError> {
    let msg: ClientMessage = serde_json::from_str(text)?;

    match msg {
        ClientMessage::JoinRoom { room_id } => {
            // Joining requires the room to exist in the store.
            if !state.room_repo.room_exists(&room_id).await? {
                return Err(AppError::NotFound(format!("Room {} not found", room_id)));
            }

            let room = state.connections.get_or_create_room(&room_id);
            room.add_client(client_handle.clone());
            session.add_room(room_id.clone());

            tracing::info!(
                room_id = %room_id,
                user_id = %session.user_id,
                "User joined chat room"
            );
        }
        ClientMessage::LeaveRoom { room_id } => {
            state
                .connections
                .remove_client_from_room(&room_id, &session.conn_id);
            session.remove_room(&room_id);

            tracing::info!(
                room_id = %room_id,
                user_id = %session.user_id,
                "User left chat room"
            );
        }
        ClientMessage::Chat { room_id, message } => {
            if !session.is_in_room(&room_id) {
                return Err(AppError::BadRequest(
                    "Cannot send chat to a room that was not joined".to_string(),
                ));
            }

            state.connections.broadcast_to_room(
                &room_id,
                ServerMessage::Chat {
                    room_id: room_id.clone(),
                    sender: session.user_id.clone(),
                    message,
                },
            );
        }
    }

    Ok(())
}
