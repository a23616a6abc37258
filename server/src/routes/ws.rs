//! WebSocket handler — authenticated room transport.
//!
//! DESIGN
//! ======
//! The credential is checked before the upgrade; a refused handshake never
//! becomes a socket. After upgrade the connection is registered and the
//! handler enters a `select!` loop:
//! - Incoming client text → decode → `router::dispatch`
//! - Events queued by peers' broadcasts → encode → forward to client
//!
//! Each inbound message is dispatched to completion before the next is
//! read, so one connection's events keep their order.
//!
//! LIFECYCLE
//! =========
//! 1. `GET /ws?token=…` → verify → upgrade (or 401 / 500)
//! 2. Register with an empty room set
//! 3. Client frames → dispatch; undecodable frames are dropped silently
//! 4. Close or transport error → unregister (no grace period)

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frames::{ServerEvent, UserId};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::registry::ConnectionId;
use crate::services::router;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(token) = params.get("token").filter(|t| !t.is_empty()) else {
        return (StatusCode::UNAUTHORIZED, "token required").into_response();
    };

    let user_id = match state.verifier.verify(token).await {
        Ok(Some(uid)) => uid,
        Ok(None) => {
            info!("ws: refused handshake with unknown token");
            return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
        }
        Err(e) => {
            error!(error = %e, "ws token validation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "token validation error").into_response();
        }
    };

    ws.on_upgrade(move |socket| run_ws(socket, state, user_id))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, user_id: UserId) {
    let (client_tx, mut client_rx) = mpsc::channel::<Arc<ServerEvent>>(state.client_channel_capacity);
    let (connection_id, connections) = {
        let mut registry = state.registry.write().await;
        let id = registry.register(user_id.clone(), client_tx);
        (id, registry.connection_count())
    };

    info!(%connection_id, %user_id, connections, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        process_inbound_text(&state, connection_id, &user_id, text.as_str()).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    let mut registry = state.registry.write().await;
    let rooms = registry.unregister(connection_id).map_or(0, |conn| conn.rooms.len());
    info!(
        %connection_id,
        %user_id,
        rooms,
        live_rooms = registry.room_count(),
        "ws: client disconnected"
    );
}

/// Decode one inbound text frame and hand it to the router. Malformed
/// frames are logged and dropped; the sender gets no reply.
async fn process_inbound_text(state: &AppState, connection_id: ConnectionId, user_id: &str, text: &str) {
    match frames::decode_client_event(text) {
        Ok(event) => {
            debug!(%connection_id, event = event.kind(), room_id = event.room_id(), "ws: recv event");
            router::dispatch(state, connection_id, user_id, event).await;
        }
        Err(e) => warn!(%connection_id, error = %e, "ws: dropped malformed frame"),
    }
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    let text = match frames::encode_server_event(event) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "ws: failed to encode outbound event");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
