//! Room broadcast router — membership changes and event fan-out.
//!
//! DESIGN
//! ======
//! `plan` is pure: it maps one decoded client event to an `Outcome` (who
//! hears what) and an optional `PersistOp`. `dispatch` applies both: it
//! mutates membership or fans out under the registry lock, releases the
//! lock, and only then queues the durable write.
//!
//! | event          | membership | relayed to             | persisted       |
//! |----------------|------------|------------------------|-----------------|
//! | join_room      | add        | -                      | no              |
//! | leave_room     | remove     | -                      | no              |
//! | chat           | -          | room incl. sender      | chat row        |
//! | stroke         | -          | room excl. sender      | append          |
//! | update_stroke  | -          | room excl. sender      | update at index |
//! | delete_stroke  | -          | room excl. sender      | delete at index |
//! | undo           | -          | room excl. sender      | no              |
//!
//! Relayed events are not checked against the sender's own membership.

use std::sync::Arc;

use frames::{ClientEvent, RoomId, ServerEvent};
use tracing::{debug, info};

use super::persistence::{self, PersistOp};
use crate::registry::ConnectionId;
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// What the dispatch layer does with an event. Planning never touches the
/// registry or the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Join(RoomId),
    Leave(RoomId),
    /// Every room member, sender included. A chat echo is followed by a
    /// fresh `active_count`.
    Broadcast(ServerEvent),
    /// Every room member except the sending connection.
    BroadcastExcludeSender(ServerEvent),
}

#[must_use]
pub fn plan(event: ClientEvent, user_id: &str) -> (Outcome, Option<PersistOp>) {
    let user_id = user_id.to_owned();
    match event {
        ClientEvent::JoinRoom { room_id } => (Outcome::Join(room_id), None),
        ClientEvent::LeaveRoom { room_id } => (Outcome::Leave(room_id), None),
        ClientEvent::Chat { room_id, message } => {
            let persist = PersistOp::Chat { room_id: room_id.clone(), user_id: user_id.clone(), message: message.clone() };
            (Outcome::Broadcast(ServerEvent::Chat { room_id, message, user_id }), Some(persist))
        }
        ClientEvent::Stroke { room_id, data } => {
            let persist = PersistOp::AppendStroke { room_id: room_id.clone(), user_id: user_id.clone(), shape: data.clone() };
            (Outcome::BroadcastExcludeSender(ServerEvent::Stroke { room_id, data, user_id }), Some(persist))
        }
        ClientEvent::UpdateStroke { room_id, index, data } => {
            let persist = PersistOp::UpdateStroke { room_id: room_id.clone(), index, shape: data.clone() };
            (Outcome::BroadcastExcludeSender(ServerEvent::UpdateStroke { room_id, index, data, user_id }), Some(persist))
        }
        ClientEvent::DeleteStroke { room_id, stroke_index } => {
            let persist = PersistOp::DeleteStroke { room_id: room_id.clone(), index: stroke_index };
            (
                Outcome::BroadcastExcludeSender(ServerEvent::DeleteStroke { room_id, stroke_index, user_id }),
                Some(persist),
            )
        }
        ClientEvent::Undo { room_id, stroke_history } => (
            Outcome::BroadcastExcludeSender(ServerEvent::Undo { room_id, data: stroke_history, user_id }),
            None,
        ),
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Apply one client event from `connection_id`. Returns whether a write
/// was queued.
pub async fn dispatch(state: &AppState, connection_id: ConnectionId, user_id: &str, event: ClientEvent) -> bool {
    let kind = event.kind();
    let (outcome, persist) = plan(event, user_id);

    match outcome {
        Outcome::Join(room_id) => {
            let mut registry = state.registry.write().await;
            let joined = registry.join_room(connection_id, &room_id);
            info!(%connection_id, %user_id, %room_id, joined, active = registry.active_count(&room_id), "router: join_room");
        }
        Outcome::Leave(room_id) => {
            let mut registry = state.registry.write().await;
            let left = registry.leave_room(connection_id, &room_id);
            info!(%connection_id, %user_id, %room_id, left, active = registry.active_count(&room_id), "router: leave_room");
        }
        Outcome::Broadcast(event) => {
            let registry = state.registry.read().await;
            let room_id = event.room_id().to_owned();
            let is_chat = matches!(event, ServerEvent::Chat { .. });
            let delivered = registry.broadcast(&room_id, &Arc::new(event), None);
            debug!(%connection_id, %room_id, event = kind, delivered, "router: broadcast");

            if is_chat {
                let active_count = registry.active_count(&room_id);
                let count = Arc::new(ServerEvent::ActiveCount { room_id: room_id.clone(), active_count });
                registry.broadcast(&room_id, &count, None);
            }
        }
        Outcome::BroadcastExcludeSender(event) => {
            let registry = state.registry.read().await;
            let room_id = event.room_id().to_owned();
            let delivered = registry.broadcast(&room_id, &Arc::new(event), Some(connection_id));
            let member = registry.is_member(connection_id, &room_id);
            debug!(%connection_id, %room_id, event = kind, delivered, member, "router: broadcast");
        }
    }

    persist.is_some_and(|op| persistence::enqueue(&state.persist_tx, op))
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
