//! Room session: the client side of one room subscription.
//!
//! Socket callbacks feed raw text in with [`RoomSession::receive_text`]; the
//! host drains the queue into the engine on its own turn, so remote events
//! and local gestures are applied one at a time in arrival order. Local
//! [`Action`]s go the other way through [`RoomSession::outbound`].
//!
//! The session never reconnects. After a close the host calls
//! [`RoomSession::on_open`] again on the new socket, which re-sends
//! `join_room`.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::VecDeque;

use frames::{ClientEvent, RoomId, ServerEvent, UserId, decode_server_event};
use log::debug;

use crate::engine::{Action, EngineCore};

/// Room traffic the canvas does not draw, surfaced for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Chat { user_id: UserId, message: String },
    ActiveCount(usize),
}

#[derive(Debug)]
pub struct RoomSession {
    room_id: RoomId,
    connected: bool,
    inbox: VecDeque<ServerEvent>,
    notices: Vec<Notice>,
}

impl RoomSession {
    #[must_use]
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        Self { room_id: room_id.into(), connected: false, inbox: VecDeque::new(), notices: Vec::new() }
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The socket (re)opened. Returns the subscribe event to send.
    pub fn on_open(&mut self) -> ClientEvent {
        self.connected = true;
        ClientEvent::JoinRoom { room_id: self.room_id.clone() }
    }

    /// The socket closed. Outbound traffic is dropped until the next open.
    pub fn on_close(&mut self) {
        self.connected = false;
    }

    /// Unsubscribe event, if connected.
    #[must_use]
    pub fn leave(&self) -> Option<ClientEvent> {
        if !self.connected {
            return None;
        }
        Some(ClientEvent::LeaveRoom { room_id: self.room_id.clone() })
    }

    /// Chat event for this room, if connected.
    #[must_use]
    pub fn chat(&self, message: impl Into<String>) -> Option<ClientEvent> {
        if !self.connected {
            debug!("session: dropping chat while disconnected");
            return None;
        }
        Some(ClientEvent::Chat { room_id: self.room_id.clone(), message: message.into() })
    }

    /// Decode one inbound frame and queue it. Returns whether it was queued.
    ///
    /// Malformed text and events for other rooms are dropped.
    pub fn receive_text(&mut self, text: &str) -> bool {
        let event = match decode_server_event(text) {
            Ok(event) => event,
            Err(e) => {
                debug!("session: dropping malformed frame: {e}");
                return false;
            }
        };
        if event.room_id() != self.room_id {
            debug!("session: dropping event for room {} (joined {})", event.room_id(), self.room_id);
            return false;
        }
        self.inbox.push_back(event);
        true
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    /// Apply every queued event to `core` in arrival order.
    pub fn drain(&mut self, core: &mut EngineCore) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Some(event) = self.inbox.pop_front() {
            match &event {
                ServerEvent::Chat { user_id, message, .. } => {
                    self.notices.push(Notice::Chat { user_id: user_id.clone(), message: message.clone() });
                }
                ServerEvent::ActiveCount { active_count, .. } => {
                    self.notices.push(Notice::ActiveCount(*active_count));
                }
                _ => {}
            }
            for action in core.apply_remote(&event) {
                // One redraw covers the whole batch.
                if action == Action::RenderNeeded && actions.contains(&Action::RenderNeeded) {
                    continue;
                }
                actions.push(action);
            }
        }
        actions
    }

    /// Chat and presence updates collected by [`Self::drain`] since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Wire events for local engine actions. Empty while disconnected.
    #[must_use]
    pub fn outbound(&self, actions: &[Action]) -> Vec<ClientEvent> {
        if !self.connected {
            if !actions.is_empty() {
                debug!("session: dropping {} local actions while disconnected", actions.len());
            }
            return Vec::new();
        }
        let room_id = || self.room_id.clone();
        actions
            .iter()
            .filter_map(|action| match action {
                Action::StrokeCreated(shape) => Some(ClientEvent::Stroke { room_id: room_id(), data: shape.clone() }),
                Action::StrokeUpdated { index, shape } => {
                    Some(ClientEvent::UpdateStroke { room_id: room_id(), index: *index, data: shape.clone() })
                }
                Action::StrokeDeleted { index } => {
                    Some(ClientEvent::DeleteStroke { room_id: room_id(), stroke_index: *index })
                }
                Action::Undone(shapes) => Some(ClientEvent::Undo { room_id: room_id(), stroke_history: shapes.clone() }),
                Action::SelectionChanged(_) | Action::SetCursor(_) | Action::RenderNeeded => None,
            })
            .collect()
    }
}
