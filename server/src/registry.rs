//! Connection registry — live connections and room membership.
//!
//! DESIGN
//! ======
//! Connections are keyed by a server-generated id. Rooms are not stored
//! entities: the `rooms` map is a reverse index from room id to member
//! connection ids, kept in lockstep with each connection's own room set. A
//! room key disappears the moment its last member leaves or disconnects.
//!
//! Fan-out is best-effort. Each connection owns a bounded outbound queue and
//! `broadcast` uses `try_send`, so one slow socket never stalls a room.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use frames::{RoomId, ServerEvent, UserId};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Outbound queue handle for one websocket.
pub type Outbox = mpsc::Sender<Arc<ServerEvent>>;

pub struct Connection {
    pub user_id: UserId,
    pub tx: Outbox,
    pub rooms: HashSet<RoomId>,
}

#[derive(Default)]
pub struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly authenticated connection. It starts in no rooms.
    pub fn register(&mut self, user_id: UserId, tx: Outbox) -> ConnectionId {
        let id = Uuid::new_v4();
        self.connections.insert(id, Connection { user_id, tx, rooms: HashSet::new() });
        id
    }

    /// Returns `false` if the connection is unknown or already a member.
    pub fn join_room(&mut self, id: ConnectionId, room_id: &str) -> bool {
        let Some(conn) = self.connections.get_mut(&id) else {
            return false;
        };
        if !conn.rooms.insert(room_id.to_owned()) {
            return false;
        }
        self.rooms.entry(room_id.to_owned()).or_default().insert(id);
        true
    }

    /// Returns `false` if the connection was not a member.
    pub fn leave_room(&mut self, id: ConnectionId, room_id: &str) -> bool {
        let Some(conn) = self.connections.get_mut(&id) else {
            return false;
        };
        if !conn.rooms.remove(room_id) {
            return false;
        }
        self.detach(id, room_id);
        true
    }

    /// Queue `event` for every member of `room_id` except `exclude`.
    /// Returns how many queues accepted it.
    pub fn broadcast(&self, room_id: &str, event: &Arc<ServerEvent>, exclude: Option<ConnectionId>) -> usize {
        let Some(members) = self.rooms.get(room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for member in members {
            if exclude == Some(*member) {
                continue;
            }
            let Some(conn) = self.connections.get(member) else {
                continue;
            };
            match conn.tx.try_send(Arc::clone(event)) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    debug!(connection_id = %member, user_id = %conn.user_id, %room_id, error = %e, "registry: skipped recipient");
                }
            }
        }
        delivered
    }

    #[must_use]
    pub fn active_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, HashSet::len)
    }

    /// Drop the connection and every membership it held.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Connection> {
        let conn = self.connections.remove(&id)?;
        for room_id in &conn.rooms {
            self.detach(id, room_id);
        }
        Some(conn)
    }

    #[must_use]
    pub fn is_member(&self, id: ConnectionId, room_id: &str) -> bool {
        self.connections.get(&id).is_some_and(|c| c.rooms.contains(room_id))
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn detach(&mut self, id: ConnectionId, room_id: &str) {
        if let Some(members) = self.rooms.get_mut(room_id) {
            members.remove(&id);
            if members.is_empty() {
                self.rooms.remove(room_id);
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
