//! Persistence service — ordered background writes behind the live fan-out.
//!
//! DESIGN
//! ======
//! The router broadcasts first and only then enqueues a `PersistOp` with a
//! non-blocking `try_send`. One long-lived writer task drains the bounded
//! queue and applies ops strictly in enqueue order, so positional updates
//! and deletes always land on the rows the preceding appends created, and
//! Postgres ids follow arrival order. Nothing awaits the writer, so a slow
//! or hung store never delays delivery.
//!
//! ERROR HANDLING
//! ==============
//! A failed write is logged at `warn` and dropped. No retry, no client
//! notification: peers may already render state the store never recorded.
//! A full queue drops the op the same way.

use std::sync::Arc;

use frames::{RoomId, Shape, UserId};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::{StoreError, StrokeStore};

/// One durable write derived from a client event.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOp {
    Chat { room_id: RoomId, user_id: UserId, message: String },
    AppendStroke { room_id: RoomId, user_id: UserId, shape: Shape },
    UpdateStroke { room_id: RoomId, index: usize, shape: Shape },
    DeleteStroke { room_id: RoomId, index: usize },
}

impl PersistOp {
    #[must_use]
    pub fn room_id(&self) -> &str {
        match self {
            Self::Chat { room_id, .. }
            | Self::AppendStroke { room_id, .. }
            | Self::UpdateStroke { room_id, .. }
            | Self::DeleteStroke { room_id, .. } => room_id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::AppendStroke { .. } => "append_stroke",
            Self::UpdateStroke { .. } => "update_stroke",
            Self::DeleteStroke { .. } => "delete_stroke",
        }
    }
}

/// Run one write to completion.
///
/// # Errors
///
/// Propagates the store's error unchanged.
pub async fn apply(store: &dyn StrokeStore, op: &PersistOp) -> Result<(), StoreError> {
    match op {
        PersistOp::Chat { room_id, user_id, message } => store.append_chat(room_id, user_id, message).await,
        PersistOp::AppendStroke { room_id, user_id, shape } => store.append_stroke(room_id, user_id, shape).await,
        PersistOp::UpdateStroke { room_id, index, shape } => store.update_stroke_at(room_id, *index, shape).await,
        PersistOp::DeleteStroke { room_id, index } => store.delete_stroke_at(room_id, *index).await,
    }
}

/// Spawn the single writer and return its queue sender.
///
/// The task ends once every sender is dropped and the queue is drained.
#[must_use]
pub fn spawn_persistence_worker(store: Arc<dyn StrokeStore>, capacity: usize) -> (mpsc::Sender<PersistOp>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<PersistOp>(capacity.max(1));
    info!(queue_capacity = capacity, "persistence worker started");

    let handle = tokio::spawn(async move {
        while let Some(op) = rx.recv().await {
            match apply(store.as_ref(), &op).await {
                Ok(()) => debug!(op = op.kind(), room_id = op.room_id(), "persistence: write ok"),
                Err(e) => warn!(op = op.kind(), room_id = op.room_id(), error = %e, "persistence: write failed"),
            }
        }
        debug!("persistence worker stopped");
    });

    (tx, handle)
}

/// Best-effort, non-blocking enqueue. Returns whether the op was queued.
pub fn enqueue(tx: &mpsc::Sender<PersistOp>, op: PersistOp) -> bool {
    match tx.try_send(op) {
        Ok(()) => true,
        Err(TrySendError::Full(op)) => {
            warn!(op = op.kind(), room_id = op.room_id(), "persist queue full; dropping write");
            false
        }
        Err(TrySendError::Closed(op)) => {
            warn!(op = op.kind(), room_id = op.room_id(), "persist queue closed; dropping write");
            false
        }
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
