//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the connection registry behind one `RwLock`, the stroke store and
//! token verifier as trait objects, and the sender half of the ordered
//! persistence queue.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use crate::registry::Registry;
use crate::services::auth::TokenVerifier;
use crate::services::persistence::PersistOp;
use crate::services::store::StrokeStore;

/// Clone is required by Axum. All inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<Registry>>,
    pub store: Arc<dyn StrokeStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Queue feeding the single persistence writer.
    pub persist_tx: mpsc::Sender<PersistOp>,
    pub client_channel_capacity: usize,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn StrokeStore>,
        verifier: Arc<dyn TokenVerifier>,
        persist_tx: mpsc::Sender<PersistOp>,
        client_channel_capacity: usize,
    ) -> Self {
        Self { registry: Arc::new(RwLock::new(Registry::new())), store, verifier, persist_tx, client_channel_capacity }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use frames::Shape;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::services::auth::StaticTokenVerifier;
    use crate::services::persistence::spawn_persistence_worker;
    use crate::services::store::{MemoryStrokeStore, StoreError};

    /// Tokens accepted by [`test_app_state`], as `(token, user id)`.
    pub const TEST_TOKENS: [(&str, &str); 3] = [("tok-alice", "alice"), ("tok-bob", "bob"), ("tok-carol", "carol")];

    /// App state over an in-memory store. The store handle is returned for
    /// inspecting persisted rows.
    #[must_use]
    pub fn test_app_state() -> (AppState, Arc<MemoryStrokeStore>) {
        let store = Arc::new(MemoryStrokeStore::new());
        let (state, _writer) = test_app_state_over(store.clone());
        (state, store)
    }

    /// App state over any store, with the persistence writer's handle.
    #[must_use]
    pub fn test_app_state_over(store: Arc<dyn StrokeStore>) -> (AppState, JoinHandle<()>) {
        let tokens: HashMap<String, String> =
            TEST_TOKENS.iter().map(|(t, u)| ((*t).to_owned(), (*u).to_owned())).collect();
        let (persist_tx, writer) = spawn_persistence_worker(store.clone(), 64);
        let state = AppState::new(store, Arc::new(StaticTokenVerifier::new(tokens)), persist_tx, 16);
        (state, writer)
    }

    /// Drop `state` and wait for the writer to apply everything queued.
    ///
    /// Every other clone of the state must already be gone.
    pub async fn settle(state: AppState, writer: JoinHandle<()>) {
        drop(state);
        writer.await.expect("persistence writer panicked");
    }

    /// Memory store whose appends sleep first. Everything else is immediate.
    pub struct SlowAppendStore {
        inner: MemoryStrokeStore,
        delay: Duration,
    }

    impl SlowAppendStore {
        #[must_use]
        pub fn new(delay: Duration) -> Self {
            Self { inner: MemoryStrokeStore::new(), delay }
        }
    }

    #[async_trait]
    impl StrokeStore for SlowAppendStore {
        async fn append_stroke(&self, room_id: &str, user_id: &str, shape: &Shape) -> Result<(), StoreError> {
            tokio::time::sleep(self.delay).await;
            self.inner.append_stroke(room_id, user_id, shape).await
        }

        async fn update_stroke_at(&self, room_id: &str, index: usize, shape: &Shape) -> Result<(), StoreError> {
            self.inner.update_stroke_at(room_id, index, shape).await
        }

        async fn delete_stroke_at(&self, room_id: &str, index: usize) -> Result<(), StoreError> {
            self.inner.delete_stroke_at(room_id, index).await
        }

        async fn list_strokes(&self, room_id: &str) -> Result<Vec<Shape>, StoreError> {
            self.inner.list_strokes(room_id).await
        }

        async fn append_chat(&self, room_id: &str, user_id: &str, message: &str) -> Result<(), StoreError> {
            self.inner.append_chat(room_id, user_id, message).await
        }
    }
}
