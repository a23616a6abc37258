//! REST catch-up routes for a room's persisted strokes.
//!
//! These only touch the store. Live peers learn about edits through the
//! websocket; a client that edits over REST must also send the matching
//! transport event.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use frames::{RoomId, Shape};
use serde::Serialize;
use tracing::{info, warn};

use super::auth::AuthUser;
use crate::services::store::StoreError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StrokesResponse {
    pub strokes: Vec<Shape>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /stroke/{room_id}` — full ordered list.
pub async fn list_strokes(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<StrokesResponse>, StatusCode> {
    let strokes = state.store.list_strokes(&room_id).await.map_err(|e| {
        warn!(%room_id, error = %e, "strokes: list failed");
        store_status(&e)
    })?;
    Ok(Json(StrokesResponse { strokes }))
}

/// `PUT /stroke/{room_id}/{index}` — replace the shape at `index`.
pub async fn update_stroke(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((room_id, index)): Path<(RoomId, usize)>,
    Json(shape): Json<Shape>,
) -> Result<Json<OkResponse>, StatusCode> {
    state.store.update_stroke_at(&room_id, index, &shape).await.map_err(|e| {
        warn!(%room_id, index, error = %e, "strokes: update failed");
        store_status(&e)
    })?;
    info!(%room_id, index, user_id = %auth.user_id, "strokes: updated");
    Ok(Json(OkResponse { ok: true }))
}

/// `DELETE /stroke/{room_id}/{index}` — remove the shape at `index`.
pub async fn delete_stroke(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((room_id, index)): Path<(RoomId, usize)>,
) -> Result<Json<OkResponse>, StatusCode> {
    state.store.delete_stroke_at(&room_id, index).await.map_err(|e| {
        warn!(%room_id, index, error = %e, "strokes: delete failed");
        store_status(&e)
    })?;
    info!(%room_id, index, user_id = %auth.user_id, "strokes: deleted");
    Ok(Json(OkResponse { ok: true }))
}

#[cfg(test)]
#[path = "strokes_test.rs"]
mod tests;
