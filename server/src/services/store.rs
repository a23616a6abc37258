//! Stroke store — durable per-room shape lists and chat log.
//!
//! DESIGN
//! ======
//! Shapes are addressed by position. Each backend keeps a stable creation
//! order per room; an index names the row at that offset in the current
//! ordered list, re-resolved on every call. Concurrent deletes can shift the
//! target between the client's view and the lookup. That race is accepted.
//!
//! `PgStrokeStore` orders by a `BIGSERIAL` id. `MemoryStrokeStore` keeps
//! plain vectors and serves development runs without a database and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use frames::{RoomId, Shape, ShapeKind, UserId};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no stroke at index {index} in room {room_id}")]
    NotFound { room_id: RoomId, index: usize },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait StrokeStore: Send + Sync {
    /// Append one shape to the end of the room's list.
    async fn append_stroke(&self, room_id: &str, user_id: &str, shape: &Shape) -> Result<(), StoreError>;

    /// Replace the shape currently at `index`.
    async fn update_stroke_at(&self, room_id: &str, index: usize, shape: &Shape) -> Result<(), StoreError>;

    /// Remove the shape currently at `index`.
    async fn delete_stroke_at(&self, room_id: &str, index: usize) -> Result<(), StoreError>;

    /// Full ordered list for catch-up. Unknown rooms are empty.
    async fn list_strokes(&self, room_id: &str) -> Result<Vec<Shape>, StoreError>;

    async fn append_chat(&self, room_id: &str, user_id: &str, message: &str) -> Result<(), StoreError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

pub struct PgStrokeStore {
    pool: PgPool,
}

impl PgStrokeStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a positional index to a row id.
    async fn row_id_at(&self, room_id: &str, index: usize) -> Result<i64, StoreError> {
        let not_found = || StoreError::NotFound { room_id: room_id.to_owned(), index };
        let offset = i64::try_from(index).map_err(|_| not_found())?;

        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM strokes WHERE room_id = $1 ORDER BY id OFFSET $2 LIMIT 1")
            .bind(room_id)
            .bind(offset)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(id,)| id).ok_or_else(not_found)
    }
}

type StrokeRow = (String, f64, f64, Option<f64>, Option<f64>, String, f64, bool);

fn shape_from_row(row: StrokeRow) -> Shape {
    let (tool, x, y, end_x, end_y, color, size, ellipse) = row;
    let kind = tool.parse::<ShapeKind>().unwrap_or_else(|e| {
        warn!(error = %e, "store: unknown tool in stroke row, reading as pen");
        ShapeKind::Pen
    });
    Shape { kind, x, y, end_x, end_y, color, size, ellipse }
}

#[async_trait]
impl StrokeStore for PgStrokeStore {
    async fn append_stroke(&self, room_id: &str, user_id: &str, shape: &Shape) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO strokes (room_id, user_id, tool, x, y, end_x, end_y, color, size, ellipse)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(room_id)
        .bind(user_id)
        .bind(shape.kind.as_str())
        .bind(shape.x)
        .bind(shape.y)
        .bind(shape.end_x)
        .bind(shape.end_y)
        .bind(&shape.color)
        .bind(shape.size)
        .bind(shape.ellipse)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_stroke_at(&self, room_id: &str, index: usize, shape: &Shape) -> Result<(), StoreError> {
        let id = self.row_id_at(room_id, index).await?;
        sqlx::query(
            "UPDATE strokes
             SET tool = $2, x = $3, y = $4, end_x = $5, end_y = $6, color = $7, size = $8, ellipse = $9
             WHERE id = $1",
        )
        .bind(id)
        .bind(shape.kind.as_str())
        .bind(shape.x)
        .bind(shape.y)
        .bind(shape.end_x)
        .bind(shape.end_y)
        .bind(&shape.color)
        .bind(shape.size)
        .bind(shape.ellipse)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_stroke_at(&self, room_id: &str, index: usize) -> Result<(), StoreError> {
        let id = self.row_id_at(room_id, index).await?;
        sqlx::query("DELETE FROM strokes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_strokes(&self, room_id: &str) -> Result<Vec<Shape>, StoreError> {
        let rows = sqlx::query_as::<_, StrokeRow>(
            "SELECT tool, x, y, end_x, end_y, color, size, ellipse
             FROM strokes WHERE room_id = $1 ORDER BY id",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(shape_from_row).collect())
    }

    async fn append_chat(&self, room_id: &str, user_id: &str, message: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO chats (room_id, user_id, message) VALUES ($1, $2, $3)")
            .bind(room_id)
            .bind(user_id)
            .bind(message)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StoredStroke {
    pub user_id: UserId,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRecord {
    pub user_id: UserId,
    pub message: String,
}

#[derive(Default)]
pub struct MemoryStrokeStore {
    strokes: RwLock<HashMap<RoomId, Vec<StoredStroke>>>,
    chats: RwLock<HashMap<RoomId, Vec<ChatRecord>>>,
}

impl MemoryStrokeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows with their authors, in creation order.
    #[cfg(test)]
    pub async fn stored_strokes(&self, room_id: &str) -> Vec<StoredStroke> {
        self.strokes.read().await.get(room_id).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    pub async fn chats(&self, room_id: &str) -> Vec<ChatRecord> {
        self.chats.read().await.get(room_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl StrokeStore for MemoryStrokeStore {
    async fn append_stroke(&self, room_id: &str, user_id: &str, shape: &Shape) -> Result<(), StoreError> {
        self.strokes
            .write()
            .await
            .entry(room_id.to_owned())
            .or_default()
            .push(StoredStroke { user_id: user_id.to_owned(), shape: shape.clone() });
        Ok(())
    }

    async fn update_stroke_at(&self, room_id: &str, index: usize, shape: &Shape) -> Result<(), StoreError> {
        let mut strokes = self.strokes.write().await;
        let row = strokes
            .get_mut(room_id)
            .and_then(|list| list.get_mut(index))
            .ok_or_else(|| StoreError::NotFound { room_id: room_id.to_owned(), index })?;
        row.shape = shape.clone();
        Ok(())
    }

    async fn delete_stroke_at(&self, room_id: &str, index: usize) -> Result<(), StoreError> {
        let mut strokes = self.strokes.write().await;
        let list = strokes
            .get_mut(room_id)
            .filter(|list| index < list.len())
            .ok_or_else(|| StoreError::NotFound { room_id: room_id.to_owned(), index })?;
        list.remove(index);
        Ok(())
    }

    async fn list_strokes(&self, room_id: &str) -> Result<Vec<Shape>, StoreError> {
        let strokes = self.strokes.read().await;
        Ok(strokes
            .get(room_id)
            .map(|list| list.iter().map(|row| row.shape.clone()).collect())
            .unwrap_or_default())
    }

    async fn append_chat(&self, room_id: &str, user_id: &str, message: &str) -> Result<(), StoreError> {
        self.chats
            .write()
            .await
            .entry(room_id.to_owned())
            .or_default()
            .push(ChatRecord { user_id: user_id.to_owned(), message: message.to_owned() });
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
