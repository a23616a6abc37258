//! Local undo history.
//!
//! A linear list of shape-list snapshots with a cursor. Only rewinding is
//! exposed; recording after a rewind discards everything past the cursor.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use frames::Shape;

use crate::consts::HISTORY_LIMIT;

#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Vec<Shape>>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Start from `initial` as the only snapshot.
    #[must_use]
    pub fn new(initial: Vec<Shape>) -> Self {
        Self { snapshots: vec![initial], cursor: 0 }
    }

    /// Push `shapes` as the newest snapshot.
    ///
    /// Entries after the cursor are dropped first. Past [`HISTORY_LIMIT`]
    /// the oldest snapshots fall off the front.
    pub fn record(&mut self, shapes: &[Shape]) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(shapes.to_vec());
        if self.snapshots.len() > HISTORY_LIMIT {
            let excess = self.snapshots.len() - HISTORY_LIMIT;
            self.snapshots.drain(..excess);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step the cursor back one snapshot and return it. `None` at the start.
    pub fn rewind(&mut self) -> Option<&[Shape]> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor).map(Vec::as_slice)
    }

    /// Forget everything and start over from `shapes`.
    pub fn reset(&mut self, shapes: Vec<Shape>) {
        self.snapshots = vec![shapes];
        self.cursor = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> &[Shape] {
        self.snapshots.get(self.cursor).map_or(&[], Vec::as_slice)
    }
}
