//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture tracked between pointer-down and
//! pointer-up, carrying what the engine needs to compute a live preview and
//! the final commit on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use frames::{Shape, ShapeKind};

use crate::camera::Point;
use crate::consts::{DEFAULT_COLOR, DEFAULT_SIZE};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select, move, and resize existing shapes (default).
    #[default]
    Select,
    /// Freehand: one pen point per pointer move.
    Pen,
    Rectangle,
    Circle,
    Arrow,
}

impl Tool {
    /// The shape kind this tool draws, or `None` for [`Tool::Select`].
    #[must_use]
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Self::Select => None,
            Self::Pen => Some(ShapeKind::Pen),
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Circle => Some(ShapeKind::Circle),
            Self::Arrow => Some(ShapeKind::Arrow),
        }
    }

    /// Whether this tool draws a two-point shape committed on pointer-up.
    #[must_use]
    pub fn is_spanning(self) -> bool {
        matches!(self, Self::Rectangle | Self::Circle | Self::Arrow)
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Alt / Option key. Turns a primary-button drag into a pan.
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone)]
pub struct UiState {
    pub tool: Tool,
    /// Index of the selected shape, if any.
    pub selected: Option<usize>,
    /// Stroke color for newly drawn shapes.
    pub color: String,
    /// Stroke size for newly drawn shapes.
    pub size: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self { tool: Tool::default(), selected: None, color: DEFAULT_COLOR.to_owned(), size: DEFAULT_SIZE }
    }
}

/// Internal state for the input state machine.
///
/// All points are world space except `Panning::last_screen`.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A drawing tool is active with the pointer held down.
    Drawing {
        tool: Tool,
        /// Where the pointer went down; the anchor of the new shape.
        start: Point,
    },
    /// Moving the shape at `index`.
    Dragging {
        index: usize,
        /// Pointer position at pointer-down; deltas are measured from here.
        start: Point,
        /// The shape as it was at pointer-down.
        original: Shape,
    },
    /// Dragging resize handle `handle` of the shape at `index`.
    Resizing {
        index: usize,
        handle: usize,
        /// The shape as it was at pointer-down.
        original: Shape,
    },
    /// Moving the viewport.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
}

impl InputState {
    /// Index of the shape this gesture edits, for drag and resize.
    #[must_use]
    pub fn target(&self) -> Option<usize> {
        match self {
            Self::Dragging { index, .. } | Self::Resizing { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Point a drag or resize at a new index after the list shifted.
    pub fn retarget(&mut self, next: usize) {
        if let Self::Dragging { index, .. } | Self::Resizing { index, .. } = self {
            *index = next;
        }
    }
}
