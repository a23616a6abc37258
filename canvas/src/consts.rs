//! Shared numeric constants for the canvas crate.

use std::f64::consts::PI;

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed camera scale.
pub const MIN_ZOOM: f64 = 0.2;

/// Largest allowed camera scale.
pub const MAX_ZOOM: f64 = 5.0;

/// Scale multiplier applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

// ── Geometry ────────────────────────────────────────────────────

/// Consecutive pen points closer than this are drawn joined.
pub const PEN_JOIN_DISTANCE: f64 = 100.0;

/// Floor for a resized box side or circle radius, in world units.
pub const MIN_SHAPE_SIZE: f64 = 20.0;

/// Lower bound on the arrow hit tolerance; thicker arrows use their size.
pub const ARROW_HIT_TOLERANCE_MIN: f64 = 5.0;

/// Gap between a circle's bounding box and its handles, keeping them off the stroke.
pub const CIRCLE_HANDLE_OFFSET: f64 = 8.0;

// ── Handles ─────────────────────────────────────────────────────

/// Rendered handle side length in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 10.0;

/// Half-width of the square handle hit box in screen pixels.
pub const HANDLE_HIT_SLOP_PX: f64 = 6.0;

pub const HANDLE_COLOR: &str = "#007bff";

// ── Rendering ───────────────────────────────────────────────────

/// Dash pattern for previews of shapes still being drawn.
pub const PREVIEW_DASH: [f64; 2] = [5.0, 5.0];

/// Arrowhead length as a multiple of stroke size.
pub const ARROW_HEAD_SCALE: f64 = 3.0;

/// Arrowhead half-angle (30°).
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

// ── Session ─────────────────────────────────────────────────────

/// Maximum number of snapshots kept for local undo.
pub const HISTORY_LIMIT: usize = 200;

pub const DEFAULT_COLOR: &str = "red";

pub const DEFAULT_SIZE: f64 = 3.0;
