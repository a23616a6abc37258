//! Rendering: turns the shape list into draw ops and paints them.
//!
//! Drawing is split in two. [`build_scene`] is a pure function from shapes,
//! preview overlay, selection, and camera to a flat list of [`DrawOp`]s, so
//! the scene can be inspected in tests without a browser. [`paint`] is the
//! only place that touches [`web_sys::CanvasRenderingContext2d`]; it replays
//! the ops and never mutates application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use frames::{Shape, ShapeKind};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Camera, Point};
use crate::consts::{ARROW_HEAD_ANGLE, ARROW_HEAD_SCALE, HANDLE_COLOR, HANDLE_SIZE_PX, PEN_JOIN_DISTANCE, PREVIEW_DASH};
use crate::geometry::{self, Bounds};

/// Selection outline width in screen pixels.
const SELECTION_LINE_PX: f64 = 1.0;

/// Uncommitted geometry drawn on top of, or in place of, the shape list.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// A shape still being drawn. Rendered dashed after the list.
    Draft(Shape),
    /// Live drag or resize result standing in for the shape at `index`.
    InPlace { index: usize, shape: Shape },
}

/// Line style shared by stroked ops.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    pub dashed: bool,
}

/// One primitive canvas operation, in world coordinates after `Transform`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Reset the transform to device pixels and wipe the canvas.
    Clear,
    /// Apply the camera: translate by pan, then scale by zoom.
    Transform { pan_x: f64, pan_y: f64, zoom: f64 },
    /// Filled disc.
    Dot { center: Point, radius: f64, color: String },
    Segment { from: Point, to: Point, stroke: Stroke },
    Rect { bounds: Bounds, stroke: Stroke },
    Circle { center: Point, radius: f64, stroke: Stroke },
    Ellipse { center: Point, rx: f64, ry: f64, stroke: Stroke },
    /// Filled square resize handle of side `size`.
    Handle { center: Point, size: f64, color: &'static str },
}

/// Build the full scene.
///
/// `selection` is an index into `shapes`; an out-of-range index draws no
/// selection UI.
#[must_use]
pub fn build_scene(shapes: &[Shape], overlay: Option<&Overlay>, selection: Option<usize>, camera: &Camera) -> Vec<DrawOp> {
    let mut ops = vec![
        DrawOp::Clear,
        DrawOp::Transform { pan_x: camera.pan_x, pan_y: camera.pan_y, zoom: camera.zoom },
    ];

    // Layer 1: committed shapes in list order.
    for i in 0..shapes.len() {
        let Some(shape) = shown(shapes, overlay, i) else { continue };
        let previous = i.checked_sub(1).and_then(|p| shown(shapes, overlay, p));
        push_shape(&mut ops, shape, previous, false);
    }

    // Layer 2: draft preview.
    if let Some(Overlay::Draft(shape)) = overlay {
        push_shape(&mut ops, shape, None, true);
    }

    // Layer 3: selection UI.
    if let Some(shape) = selection.and_then(|i| shown(shapes, overlay, i)) {
        push_selection(&mut ops, shape, camera.zoom);
    }

    ops
}

/// The shape displayed at `i`: the in-place preview if one targets it.
fn shown<'a>(shapes: &'a [Shape], overlay: Option<&'a Overlay>, i: usize) -> Option<&'a Shape> {
    match overlay {
        Some(Overlay::InPlace { index, shape }) if *index == i => Some(shape),
        _ => shapes.get(i),
    }
}

fn push_shape(ops: &mut Vec<DrawOp>, shape: &Shape, previous: Option<&Shape>, dashed: bool) {
    let stroke = Stroke { color: shape.color.clone(), width: shape.size, dashed };
    let (a, e) = (geometry::anchor(shape), geometry::end(shape));

    match shape.kind {
        ShapeKind::Pen => {
            ops.push(DrawOp::Dot { center: a, radius: shape.size, color: shape.color.clone() });
            if let Some(prev) = previous.filter(|p| joins(p, shape)) {
                ops.push(DrawOp::Segment { from: geometry::anchor(prev), to: a, stroke });
            }
        }
        ShapeKind::Rectangle => ops.push(DrawOp::Rect { bounds: Bounds::spanning(a, e), stroke }),
        ShapeKind::Circle => {
            let (rx, ry) = geometry::circle_radii(shape);
            if shape.ellipse {
                ops.push(DrawOp::Ellipse { center: a, rx, ry, stroke });
            } else {
                ops.push(DrawOp::Circle { center: a, radius: rx, stroke });
            }
        }
        ShapeKind::Arrow => {
            let head = shape.size * ARROW_HEAD_SCALE;
            let angle = (e.y - a.y).atan2(e.x - a.x);
            ops.push(DrawOp::Segment { from: a, to: e, stroke: stroke.clone() });
            for side in [angle - ARROW_HEAD_ANGLE, angle + ARROW_HEAD_ANGLE] {
                let barb = Point::new(e.x - head * side.cos(), e.y - head * side.sin());
                ops.push(DrawOp::Segment { from: e, to: barb, stroke: stroke.clone() });
            }
        }
    }
}

/// Consecutive pen points of one style close enough to read as a line.
fn joins(prev: &Shape, next: &Shape) -> bool {
    prev.kind == ShapeKind::Pen
        && prev.color == next.color
        && (prev.size - next.size).abs() < f64::EPSILON
        && geometry::anchor(prev).distance(geometry::anchor(next)) < PEN_JOIN_DISTANCE
}

fn push_selection(ops: &mut Vec<DrawOp>, shape: &Shape, zoom: f64) {
    let handles = geometry::resize_handles(shape);
    if handles.is_empty() {
        return;
    }
    let outline = Stroke { color: HANDLE_COLOR.to_owned(), width: SELECTION_LINE_PX / zoom, dashed: true };
    ops.push(DrawOp::Rect { bounds: geometry::bounds(shape), stroke: outline });

    let size = HANDLE_SIZE_PX / zoom;
    ops.extend(handles.into_iter().map(|center| DrawOp::Handle { center, size, color: HANDLE_COLOR }));
}

// =============================================================
// Painting
// =============================================================

/// Replay `ops` on a 2D context.
///
/// `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn paint(ctx: &CanvasRenderingContext2d, ops: &[DrawOp], viewport_w: f64, viewport_h: f64, dpr: f64) -> Result<(), JsValue> {
    for op in ops {
        match op {
            DrawOp::Clear => {
                ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
                ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);
            }
            DrawOp::Transform { pan_x, pan_y, zoom } => {
                ctx.translate(*pan_x, *pan_y)?;
                ctx.scale(*zoom, *zoom)?;
            }
            DrawOp::Dot { center, radius, color } => {
                ctx.begin_path();
                ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
                ctx.set_fill_style_str(color);
                ctx.fill();
            }
            DrawOp::Segment { from, to, stroke } => {
                apply_stroke(ctx, stroke)?;
                ctx.begin_path();
                ctx.move_to(from.x, from.y);
                ctx.line_to(to.x, to.y);
                ctx.stroke();
            }
            DrawOp::Rect { bounds, stroke } => {
                apply_stroke(ctx, stroke)?;
                ctx.stroke_rect(bounds.min_x, bounds.min_y, bounds.width(), bounds.height());
            }
            DrawOp::Circle { center, radius, stroke } => {
                apply_stroke(ctx, stroke)?;
                ctx.begin_path();
                ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
                ctx.stroke();
            }
            DrawOp::Ellipse { center, rx, ry, stroke } => {
                apply_stroke(ctx, stroke)?;
                ctx.begin_path();
                ctx.ellipse(center.x, center.y, *rx, *ry, 0.0, 0.0, 2.0 * PI)?;
                ctx.stroke();
            }
            DrawOp::Handle { center, size, color } => {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(center.x - size / 2.0, center.y - size / 2.0, *size, *size);
            }
        }
    }
    Ok(())
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) -> Result<(), JsValue> {
    ctx.set_stroke_style_str(&stroke.color);
    ctx.set_line_width(stroke.width);
    let dash = js_sys::Array::new();
    if stroke.dashed {
        for len in PREVIEW_DASH {
            dash.push(&len.into());
        }
    }
    ctx.set_line_dash(&dash)
}
