//! Shape geometry: bounds, point containment, and resize handles.
//!
//! Everything here is a pure function of its arguments and total over all
//! shape kinds. Coordinates are world space.
//!
//! Circles come in two forms. A radial circle is centered on its anchor with
//! radius `distance(anchor, end)`. Once resized through its handles it
//! becomes an ellipse (`shape.ellipse`): still centered on the anchor, with
//! radii `|end - anchor|` per axis, so `x <= endX` and `y <= endY` hold.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use frames::{Shape, ShapeKind};

use crate::camera::Point;
use crate::consts::{ARROW_HIT_TOLERANCE_MIN, CIRCLE_HANDLE_OFFSET, MIN_SHAPE_SIZE};

/// Axis-aligned box. Always normalized: `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn spanning(a: Point, b: Point) -> Self {
        Self { min_x: a.x.min(b.x), max_x: a.x.max(b.x), min_y: a.y.min(b.y), max_y: a.y.max(b.y) }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Inclusive on every edge.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// `[TL, TR, BL, BR, T, L, R, B]`.
    #[must_use]
    pub fn handles(&self) -> Vec<Point> {
        let c = self.center();
        vec![
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.min_x, self.max_y),
            Point::new(self.max_x, self.max_y),
            Point::new(c.x, self.min_y),
            Point::new(self.min_x, c.y),
            Point::new(self.max_x, c.y),
            Point::new(c.x, self.max_y),
        ]
    }
}

#[must_use]
pub fn anchor(shape: &Shape) -> Point {
    let (x, y) = shape.anchor();
    Point::new(x, y)
}

#[must_use]
pub fn end(shape: &Shape) -> Point {
    let (x, y) = shape.end();
    Point::new(x, y)
}

/// Per-axis circle radii. Equal for a radial circle.
#[must_use]
pub fn circle_radii(shape: &Shape) -> (f64, f64) {
    let (a, e) = (anchor(shape), end(shape));
    if shape.ellipse {
        ((e.x - a.x).abs(), (e.y - a.y).abs())
    } else {
        let r = a.distance(e);
        (r, r)
    }
}

#[must_use]
pub fn bounds(shape: &Shape) -> Bounds {
    match shape.kind {
        ShapeKind::Pen => Bounds::spanning(anchor(shape), anchor(shape)),
        ShapeKind::Rectangle | ShapeKind::Arrow => Bounds::spanning(anchor(shape), end(shape)),
        ShapeKind::Circle => {
            let c = anchor(shape);
            let (rx, ry) = circle_radii(shape);
            Bounds { min_x: c.x - rx, max_x: c.x + rx, min_y: c.y - ry, max_y: c.y + ry }
        }
    }
}

/// Hit test. Pen points are never selectable.
#[must_use]
pub fn contains_point(p: Point, shape: &Shape) -> bool {
    match shape.kind {
        ShapeKind::Pen => false,
        ShapeKind::Rectangle => bounds(shape).contains(p),
        ShapeKind::Circle => {
            let c = anchor(shape);
            let (rx, ry) = circle_radii(shape);
            if shape.ellipse {
                let nx = axis_ratio(p.x - c.x, rx);
                let ny = axis_ratio(p.y - c.y, ry);
                nx * nx + ny * ny <= 1.0
            } else {
                p.distance(c) <= rx
            }
        }
        ShapeKind::Arrow => {
            let tolerance = shape.size.max(ARROW_HIT_TOLERANCE_MIN);
            segment_distance(p, anchor(shape), end(shape)) <= tolerance
        }
    }
}

fn axis_ratio(delta: f64, radius: f64) -> f64 {
    if radius > 0.0 {
        delta / radius
    } else if delta.abs() < f64::EPSILON {
        0.0
    } else {
        f64::INFINITY
    }
}

/// Distance from `p` to the segment `a`–`b`, clamped to the segment.
#[must_use]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (cx, cy) = (b.x - a.x, b.y - a.y);
    let len_sq = cx * cx + cy * cy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * cx + (p.y - a.y) * cy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * cx, a.y + t * cy))
}

/// Handle positions in index order.
///
/// Rectangles and arrows use the eight box handles. Circles get four, at
/// `[top, bottom, left, right]`, pushed outside the box. Pen points have none.
#[must_use]
pub fn resize_handles(shape: &Shape) -> Vec<Point> {
    match shape.kind {
        ShapeKind::Pen => Vec::new(),
        ShapeKind::Rectangle | ShapeKind::Arrow => bounds(shape).handles(),
        ShapeKind::Circle => {
            let b = bounds(shape);
            let c = b.center();
            vec![
                Point::new(c.x, b.min_y - CIRCLE_HANDLE_OFFSET),
                Point::new(c.x, b.max_y + CIRCLE_HANDLE_OFFSET),
                Point::new(b.min_x - CIRCLE_HANDLE_OFFSET, c.y),
                Point::new(b.max_x + CIRCLE_HANDLE_OFFSET, c.y),
            ]
        }
    }
}

/// Index of the first handle whose square hit box (half-width `slop`)
/// contains `p`.
#[must_use]
pub fn hit_handle(p: Point, handles: &[Point], slop: f64) -> Option<usize> {
    handles
        .iter()
        .position(|h| (p.x - h.x).abs() <= slop && (p.y - h.y).abs() <= slop)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResizeError {
    #[error("shape kind has no resize handles")]
    NotResizable,
    #[error("no resize handle {0}")]
    UnknownHandle(usize),
    #[error("resize would shrink below the minimum size")]
    BelowMinimum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Min,
    Max,
}

/// Which box sides a handle moves, as `(x side, y side)`.
fn box_sides(handle: usize) -> Option<(Option<Side>, Option<Side>)> {
    use Side::{Max, Min};
    match handle {
        0 => Some((Some(Min), Some(Min))),
        1 => Some((Some(Max), Some(Min))),
        2 => Some((Some(Min), Some(Max))),
        3 => Some((Some(Max), Some(Max))),
        4 => Some((None, Some(Min))),
        5 => Some((Some(Min), None)),
        6 => Some((Some(Max), None)),
        7 => Some((None, Some(Max))),
        _ => None,
    }
}

/// Recompute a shape while handle `handle` is dragged to `current`.
///
/// Geometry is derived from `original`, the shape as it was when the drag
/// started, so repeated calls during one gesture never compound. Kind and
/// style come from `shape`.
///
/// # Errors
///
/// [`ResizeError::NotResizable`] for pen points, [`ResizeError::UnknownHandle`]
/// for an index past the shape's handle list, and [`ResizeError::BelowMinimum`]
/// when a moved side or radius would drop under [`MIN_SHAPE_SIZE`].
pub fn apply_handle_drag(shape: &Shape, handle: usize, current: Point, original: &Shape) -> Result<Shape, ResizeError> {
    match shape.kind {
        ShapeKind::Pen => Err(ResizeError::NotResizable),
        ShapeKind::Rectangle => resize_box(shape, handle, current, original),
        ShapeKind::Circle => resize_circle(shape, handle, current, original),
        ShapeKind::Arrow => resize_arrow(shape, handle, current, original),
    }
}

fn resize_box(shape: &Shape, handle: usize, current: Point, original: &Shape) -> Result<Shape, ResizeError> {
    let (x_side, y_side) = box_sides(handle).ok_or(ResizeError::UnknownHandle(handle))?;
    let mut b = Bounds::spanning(anchor(original), end(original));

    match x_side {
        Some(Side::Max) => b.max_x = current.x,
        Some(Side::Min) => b.min_x = current.x,
        None => {}
    }
    match y_side {
        Some(Side::Max) => b.max_y = current.y,
        Some(Side::Min) => b.min_y = current.y,
        None => {}
    }

    let b = Bounds::spanning(Point::new(b.min_x, b.min_y), Point::new(b.max_x, b.max_y));
    if (x_side.is_some() && b.width() < MIN_SHAPE_SIZE) || (y_side.is_some() && b.height() < MIN_SHAPE_SIZE) {
        return Err(ResizeError::BelowMinimum);
    }
    Ok(shape.with_points(b.min_x, b.min_y, b.max_x, b.max_y))
}

fn resize_circle(shape: &Shape, handle: usize, current: Point, original: &Shape) -> Result<Shape, ResizeError> {
    let c = anchor(original);
    let (mut rx, mut ry) = circle_radii(original);

    match handle {
        0 | 1 => {
            ry = (current.y - c.y).abs();
            if ry < MIN_SHAPE_SIZE {
                return Err(ResizeError::BelowMinimum);
            }
        }
        2 | 3 => {
            rx = (current.x - c.x).abs();
            if rx < MIN_SHAPE_SIZE {
                return Err(ResizeError::BelowMinimum);
            }
        }
        _ => return Err(ResizeError::UnknownHandle(handle)),
    }

    let mut next = shape.with_points(c.x, c.y, c.x + rx, c.y + ry);
    next.ellipse = true;
    Ok(next)
}

fn resize_arrow(shape: &Shape, handle: usize, current: Point, original: &Shape) -> Result<Shape, ResizeError> {
    let (x_side, y_side) = box_sides(handle).ok_or(ResizeError::UnknownHandle(handle))?;
    let (mut a, mut e) = (anchor(original), end(original));

    // The endpoint forming each side moves; the arrow keeps its direction.
    if let Some(side) = x_side {
        let anchor_forms_side = match side {
            Side::Max => a.x > e.x,
            Side::Min => a.x <= e.x,
        };
        if anchor_forms_side {
            a.x = current.x;
        } else {
            e.x = current.x;
        }
    }
    if let Some(side) = y_side {
        let anchor_forms_side = match side {
            Side::Max => a.y > e.y,
            Side::Min => a.y <= e.y,
        };
        if anchor_forms_side {
            a.y = current.y;
        } else {
            e.y = current.y;
        }
    }

    let b = Bounds::spanning(a, e);
    if (x_side.is_some() && b.width() < MIN_SHAPE_SIZE) || (y_side.is_some() && b.height() < MIN_SHAPE_SIZE) {
        return Err(ResizeError::BelowMinimum);
    }
    Ok(shape.with_points(a.x, a.y, e.x, e.y))
}

/// Move both points by `(dx, dy)`.
#[must_use]
pub fn translate(shape: &Shape, dx: f64, dy: f64) -> Shape {
    let (a, e) = (anchor(shape), end(shape));
    shape.with_points(a.x + dx, a.y + dy, e.x + dx, e.y + dy)
}
