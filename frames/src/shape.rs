use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Primitive kind carried in the `tool` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// One discrete point of a freehand stroke.
    #[default]
    Pen,
    /// Axis-aligned box spanned by anchor and end point.
    Rectangle,
    /// Circle centered on the anchor, or an ellipse once resized.
    Circle,
    /// Segment from anchor to end point with an arrowhead at the end.
    Arrow,
}

impl ShapeKind {
    /// The wire and storage spelling of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pen => "pen",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Arrow => "arrow",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown shape kind: {0}")]
pub struct UnknownShapeKind(pub String);

impl FromStr for ShapeKind {
    type Err = UnknownShapeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pen" => Ok(Self::Pen),
            "rectangle" => Ok(Self::Rectangle),
            "circle" => Ok(Self::Circle),
            "arrow" => Ok(Self::Arrow),
            other => Err(UnknownShapeKind(other.to_owned())),
        }
    }
}

/// One drawing primitive as stored in a room's ordered shape list.
///
/// Identity is positional: a shape is addressed by its index in the list,
/// never by a field on the shape itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(rename = "tool", default)]
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_y: Option<f64>,
    pub color: String,
    pub size: f64,
    /// Set on circles resized through their handles. The anchor stays the
    /// center and the end point sits at `center + (rx, ry)`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ellipse: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(v: &bool) -> bool {
    !*v
}

impl Shape {
    #[must_use]
    pub fn pen(x: f64, y: f64, color: impl Into<String>, size: f64) -> Self {
        Self { kind: ShapeKind::Pen, x, y, end_x: None, end_y: None, color: color.into(), size, ellipse: false }
    }

    #[must_use]
    pub fn rectangle(x: f64, y: f64, end_x: f64, end_y: f64, color: impl Into<String>, size: f64) -> Self {
        Self::spanning(ShapeKind::Rectangle, x, y, end_x, end_y, color, size)
    }

    #[must_use]
    pub fn circle(x: f64, y: f64, end_x: f64, end_y: f64, color: impl Into<String>, size: f64) -> Self {
        Self::spanning(ShapeKind::Circle, x, y, end_x, end_y, color, size)
    }

    #[must_use]
    pub fn arrow(x: f64, y: f64, end_x: f64, end_y: f64, color: impl Into<String>, size: f64) -> Self {
        Self::spanning(ShapeKind::Arrow, x, y, end_x, end_y, color, size)
    }

    /// Build a two-point shape of any kind. Pen shapes drop the end point.
    #[must_use]
    pub fn spanning(
        kind: ShapeKind,
        x: f64,
        y: f64,
        end_x: f64,
        end_y: f64,
        color: impl Into<String>,
        size: f64,
    ) -> Self {
        let (end_x, end_y) = if kind == ShapeKind::Pen { (None, None) } else { (Some(end_x), Some(end_y)) };
        Self { kind, x, y, end_x, end_y, color: color.into(), size, ellipse: false }
    }

    /// Anchor point `(x, y)`.
    #[must_use]
    pub fn anchor(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// End point, falling back to the anchor when absent.
    #[must_use]
    pub fn end(&self) -> (f64, f64) {
        (self.end_x.unwrap_or(self.x), self.end_y.unwrap_or(self.y))
    }

    /// Replace both points, keeping kind and style.
    #[must_use]
    pub fn with_points(&self, x: f64, y: f64, end_x: f64, end_y: f64) -> Self {
        let mut next = self.clone();
        next.x = x;
        next.y = y;
        if next.kind != ShapeKind::Pen {
            next.end_x = Some(end_x);
            next.end_y = Some(end_y);
        }
        next
    }
}
