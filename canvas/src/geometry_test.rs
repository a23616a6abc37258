#![allow(clippy::float_cmp)]

use super::*;

fn rect(x: f64, y: f64, ex: f64, ey: f64) -> Shape {
    Shape::rectangle(x, y, ex, ey, "red", 3.0)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn all_kinds() -> Vec<Shape> {
    vec![
        rect(10.0, 10.0, 50.0, 60.0),
        rect(50.0, 60.0, 10.0, 10.0),
        Shape::circle(100.0, 100.0, 130.0, 140.0, "red", 3.0),
        Shape::arrow(0.0, 0.0, 80.0, 40.0, "red", 3.0),
        Shape::arrow(5.0, 5.0, 5.0, 5.0, "red", 1.0),
    ]
}

// =============================================================
// bounds
// =============================================================

#[test]
fn bounds_rectangle_normalizes_reversed_points() {
    let b = bounds(&rect(50.0, 60.0, 10.0, 10.0));
    assert_eq!(b, Bounds { min_x: 10.0, max_x: 50.0, min_y: 10.0, max_y: 60.0 });
}

#[test]
fn bounds_radial_circle_is_square_around_center() {
    let b = bounds(&Shape::circle(100.0, 100.0, 103.0, 104.0, "red", 1.0));
    assert_eq!(b, Bounds { min_x: 95.0, max_x: 105.0, min_y: 95.0, max_y: 105.0 });
}

#[test]
fn bounds_ellipse_uses_axis_radii() {
    let mut circle = Shape::circle(100.0, 100.0, 130.0, 120.0, "red", 1.0);
    circle.ellipse = true;
    assert_eq!(bounds(&circle), Bounds { min_x: 70.0, max_x: 130.0, min_y: 80.0, max_y: 120.0 });
}

#[test]
fn bounds_pen_is_degenerate() {
    let b = bounds(&Shape::pen(4.0, 7.0, "red", 3.0));
    assert_eq!(b.width(), 0.0);
    assert_eq!(b.center(), pt(4.0, 7.0));
}

// =============================================================
// contains_point
// =============================================================

#[test]
fn every_selectable_kind_contains_its_anchor() {
    for shape in all_kinds() {
        assert!(contains_point(pt(shape.x, shape.y), &shape), "anchor not contained: {shape:?}");
    }
}

#[test]
fn far_points_are_outside_every_kind() {
    for shape in all_kinds() {
        let b = bounds(&shape);
        let far = pt(b.max_x + 1000.0, b.max_y + 1000.0);
        assert!(!contains_point(far, &shape), "far point contained: {shape:?}");
    }
}

#[test]
fn pen_points_are_never_hit() {
    let pen = Shape::pen(1.0, 1.0, "red", 30.0);
    assert!(!contains_point(pt(1.0, 1.0), &pen));
}

#[test]
fn rectangle_edges_are_inclusive() {
    let r = rect(10.0, 10.0, 50.0, 60.0);
    assert!(contains_point(pt(50.0, 60.0), &r));
    assert!(!contains_point(pt(50.1, 60.0), &r));
}

#[test]
fn circle_uses_radius_not_box() {
    let c = Shape::circle(0.0, 0.0, 10.0, 0.0, "red", 1.0);
    assert!(contains_point(pt(7.0, 7.0), &c));
    assert!(!contains_point(pt(9.0, 9.0), &c));
}

#[test]
fn ellipse_uses_axis_radii() {
    let mut c = Shape::circle(0.0, 0.0, 40.0, 20.0, "red", 1.0);
    c.ellipse = true;
    assert!(contains_point(pt(35.0, 0.0), &c));
    assert!(!contains_point(pt(0.0, 25.0), &c));
}

#[test]
fn arrow_tolerance_is_at_least_five() {
    let thin = Shape::arrow(0.0, 0.0, 100.0, 0.0, "red", 1.0);
    assert!(contains_point(pt(50.0, 5.0), &thin));
    assert!(!contains_point(pt(50.0, 5.5), &thin));

    let thick = Shape::arrow(0.0, 0.0, 100.0, 0.0, "red", 12.0);
    assert!(contains_point(pt(50.0, 11.0), &thick));
}

#[test]
fn arrow_distance_is_clamped_to_segment() {
    let a = Shape::arrow(0.0, 0.0, 100.0, 0.0, "red", 1.0);
    assert!(!contains_point(pt(110.0, 0.0), &a));
    assert!(contains_point(pt(104.0, 0.0), &a));
}

// =============================================================
// resize_handles / hit_handle
// =============================================================

#[test]
fn rectangle_handles_are_corners_then_edges() {
    let handles = resize_handles(&rect(50.0, 60.0, 10.0, 20.0));
    assert_eq!(
        handles,
        vec![
            pt(10.0, 20.0),
            pt(50.0, 20.0),
            pt(10.0, 60.0),
            pt(50.0, 60.0),
            pt(30.0, 20.0),
            pt(10.0, 40.0),
            pt(50.0, 40.0),
            pt(30.0, 60.0),
        ]
    );
}

#[test]
fn circle_handles_sit_outside_the_stroke() {
    let handles = resize_handles(&Shape::circle(100.0, 100.0, 130.0, 100.0, "red", 1.0));
    assert_eq!(handles, vec![pt(100.0, 62.0), pt(100.0, 138.0), pt(62.0, 100.0), pt(138.0, 100.0)]);
}

#[test]
fn arrow_uses_box_handles_and_pen_has_none() {
    assert_eq!(resize_handles(&Shape::arrow(0.0, 0.0, 10.0, 10.0, "red", 1.0)).len(), 8);
    assert!(resize_handles(&Shape::pen(0.0, 0.0, "red", 1.0)).is_empty());
}

#[test]
fn hit_handle_uses_square_slop() {
    let handles = [pt(0.0, 0.0), pt(100.0, 100.0)];
    assert_eq!(hit_handle(pt(6.0, -6.0), &handles, 6.0), Some(0));
    assert_eq!(hit_handle(pt(6.1, 0.0), &handles, 6.0), None);
    assert_eq!(hit_handle(pt(97.0, 104.0), &handles, 6.0), Some(1));
}

// =============================================================
// apply_handle_drag
// =============================================================

#[test]
fn rectangle_corner_moves_both_coordinates() {
    let original = rect(10.0, 10.0, 50.0, 60.0);
    let next = apply_handle_drag(&original, 3, pt(80.0, 90.0), &original).expect("resize");
    assert_eq!(next.anchor(), (10.0, 10.0));
    assert_eq!(next.end(), (80.0, 90.0));
}

#[test]
fn rectangle_edge_moves_one_coordinate() {
    let original = rect(10.0, 10.0, 50.0, 60.0);
    let next = apply_handle_drag(&original, 6, pt(90.0, 999.0), &original).expect("resize");
    assert_eq!(next.anchor(), (10.0, 10.0));
    assert_eq!(next.end(), (90.0, 60.0));

    let next = apply_handle_drag(&original, 4, pt(-999.0, 0.0), &original).expect("resize");
    assert_eq!(next.anchor(), (10.0, 0.0));
    assert_eq!(next.end(), (50.0, 60.0));
}

#[test]
fn rectangle_resize_renormalizes_when_crossing() {
    let original = rect(10.0, 10.0, 50.0, 60.0);
    let next = apply_handle_drag(&original, 0, pt(100.0, 100.0), &original).expect("resize");
    assert_eq!(next.anchor(), (50.0, 60.0));
    assert_eq!(next.end(), (100.0, 100.0));
    assert!(next.x <= next.end().0 && next.y <= next.end().1);
}

#[test]
fn rectangle_resize_below_minimum_is_rejected() {
    let original = rect(10.0, 10.0, 50.0, 60.0);
    assert_eq!(apply_handle_drag(&original, 6, pt(25.0, 0.0), &original), Err(ResizeError::BelowMinimum));
}

#[test]
fn resize_derives_from_original_not_current() {
    let original = rect(10.0, 10.0, 50.0, 60.0);
    let first = apply_handle_drag(&original, 6, pt(200.0, 0.0), &original).expect("resize");
    let second = apply_handle_drag(&first, 6, pt(70.0, 0.0), &original).expect("resize");
    assert_eq!(second.end(), (70.0, 60.0));
}

#[test]
fn resize_keeps_style() {
    let original = Shape::rectangle(10.0, 10.0, 50.0, 60.0, "blue", 7.0);
    let next = apply_handle_drag(&original, 3, pt(90.0, 90.0), &original).expect("resize");
    assert_eq!(next.color, "blue");
    assert_eq!(next.size, 7.0);
}

#[test]
fn circle_top_handle_changes_vertical_radius_only() {
    let original = Shape::circle(100.0, 100.0, 130.0, 100.0, "red", 1.0);
    let next = apply_handle_drag(&original, 0, pt(100.0, 50.0), &original).expect("resize");
    assert!(next.ellipse);
    assert_eq!(next.anchor(), (100.0, 100.0));
    assert_eq!(circle_radii(&next), (30.0, 50.0));
    assert!(next.x <= next.end().0 && next.y <= next.end().1);
}

#[test]
fn circle_side_handle_changes_horizontal_radius_only() {
    let original = Shape::circle(100.0, 100.0, 130.0, 100.0, "red", 1.0);
    let next = apply_handle_drag(&original, 2, pt(40.0, 0.0), &original).expect("resize");
    assert_eq!(circle_radii(&next), (60.0, 30.0));
}

#[test]
fn circle_radius_below_minimum_is_rejected() {
    let original = Shape::circle(100.0, 100.0, 130.0, 100.0, "red", 1.0);
    assert_eq!(apply_handle_drag(&original, 1, pt(100.0, 110.0), &original), Err(ResizeError::BelowMinimum));
}

#[test]
fn circle_has_only_four_handles() {
    let original = Shape::circle(100.0, 100.0, 130.0, 100.0, "red", 1.0);
    assert_eq!(apply_handle_drag(&original, 4, pt(0.0, 0.0), &original), Err(ResizeError::UnknownHandle(4)));
}

#[test]
fn arrow_resize_preserves_direction() {
    // Points right-to-left: the anchor forms the box's max x side.
    let original = Shape::arrow(100.0, 0.0, 0.0, 50.0, "red", 1.0);
    let next = apply_handle_drag(&original, 6, pt(150.0, 0.0), &original).expect("resize");
    assert_eq!(next.anchor(), (150.0, 0.0));
    assert_eq!(next.end(), (0.0, 50.0));

    let next = apply_handle_drag(&original, 7, pt(0.0, 80.0), &original).expect("resize");
    assert_eq!(next.anchor(), (100.0, 0.0));
    assert_eq!(next.end(), (0.0, 80.0));
}

#[test]
fn pen_is_not_resizable() {
    let pen = Shape::pen(0.0, 0.0, "red", 1.0);
    assert_eq!(apply_handle_drag(&pen, 0, pt(1.0, 1.0), &pen), Err(ResizeError::NotResizable));
}

#[test]
fn unknown_handle_is_rejected() {
    let original = rect(10.0, 10.0, 50.0, 60.0);
    assert_eq!(apply_handle_drag(&original, 8, pt(0.0, 0.0), &original), Err(ResizeError::UnknownHandle(8)));
}

// =============================================================
// translate
// =============================================================

#[test]
fn translate_moves_both_points() {
    let moved = translate(&Shape::arrow(0.0, 0.0, 10.0, 20.0, "red", 1.0), 5.0, -5.0);
    assert_eq!(moved.anchor(), (5.0, -5.0));
    assert_eq!(moved.end(), (15.0, 15.0));
}

#[test]
fn translate_pen_keeps_end_absent() {
    let moved = translate(&Shape::pen(1.0, 1.0, "red", 1.0), 2.0, 2.0);
    assert_eq!(moved.end_x, None);
    assert_eq!(moved.anchor(), (3.0, 3.0));
}
