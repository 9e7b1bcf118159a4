//! Affine transforms about a pivot.
//!
//! Rows and their bounding box are rotated and scaled in geographic
//! coordinate space. Every function here is pure and O(vertices), so the
//! preview can be rebuilt from scratch on each pointer event.
//!
//! The matrices are euclid's (re-exported by lyon_geom). Positive angles
//! turn counter-clockwise with y pointing up, clockwise on a y-down screen.
//!
//! A degree of longitude is shorter than a degree of latitude away from the
//! equator, so rotation happens in a local equirectangular frame around the
//! pivot: longitude offsets are multiplied by `cos(pivot latitude)` before
//! turning and divided by it afterwards. Row spacing in meters then does not
//! depend on the angle.

use lyon_geom::euclid::default::Transform2D;
use lyon_geom::euclid::{point2, vec2, Angle};

use crate::geometry::{Line, Point};

/// Meters-per-degree ratio of longitude to latitude at `latitude`.
///
/// Clamped away from zero so polar pivots still give a finite transform.
#[inline]
fn longitude_shrink(latitude: f64) -> f64 {
    latitude.to_radians().cos().max(f64::EPSILON)
}

/// Rotation by `angle_degrees` about `pivot`.
///
/// In the local frame `u = k·dx`, `v = dy` the turn is the usual
/// `u' = u·cos − v·sin`, `v' = u·sin + v·cos`. Folding `k` into the matrix
/// keeps a zero angle an exact identity.
pub fn rotation_about(angle_degrees: f64, pivot: Point) -> Transform2D<f64> {
    let k = longitude_shrink(pivot.y);
    let (sin, cos) = Angle::degrees(angle_degrees).sin_cos();
    Transform2D::translation(-pivot.x, -pivot.y)
        .then(&Transform2D::new(cos, sin * k, -sin / k, cos, 0.0, 0.0))
        .then_translate(vec2(pivot.x, pivot.y))
}

/// Uniform scale by `factor` about `pivot`.
pub fn scale_about(factor: f64, pivot: Point) -> Transform2D<f64> {
    Transform2D::translation(-pivot.x, -pivot.y)
        .then_scale(factor, factor)
        .then_translate(vec2(pivot.x, pivot.y))
}

#[inline]
pub fn apply(transform: &Transform2D<f64>, p: Point) -> Point {
    let out = transform.transform_point(point2(p.x, p.y));
    Point::new(out.x, out.y)
}

/// Apply a transform to each point of a fixed-size shape (e.g. box corners).
pub fn apply_all<const N: usize>(transform: &Transform2D<f64>, points: &[Point; N]) -> [Point; N] {
    let points: [Point; N] = *points;
    points.map(|p| apply(transform, p))
}

pub fn apply_line(transform: &Transform2D<f64>, line: &Line) -> Line {
    Line::new(line.points.iter().map(|&p| apply(transform, p)).collect())
}

/// Rotate a single point about `pivot`.
pub fn rotate_point(p: Point, angle_degrees: f64, pivot: Point) -> Point {
    apply(&rotation_about(angle_degrees, pivot), p)
}

/// Rotate box corners about `pivot`.
pub fn rotate_corners(corners: &[Point; 4], angle_degrees: f64, pivot: Point) -> [Point; 4] {
    apply_all(&rotation_about(angle_degrees, pivot), corners)
}

/// Rotate a family of lines about `pivot`.
pub fn rotate_lines(lines: &[Line], angle_degrees: f64, pivot: Point) -> Vec<Line> {
    let transform = rotation_about(angle_degrees, pivot);
    lines.iter().map(|line| apply_line(&transform, line)).collect()
}

/// Vertex average of a set of points.
///
/// For the four corners of a (possibly rotated) rectangle this is its
/// center.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}
