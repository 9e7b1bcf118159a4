//! Core geometry types for furrow.
//!
//! All types here are plain values. Coordinates are `f64` pairs; whether a
//! pair is geographic (lon/lat degrees) or display (projected map units) is
//! decided by where it came from - see [`crate::projection`].
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! The `#[derive(...)]` macro auto-generates common functionality:
//! - `Debug` = lets you print with `{:?}`
//! - `Clone` / `Copy` = duplicate the value (Copy only for small stack values)
//! - `PartialEq` = compare with `==`
//! - `Serialize` / `Deserialize` = serde support, used by the CLI

use serde::{Deserialize, Serialize};

use crate::ring::Ring;
use crate::transform::{apply_all, scale_about};

/// A 2D point.
///
/// In geographic space `x` is longitude and `y` is latitude, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An open polyline of two or more points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub points: Vec<Point>,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// A polygon: one closed exterior ring plus optional interior rings (holes).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub interiors: Vec<Ring>,
}

/// An ordered collection of polygons.
///
/// This is also the clipping target for rows: a single polygon is simply a
/// multi-polygon with one member.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolygon(pub Vec<Polygon>);

/// Raw geometry handed over by the selection layer.
///
/// Coordinates are not validated: rings may be unclosed or too short. The
/// extractor ([`crate::extract`]) turns polygonal shapes into validated
/// geographic [`MultiPolygon`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Point),
    Line(Vec<Point>),
    Polygon(Vec<Vec<Point>>),
    MultiPolygon(Vec<Vec<Vec<Point>>>),
}

// ============================================================================
// IMPLEMENTATIONS (methods)
// ============================================================================

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Planar distance to another point, in coordinate units.
    ///
    /// For distances in meters on geographic points use
    /// [`crate::geodesy::distance`].
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl Line {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// A straight two-point line.
    pub fn segment(start: Point, end: Point) -> Self {
        Self { points: vec![start, end] }
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl BoundingBox {
    /// Bounding box of a set of points, `None` when there are none.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };

        Some(iter.fold(init, |bbox, p| BoundingBox {
            min_x: bbox.min_x.min(p.x),
            min_y: bbox.min_y.min(p.y),
            max_x: bbox.max_x.max(p.x),
            max_y: bbox.max_y.max(p.y),
        }))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Corners in ring order: south-west, south-east, north-east, north-west.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    /// Uniform scale around the box's own center.
    ///
    /// No lower bound is enforced here; callers validate the factor.
    pub fn scaled(&self, factor: f64) -> BoundingBox {
        let corners = apply_all(&scale_about(factor, self.center()), &self.corners());
        BoundingBox::from_points(&corners).unwrap_or(*self)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

impl Polygon {
    pub fn new(exterior: Ring, interiors: Vec<Ring>) -> Self {
        Self { exterior, interiors }
    }

    /// Iterate over every ring, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }

    /// Area of the exterior minus the holes, in squared coordinate units.
    pub fn area(&self) -> f64 {
        let holes: f64 = self
            .interiors
            .iter()
            .map(|r| signed_area_of_points(r.points()).abs())
            .sum();
        (signed_area_of_points(self.exterior.points()).abs() - holes).max(0.0)
    }
}

impl MultiPolygon {
    pub fn polygons(&self) -> &[Polygon] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.0.iter().flat_map(Polygon::rings)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.rings().flat_map(|r| r.points().iter()))
    }

    pub fn area(&self) -> f64 {
        self.0.iter().map(Polygon::area).sum()
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        MultiPolygon(vec![polygon])
    }
}

impl Shape {
    /// GeoJSON-style geometry type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Point(_) => "Point",
            Shape::Line(_) => "LineString",
            Shape::Polygon(_) => "Polygon",
            Shape::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

/// Calculate signed area of a point sequence using the shoelace formula.
///
/// Returns:
/// - Positive value for counter-clockwise winding
/// - Negative value for clockwise winding
///
/// A closing duplicate vertex contributes nothing, so open and closed rings
/// give the same result.
pub fn signed_area_of_points(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::close_and_validate;

    fn square(size: f64) -> Polygon {
        let ring = close_and_validate(vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ])
        .unwrap();
        Polygon::new(ring, Vec::new())
    }

    #[test]
    fn point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1.distance(p2), 5.0);
    }

    #[test]
    fn bbox_from_points() {
        let pts = [Point::new(1.0, 5.0), Point::new(-2.0, 3.0), Point::new(4.0, -1.0)];
        let bbox = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(bbox, BoundingBox { min_x: -2.0, min_y: -1.0, max_x: 4.0, max_y: 5.0 });
    }

    #[test]
    fn empty_bbox() {
        let pts: [Point; 0] = [];
        assert_eq!(BoundingBox::from_points(&pts), None);
    }

    #[test]
    fn bbox_scaled_keeps_center() {
        let bbox = BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 4.0 };
        let scaled = bbox.scaled(2.0);
        assert_eq!(scaled.center(), bbox.center());
        assert_eq!(scaled.width(), 20.0);
        assert_eq!(scaled.height(), 8.0);
    }

    #[test]
    fn polygon_area_subtracts_holes() {
        let outer = square(10.0);
        let hole = close_and_validate(vec![
            Point::new(2.0, 2.0),
            Point::new(4.0, 2.0),
            Point::new(4.0, 4.0),
            Point::new(2.0, 4.0),
        ])
        .unwrap();
        let poly = Polygon::new(outer.exterior.clone(), vec![hole]);
        assert!((poly.area() - 96.0).abs() < 1e-10);
    }

    #[test]
    fn signed_area_winding() {
        let ccw = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
        assert!((signed_area_of_points(&ccw) - 100.0).abs() < 1e-10);

        let cw: Vec<Point> = ccw.iter().rev().copied().collect();
        assert!((signed_area_of_points(&cw) + 100.0).abs() < 1e-10);
    }

    #[test]
    fn multipolygon_bbox_spans_members() {
        let a = square(1.0);
        let mut b = square(1.0);
        b.exterior = close_and_validate(vec![
            Point::new(5.0, 5.0),
            Point::new(6.0, 5.0),
            Point::new(6.0, 7.0),
        ])
        .unwrap();
        let multi = MultiPolygon(vec![a, b]);
        assert_eq!(
            multi.bounding_box(),
            Some(BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 6.0, max_y: 7.0 })
        );
    }
}
