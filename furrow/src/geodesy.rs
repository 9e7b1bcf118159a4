//! Distances measured along the earth's surface, in meters.
//!
//! Sampling and clipping measure lines by real-world length, not by
//! coordinate units. These helpers wrap `geo`'s haversine algorithms (mean
//! earth radius 6 371 008.8 m) and add the "walk along a polyline" operations
//! the rest of the crate needs.

use geo::{HaversineBearing, HaversineDestination, HaversineDistance};

use crate::geometry::Point;

#[inline]
fn to_geo(p: Point) -> geo::Point<f64> {
    geo::Point::new(p.x, p.y)
}

#[inline]
fn from_geo(p: geo::Point<f64>) -> Point {
    Point::new(p.x(), p.y())
}

/// Great-circle distance between two lon/lat points, in meters.
pub fn distance(a: Point, b: Point) -> f64 {
    to_geo(a).haversine_distance(&to_geo(b))
}

/// Point reached by travelling `meters` from `origin` on `bearing` degrees
/// (clockwise from north).
pub fn destination(origin: Point, bearing: f64, meters: f64) -> Point {
    from_geo(to_geo(origin).haversine_destination(bearing, meters))
}

/// Initial bearing from `a` towards `b`, degrees clockwise from north.
pub fn bearing(a: Point, b: Point) -> f64 {
    to_geo(a).haversine_bearing(to_geo(b))
}

/// Total length of a polyline, in meters.
pub fn length(points: &[Point]) -> f64 {
    points.windows(2).map(|pair| distance(pair[0], pair[1])).sum()
}

/// The point `meters` along a polyline.
///
/// Distances at or below zero give the first vertex; distances past the end
/// give the last vertex. A distance landing exactly on a vertex returns that
/// vertex unchanged. `None` only for an empty polyline.
pub fn along(points: &[Point], meters: f64) -> Option<Point> {
    let first = *points.first()?;
    if meters <= 0.0 {
        return Some(first);
    }

    let mut travelled = 0.0;
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let remaining = meters - travelled;
        if remaining == 0.0 {
            return Some(a);
        }

        let segment = distance(a, b);
        if remaining < segment {
            return Some(destination(a, bearing(a, b), remaining));
        }
        if remaining == segment {
            return Some(b);
        }
        travelled += segment;
    }

    points.last().copied()
}

/// The part of a polyline between `start` and `stop` meters along it.
///
/// Vertices strictly between the two cut points are kept as they are. An
/// empty `Vec` comes back when the slice has no extent (`stop <= start`) or
/// the input has fewer than two points.
pub fn slice_along(points: &[Point], start: f64, stop: f64) -> Vec<Point> {
    if points.len() < 2 {
        return Vec::new();
    }

    let start = start.max(0.0);
    if stop <= start {
        return Vec::new();
    }

    let (Some(head), Some(tail)) = (along(points, start), along(points, stop)) else {
        return Vec::new();
    };

    let mut sliced = Vec::with_capacity(points.len());
    sliced.push(head);

    let mut cumulative = 0.0;
    for pair in points.windows(2) {
        cumulative += distance(pair[0], pair[1]);
        if cumulative >= stop {
            break;
        }
        if cumulative > start && sliced.last() != Some(&pair[1]) {
            sliced.push(pair[1]);
        }
    }

    if sliced.last() != Some(&tail) {
        sliced.push(tail);
    }
    sliced
}
