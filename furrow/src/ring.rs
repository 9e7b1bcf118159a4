//! Ring closure and validation.
//!
//! Rings coming from the map layer are not guaranteed to repeat their first
//! vertex at the end. Everything downstream (bounding boxes, boundary
//! splitting, point-in-polygon) assumes closed rings, so they pass through
//! [`close_and_validate`] first.

use crate::geometry::Point;

/// Minimum vertex count of a closed ring (a triangle plus its closing vertex).
pub const MIN_CLOSED_RING_LEN: usize = 4;

/// A closed ring: first and last points are equal, at least four points.
///
/// The only public way to get one is [`close_and_validate`], so holding a
/// `Ring` means the invariant has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring(Vec<Point>);

impl Ring {
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Boundary edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.0.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Close a ring if needed and check it has enough vertices.
///
/// Returns `None` for rings that are unusable: fewer than 3 input points, or
/// fewer than 4 points after closing. Callers filter those out.
pub fn close_and_validate(mut points: Vec<Point>) -> Option<Ring> {
    if points.len() < 3 {
        return None;
    }

    let first = points[0];
    if points.last() != Some(&first) {
        points.push(first);
    }

    if points.len() < MIN_CLOSED_RING_LEN {
        return None;
    }

    Some(Ring(points))
}
