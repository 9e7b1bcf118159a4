//! Polygon contour extraction.
//!
//! Converts a selected polygon or multi-polygon from display coordinates to
//! validated geographic rings. Rings that fail validation are dropped; the
//! first surviving ring of each polygon becomes its exterior, the rest its
//! holes.

use crate::geometry::{MultiPolygon, Point, Polygon, Shape};
use crate::projection::Projection;
use crate::ring::{close_and_validate, Ring};

/// Project and validate every ring of a polygon.
fn valid_rings<P: Projection + ?Sized>(rings: &[Vec<Point>], projection: &P) -> Vec<Ring> {
    let total = rings.len();
    let valid: Vec<Ring> = rings
        .iter()
        .map(|ring| projection.points_to_geographic(ring))
        .filter_map(close_and_validate)
        .collect();

    if valid.len() < total {
        log::warn!("dropped {} invalid ring(s) of {}", total - valid.len(), total);
    }
    valid
}

fn polygon_from_rings(rings: Vec<Ring>) -> Option<Polygon> {
    let mut rings = rings.into_iter();
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

/// Extract validated geographic rings from a polygonal shape.
///
/// Returns `None` when there is no usable contour: a polygon without any
/// valid ring, a multi-polygon where no member keeps a valid ring, or a shape
/// that is not polygonal at all. Callers report that to the operator.
pub fn extract_geographic_rings<P: Projection + ?Sized>(
    shape: &Shape,
    projection: &P,
) -> Option<MultiPolygon> {
    let polygons: Vec<Polygon> = match shape {
        Shape::Polygon(rings) => polygon_from_rings(valid_rings(rings, projection))
            .into_iter()
            .collect(),
        Shape::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| polygon_from_rings(valid_rings(rings, projection)))
            .collect(),
        Shape::Point(_) | Shape::Line(_) => {
            log::debug!("{} has no contours to extract", shape.kind());
            return None;
        }
    };

    if polygons.is_empty() {
        log::warn!("no valid contours in selected {}", shape.kind());
        return None;
    }
    Some(MultiPolygon(polygons))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{Identity, WebMercator};

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn polygon_rings_are_closed() {
        let shape = Shape::Polygon(vec![pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])]);
        let multi = extract_geographic_rings(&shape, &Identity).unwrap();
        assert_eq!(multi.polygons().len(), 1);
        let ring = multi.polygons()[0].exterior.points();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn invalid_rings_are_dropped() {
        let shape = Shape::Polygon(vec![
            pts(&[(0.0, 0.0), (1.0, 1.0)]),
            pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)]),
        ]);
        let multi = extract_geographic_rings(&shape, &Identity).unwrap();
        let poly = &multi.polygons()[0];
        assert_eq!(poly.exterior.points()[1], Point::new(4.0, 0.0));
        assert!(poly.interiors.is_empty());
    }

    #[test]
    fn extra_rings_become_holes() {
        let shape = Shape::Polygon(vec![
            pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            pts(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0)]),
        ]);
        let multi = extract_geographic_rings(&shape, &Identity).unwrap();
        assert_eq!(multi.polygons()[0].interiors.len(), 1);
    }

    #[test]
    fn polygon_without_valid_rings_is_none() {
        let shape = Shape::Polygon(vec![pts(&[(0.0, 0.0), (1.0, 1.0)])]);
        assert!(extract_geographic_rings(&shape, &Identity).is_none());
        assert!(extract_geographic_rings(&Shape::Polygon(Vec::new()), &Identity).is_none());
    }

    #[test]
    fn multipolygon_keeps_only_usable_members() {
        let shape = Shape::MultiPolygon(vec![
            vec![pts(&[(0.0, 0.0), (1.0, 1.0)])],
            vec![pts(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0)])],
        ]);
        let multi = extract_geographic_rings(&shape, &Identity).unwrap();
        assert_eq!(multi.polygons().len(), 1);

        let dead = Shape::MultiPolygon(vec![vec![pts(&[(0.0, 0.0)])], Vec::new()]);
        assert!(extract_geographic_rings(&dead, &Identity).is_none());
    }

    #[test]
    fn lines_have_no_contours() {
        let shape = Shape::Line(pts(&[(0.0, 0.0), (1.0, 1.0)]));
        assert!(extract_geographic_rings(&shape, &Identity).is_none());
    }

    #[test]
    fn projects_to_geographic() {
        let shape = Shape::MultiPolygon(vec![vec![pts(&[
            (3_743_000.0, 5_545_000.0),
            (3_743_200.0, 5_545_000.0),
            (3_743_200.0, 5_545_200.0),
            (3_743_000.0, 5_545_200.0),
            (3_743_000.0, 5_545_000.0),
        ])]]);
        let multi = extract_geographic_rings(&shape, &WebMercator).unwrap();
        let bbox = multi.bounding_box().unwrap();
        assert!(bbox.min_x > 33.0 && bbox.max_x < 34.0);
        assert!(bbox.min_y > 44.0 && bbox.max_y < 45.0);
    }
}
