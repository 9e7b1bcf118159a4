//! Conversion between display (projected) and geographic coordinates.
//!
//! The map layer works in a projected display frame; all generation happens
//! in geographic lon/lat. The conversion is a collaborator concern, so it is
//! a trait - the engine only ever calls the two functions.

use std::f64::consts::PI;

use crate::geometry::Point;

/// A pair of pure coordinate conversion functions.
pub trait Projection {
    /// Display (projected) → geographic lon/lat degrees.
    fn to_geographic(&self, p: Point) -> Point;

    /// Geographic lon/lat degrees → display (projected).
    fn to_display(&self, p: Point) -> Point;

    fn points_to_geographic(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.to_geographic(p)).collect()
    }

    fn points_to_display(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.to_display(p)).collect()
    }
}

impl<P: Projection + ?Sized> Projection for &P {
    fn to_geographic(&self, p: Point) -> Point {
        (**self).to_geographic(p)
    }

    fn to_display(&self, p: Point) -> Point {
        (**self).to_display(p)
    }
}

/// Spherical Web Mercator (EPSG:3857), the usual web-map display frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    /// Sphere radius used by EPSG:3857, in meters.
    pub const RADIUS: f64 = 6_378_137.0;

    /// Latitude limit that keeps the projected square finite.
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;
}

impl Projection for WebMercator {
    fn to_geographic(&self, p: Point) -> Point {
        let lon = (p.x / Self::RADIUS).to_degrees();
        let lat = (2.0 * (p.y / Self::RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Point::new(lon, lat)
    }

    fn to_display(&self, p: Point) -> Point {
        let lat = p.y.clamp(-Self::MAX_LATITUDE, Self::MAX_LATITUDE).to_radians();
        let x = Self::RADIUS * p.x.to_radians();
        let y = Self::RADIUS * (PI / 4.0 + lat / 2.0).tan().ln();
        Point::new(x, y)
    }
}

/// No-op projection, for callers already working in geographic coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Projection for Identity {
    fn to_geographic(&self, p: Point) -> Point {
        p
    }

    fn to_display(&self, p: Point) -> Point {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_origin() {
        let p = WebMercator.to_geographic(Point::new(0.0, 0.0));
        assert!(p.x.abs() < 1e-12 && p.y.abs() < 1e-12);
    }

    #[test]
    fn web_mercator_round_trip() {
        let display = Point::new(3_743_000.0, 5_545_000.0);
        let geo = WebMercator.to_geographic(display);
        // Roughly Sevastopol.
        assert!((geo.x - 33.62).abs() < 0.01, "lon {}", geo.x);
        assert!((geo.y - 44.52).abs() < 0.05, "lat {}", geo.y);

        let back = WebMercator.to_display(geo);
        assert!((back.x - display.x).abs() < 1e-6);
        assert!((back.y - display.y).abs() < 1e-6);
    }

    #[test]
    fn display_clamps_polar_latitude() {
        let p = WebMercator.to_display(Point::new(0.0, 90.0));
        assert!(p.y.is_finite());
    }

    #[test]
    fn identity_is_identity() {
        let p = Point::new(1.5, -2.5);
        assert_eq!(Identity.to_geographic(p), p);
        assert_eq!(Identity.to_display(p), p);
    }
}
