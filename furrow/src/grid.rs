//! Row grid generation for polygon fills.
//!
//! Generates a family of parallel, constant-longitude lines covering a
//! polygon's (scaled) bounding box. The lines are later rotated about the
//! pivot by [`crate::transform`] and clipped to the polygon by
//! [`crate::clip`].

use crate::geometry::{BoundingBox, Line, MultiPolygon, Point};

/// Kilometers per degree of longitude at the equator.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Upper bound on rows in one grid. A step small enough to exceed it gives
/// no rows at all.
pub const MAX_ROWS: usize = 100_000;

/// An axis-aligned box, its center, and the unrotated rows spanning it.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub bbox: BoundingBox,
    pub pivot: Point,
    pub lines: Vec<Line>,
}

/// Longitude increment for a row spacing of `step_meters` at `latitude`.
///
/// ## Rust Lesson #17: f64 Methods
///
/// Rust's f64 has methods for math: `.cos()`, `.to_radians()`, etc.
/// Unlike JS there's no `Math.cos()`, it's just `lat.to_radians().cos()`.
///
/// Equirectangular approximation: exact enough near `latitude`, which is all
/// a local row layout needs.
#[inline]
pub fn lon_step(latitude: f64, step_meters: f64) -> f64 {
    (step_meters / 1000.0) / (KM_PER_DEGREE * latitude.to_radians().cos())
}

/// Vertical lines from `min_x` to `max_x` (inclusive) spanning the box's
/// full height.
///
/// The spacing is evaluated at the box's southern edge. A spacing that is not
/// a positive finite number (zero step, polar latitude) yields no lines.
pub fn grid_lines(bbox: &BoundingBox, step_meters: f64) -> Vec<Line> {
    let step = lon_step(bbox.min_y, step_meters);
    if !step.is_finite() || step <= 0.0 {
        log::debug!("row spacing {step} is unusable, no rows generated");
        return Vec::new();
    }

    // Counted in f64 first: a tiny step would overflow `usize`.
    let gaps = ((bbox.max_x - bbox.min_x) / step).floor();
    if !(gaps < MAX_ROWS as f64) {
        log::warn!("row step {step_meters} m needs {gaps} rows, limit is {MAX_ROWS}; no rows generated");
        return Vec::new();
    }

    // ## Rust Lesson #19: Integer Math
    //
    // Stepping by index (min_x + i * step) instead of accumulating
    // `lon += step` keeps rounding error from drifting across many rows.
    let gaps = gaps.max(0.0) as usize;
    let mut lines = Vec::with_capacity(gaps + 1);
    // One extra index: the floor above may round a landing row away.
    for i in 0..=gaps + 1 {
        let lon = bbox.min_x + i as f64 * step;
        if lon > bbox.max_x {
            break;
        }
        lines.push(Line::segment(
            Point::new(lon, bbox.min_y),
            Point::new(lon, bbox.max_y),
        ));
    }

    lines
}

/// Build the grid for a polygon: bounding box scaled about its center, the
/// pivot at that center, and rows across the scaled box.
///
/// The scale is applied as given. Callers enforce the lower bound.
pub fn build_grid(area: &MultiPolygon, step_meters: f64, scale: f64) -> Option<Grid> {
    let Some(bbox) = area.bounding_box() else {
        // ## Rust Lesson #18: let-else
        //
        // `let Some(x) = expr else { return }` unwraps an Option and handles
        // the None case in one place.
        log::debug!("empty polygon, no grid");
        return None;
    };

    let bbox = bbox.scaled(scale);
    let lines = grid_lines(&bbox, step_meters);
    log::debug!(
        "grid: {} rows across {:.6}° of longitude (step {step_meters} m, scale {scale})",
        lines.len(),
        bbox.width()
    );

    Some(Grid {
        pivot: bbox.center(),
        bbox,
        lines,
    })
}

// ============================================================================
// TESTS
// ============================================================================
