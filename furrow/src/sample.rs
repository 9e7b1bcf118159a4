//! Point sampling along a line.
//!
//! Given a line, place points every N meters (or N points evenly), after
//! trimming padding off either end. Sampling can start from either end of
//! the line.

use serde::{Deserialize, Serialize};

use crate::error::{FurrowError, Result};
use crate::geodesy;
use crate::geometry::{Point, Shape};
use crate::projection::Projection;

/// Slack when comparing a sample distance against the line length.
///
/// Haversine lengths rarely come out bit-exact, so a sample landing on the
/// end of the line (e.g. 4 × 25 m on a 100 m line) would otherwise be lost
/// to rounding.
const LENGTH_EPSILON: f64 = 1e-6;

/// Which end of the line sampling starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartFrom {
    #[default]
    Start,
    End,
}

/// Validated sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleOptions {
    /// Spacing between consecutive points, meters.
    pub distance_meters: Option<f64>,
    /// Maximum number of points. Also sets the spacing when no distance is given.
    pub count: Option<usize>,
    pub padding_start_meters: f64,
    pub padding_end_meters: f64,
    /// Append the last point of the (sliced) line if sampling did not land on it.
    pub include_endpoint: bool,
    pub start_from: StartFrom,
}

/// Raw point-generation form values, as entered by the operator.
///
/// Field names follow the form controls (`paddingStart`, `generateEndPoint`,
/// ...) so job files can be written by hand.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointsForm {
    pub distance: Option<f64>,
    pub count: Option<f64>,
    pub padding_start: Option<f64>,
    pub padding_end: Option<f64>,
    pub generate_end_point: bool,
    pub start_generate: StartFrom,
}

/// Treat zero, NaN and infinities as "not entered".
fn sanitize_number(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

impl PointsForm {
    /// Normalize the raw form into sampling options.
    ///
    /// Fractional counts are rounded to the nearest whole point. Nothing is
    /// rejected here; [`sample_along_line`] validates.
    pub fn sanitize(&self) -> SampleOptions {
        let count = sanitize_number(self.count)
            .map(|c| c.round())
            .filter(|c| *c >= 1.0)
            .map(|c| c as usize);

        SampleOptions {
            distance_meters: sanitize_number(self.distance),
            count,
            padding_start_meters: sanitize_number(self.padding_start).unwrap_or(0.0),
            padding_end_meters: sanitize_number(self.padding_end).unwrap_or(0.0),
            include_endpoint: self.generate_end_point,
            start_from: self.start_generate,
        }
    }
}

/// Sample points along a geographic line.
///
/// Fails with [`FurrowError::InvalidParameters`] when neither a positive
/// distance nor a positive count is set. Degenerate lines (fewer than two
/// points, zero length, padding eating the whole line) give an empty list.
pub fn sample_along_line(line: &[Point], opts: &SampleOptions) -> Result<Vec<Point>> {
    let distance = opts.distance_meters.filter(|d| *d > 0.0);
    let count = opts.count.filter(|c| *c > 0);

    if distance.is_none() && count.is_none() {
        return Err(FurrowError::InvalidParameters(
            "either a point count or a distance between points is required".to_string(),
        ));
    }

    if line.len() < 2 {
        log::debug!("sampling skipped: line has {} point(s)", line.len());
        return Ok(Vec::new());
    }

    let total = geodesy::length(line);
    let mut sliced = geodesy::slice_along(
        line,
        opts.padding_start_meters,
        total - opts.padding_end_meters,
    );
    if sliced.len() < 2 {
        log::debug!("sampling skipped: padding leaves nothing of a {total:.2} m line");
        return Ok(Vec::new());
    }

    if opts.start_from == StartFrom::End {
        sliced.reverse();
    }

    let sliced_length = geodesy::length(&sliced);
    if sliced_length <= 0.0 {
        return Ok(Vec::new());
    }

    // `count` bounds the result either way; without a distance it also
    // spreads the points evenly.
    let step = match distance {
        Some(d) => d,
        None => sliced_length / count.unwrap_or(1) as f64,
    };
    let max_points = count.unwrap_or(usize::MAX);

    let mut points = Vec::new();
    let mut i = 0usize;
    loop {
        let travelled = i as f64 * step;
        if travelled > sliced_length + LENGTH_EPSILON || points.len() >= max_points {
            break;
        }
        if let Some(p) = geodesy::along(&sliced, travelled.min(sliced_length)) {
            points.push(p);
        }
        i += 1;
    }

    if opts.include_endpoint {
        if let Some(&end) = sliced.last() {
            if points.last() != Some(&end) {
                points.push(end);
            }
        }
    }

    log::debug!(
        "sampled {} point(s) along {:.2} m (step {:.3} m)",
        points.len(),
        sliced_length,
        step
    );
    Ok(points)
}

/// Generate points on a selected line shape given in display coordinates.
///
/// The returned points are geographic; project them with
/// [`Projection::to_display`] for rendering.
pub fn generate_points_on_line<P: Projection + ?Sized>(
    shape: &Shape,
    form: &PointsForm,
    projection: &P,
) -> Result<Vec<Point>> {
    let Shape::Line(display_points) = shape else {
        return Err(FurrowError::UnsupportedGeometry {
            expected: "LineString",
            found: shape.kind(),
        });
    };

    let opts = form.sanitize();
    let line = projection.points_to_geographic(display_points);
    sample_along_line(&line, &opts)
}

// ============================================================================
// TESTS
// ============================================================================
