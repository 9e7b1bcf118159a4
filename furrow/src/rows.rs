//! Row grid state and its live preview.
//!
//! [`RowGridState`] is the single source of truth while rows are being laid
//! out. The rotated box, its handle, and the rotated rows are all computed
//! from it on demand and never stored, so what is shown is always what will
//! be clipped on save.

use serde::{Deserialize, Serialize};

use crate::clip::ScanDirection;
use crate::error::{FurrowError, Result};
use crate::geometry::{BoundingBox, Line, Point};
use crate::grid::{grid_lines, Grid};
use crate::projection::Projection;
use crate::transform::{rotate_corners, rotate_lines, rotate_point};

/// Smallest allowed box scale: the box never shrinks below the polygon's extent.
pub const MIN_SCALE: f64 = 1.0;

/// Index of the box corner that carries the rotation handle.
pub const HANDLE_CORNER: usize = 1;

/// Row-generation form values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RowsForm {
    /// Distance between rows, meters.
    pub step: f64,
    /// Row rotation, degrees.
    pub angle: f64,
    /// Box scale about its center.
    pub scale: f64,
    pub direction: ScanDirection,
}

impl Default for RowsForm {
    fn default() -> Self {
        Self {
            step: 10.0,
            angle: 0.0,
            scale: 1.0,
            direction: ScanDirection::LeftToRight,
        }
    }
}

impl RowsForm {
    /// Check the form and clamp the scale to [`MIN_SCALE`].
    ///
    /// A missing or broken scale falls back to the minimum; a step that is
    /// not a positive number, or a non-finite angle, is rejected.
    pub fn validated(&self) -> Result<RowsForm> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(FurrowError::InvalidParameters(format!(
                "row step must be a positive number of meters, got {}",
                self.step
            )));
        }
        if !self.angle.is_finite() {
            return Err(FurrowError::InvalidParameters(format!(
                "row angle must be a number of degrees, got {}",
                self.angle
            )));
        }

        let scale = if self.scale.is_finite() { self.scale.max(MIN_SCALE) } else { MIN_SCALE };
        if scale != self.scale {
            log::debug!("scale {} clamped to {scale}", self.scale);
        }

        Ok(RowsForm { scale, ..*self })
    }
}

/// Committed layout of the row grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGridState {
    /// Unrotated (already scaled) box.
    pub source_bbox: BoundingBox,
    /// Rotation center.
    pub pivot: Point,
    /// Degrees.
    pub angle: f64,
    pub step_meters: f64,
}

/// Everything the collaborator draws while rows are being laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPreview {
    /// Rotated box corners (SW, SE, NE, NW before rotation).
    pub bbox: [Point; 4],
    pub pivot: Point,
    /// Rotation handle position.
    pub handle: Point,
    pub lines: Vec<Line>,
}

impl RowGridState {
    pub fn from_grid(grid: &Grid, angle: f64, step_meters: f64) -> Self {
        Self {
            source_bbox: grid.bbox,
            pivot: grid.pivot,
            angle,
            step_meters,
        }
    }

    pub fn with_angle(self, angle: f64) -> Self {
        Self { angle, ..self }
    }

    /// Box corners rotated about the pivot.
    pub fn bbox(&self) -> [Point; 4] {
        rotate_corners(&self.source_bbox.corners(), self.angle, self.pivot)
    }

    /// Rows across the source box, rotated about the pivot.
    pub fn lines(&self) -> Vec<Line> {
        rotate_lines(&grid_lines(&self.source_bbox, self.step_meters), self.angle, self.pivot)
    }

    pub fn handle(&self) -> Point {
        rotate_point(self.source_bbox.corners()[HANDLE_CORNER], self.angle, self.pivot)
    }

    pub fn preview(&self) -> RowPreview {
        RowPreview {
            bbox: self.bbox(),
            pivot: self.pivot,
            handle: self.handle(),
            lines: self.lines(),
        }
    }
}

impl RowPreview {
    /// The same preview in display coordinates.
    pub fn to_display<P: Projection + ?Sized>(&self, projection: &P) -> RowPreview {
        RowPreview {
            bbox: self.bbox.map(|p| projection.to_display(p)),
            pivot: projection.to_display(self.pivot),
            handle: projection.to_display(self.handle),
            lines: self
                .lines
                .iter()
                .map(|line| Line::new(projection.points_to_display(&line.points)))
                .collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
