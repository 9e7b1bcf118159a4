//! Row generation session.
//!
//! [`RowsSession`] is what a map front-end drives: it holds the selected
//! geometry, the form, the committed [`RowGridState`], the gesture
//! controller, and the last saved rows. Pointer positions come in display
//! coordinates; everything stored is geographic.

use std::time::Instant;

use crate::clip::{clip_rows, Segment};
use crate::error::{FurrowError, Result};
use crate::extract::extract_geographic_rings;
use crate::geometry::{MultiPolygon, Point, Shape};
use crate::gesture::{GestureController, GestureEnd};
use crate::grid::build_grid;
use crate::projection::Projection;
use crate::rows::{RowGridState, RowPreview, RowsForm};

pub struct RowsSession<P: Projection> {
    projection: P,
    selection: Option<Shape>,
    form: RowsForm,
    state: Option<RowGridState>,
    gestures: GestureController,
    final_rows: Vec<Segment>,
}

impl<P: Projection> RowsSession<P> {
    pub fn new(projection: P) -> Self {
        Self {
            projection,
            selection: None,
            form: RowsForm::default(),
            state: None,
            gestures: GestureController::new(),
            final_rows: Vec::new(),
        }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// Select the polygon rows are generated for (display coordinates).
    ///
    /// Any preview of the previous selection is dropped.
    pub fn select(&mut self, shape: Shape) {
        self.clear_preview();
        self.selection = Some(shape);
    }

    pub fn selection(&self) -> Option<&Shape> {
        self.selection.as_ref()
    }

    pub fn form(&self) -> &RowsForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RowsForm {
        &mut self.form
    }

    pub fn set_form(&mut self, form: RowsForm) {
        self.form = form;
    }

    /// Committed grid state, `None` when there is no preview.
    pub fn state(&self) -> Option<&RowGridState> {
        self.state.as_ref()
    }

    /// Committed state with any running drag applied.
    pub fn live_state(&self) -> Option<RowGridState> {
        self.state.as_ref().map(|state| self.gestures.live_state(state))
    }

    /// Current preview in geographic coordinates.
    pub fn preview(&self) -> Option<RowPreview> {
        self.live_state().map(|state| state.preview())
    }

    pub fn final_rows(&self) -> &[Segment] {
        &self.final_rows
    }

    /// Geographic contour of the selection.
    fn area(&self) -> Result<MultiPolygon> {
        let Some(shape) = &self.selection else {
            return Err(FurrowError::InvalidParameters("no polygon selected".to_string()));
        };
        if !matches!(shape, Shape::Polygon(_) | Shape::MultiPolygon(_)) {
            return Err(FurrowError::UnsupportedGeometry {
                expected: "Polygon or MultiPolygon",
                found: shape.kind(),
            });
        }
        extract_geographic_rings(shape, &self.projection).ok_or(FurrowError::NoValidContour)
    }

    fn clear_preview(&mut self) {
        self.state = None;
        self.gestures.reset();
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// Build the grid from the selection and the form, and make it the
    /// committed state.
    ///
    /// `angle` overrides the form's angle. The form's scale is clamped to the
    /// minimum and written back, so the form shows what was used.
    pub fn preview_rows(&mut self, angle: Option<f64>) -> Result<RowPreview> {
        let form = self.form.validated()?;
        let area = self.area()?;
        let grid = build_grid(&area, form.step, form.scale).ok_or(FurrowError::NoValidContour)?;

        self.form.scale = form.scale;
        let state = RowGridState::from_grid(&grid, angle.unwrap_or(form.angle), form.step);
        log::debug!(
            "row preview: {} rows, angle {}°, scale {}",
            grid.lines.len(),
            state.angle,
            form.scale
        );

        self.state = Some(state);
        Ok(state.preview())
    }

    /// Start over: drop any preview and build a fresh one from the form.
    pub fn generate_rows(&mut self) -> Result<RowPreview> {
        self.clear_preview();
        self.preview_rows(None)
    }

    /// Clip the previewed rows to the selection and keep them as the final
    /// rows. The preview is cleared.
    pub fn save_rows(&mut self) -> Result<Vec<Segment>> {
        let Some(state) = self.live_state() else {
            return Err(FurrowError::InvalidParameters("generate rows before saving".to_string()));
        };
        let area = self.area()?;

        let segments = clip_rows(&state.lines(), &area, self.form.direction);
        log::info!("saved {} row segments", segments.len());

        self.final_rows = segments.clone();
        self.clear_preview();
        Ok(segments)
    }

    /// Restore the default form and clear the preview and the saved rows.
    pub fn reset_rows_form_and_preview(&mut self) {
        self.form = RowsForm::default();
        self.final_rows.clear();
        self.clear_preview();
    }

    // ========================================================================
    // POINTER EVENTS (display coordinates)
    // ========================================================================

    /// Returns whether a rotate or translate gesture started.
    pub fn pointer_down(&mut self, pointer: Point) -> bool {
        match &self.state {
            Some(state) => self.gestures.begin(pointer, state, &self.projection),
            None => false,
        }
    }

    /// Returns whether the live preview changed.
    pub fn pointer_drag(&mut self, pointer: Point, now: Instant) -> bool {
        if self.state.is_none() {
            return false;
        }
        self.gestures.drag(pointer, now, &self.projection)
    }

    /// Run a due debounced recompute. Returns whether the live preview changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.state.is_some() && self.gestures.poll(now)
    }

    /// Finish the running gesture and commit it.
    ///
    /// A finished rotation also becomes the form's angle.
    pub fn pointer_up(&mut self) -> Option<GestureEnd> {
        let state = self.state.as_mut()?;
        let end = self.gestures.end(state);
        if let Some(GestureEnd::Rotated(angle)) = end {
            self.form.angle = angle;
        }
        end
    }

    /// Returns whether the map's default wheel zoom should be suppressed.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        match &self.state {
            Some(state) => self.gestures.hover(pointer, state, &self.projection),
            None => false,
        }
    }

    /// Wheel over the box: change the scale and rebuild the grid at the
    /// committed angle. `Ok(None)` when the pointer is not over the box.
    pub fn wheel(&mut self, delta_y: f64) -> Result<Option<RowPreview>> {
        let Some(state) = self.state else {
            return Ok(None);
        };
        let Some(scale) = self.gestures.wheel(self.form.scale, delta_y) else {
            return Ok(None);
        };

        self.form.scale = scale;
        self.preview_rows(Some(state.angle)).map(Some)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clip::{midpoint, point_in_multi_polygon, ScanDirection};
    use crate::projection::{Identity, WebMercator};

    /// 200 m square field in display (EPSG:3857) coordinates.
    fn field() -> Shape {
        Shape::MultiPolygon(vec![vec![vec![
            Point::new(3_743_000.0, 5_545_000.0),
            Point::new(3_743_200.0, 5_545_000.0),
            Point::new(3_743_200.0, 5_545_200.0),
            Point::new(3_743_000.0, 5_545_200.0),
            Point::new(3_743_000.0, 5_545_000.0),
        ]]])
    }

    fn session() -> RowsSession<WebMercator> {
        let mut session = RowsSession::new(WebMercator);
        session.select(field());
        session
    }

    #[test]
    fn generate_builds_preview() {
        let mut s = session();
        let preview = s.generate_rows().unwrap();
        assert!(!preview.lines.is_empty());
        assert_eq!(s.state().unwrap().angle, 0.0);
        assert_eq!(s.preview(), Some(preview));
    }

    #[test]
    fn scale_below_minimum_is_clamped() {
        let mut s = session();
        s.form_mut().scale = 0.5;
        s.generate_rows().unwrap();
        assert_eq!(s.form().scale, 1.0);

        let bbox = s.state().unwrap().source_bbox;
        let area = extract_geographic_rings(&field(), &WebMercator).unwrap();
        let extent = area.bounding_box().unwrap();
        assert!((bbox.width() - extent.width()).abs() < 1e-12);
    }

    #[test]
    fn errors_are_reported() {
        let mut s = RowsSession::new(Identity);
        assert!(matches!(s.generate_rows(), Err(FurrowError::InvalidParameters(_))));

        s.select(Shape::Line(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]));
        assert!(matches!(s.generate_rows(), Err(FurrowError::UnsupportedGeometry { .. })));

        s.select(Shape::Polygon(vec![vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]]));
        assert_eq!(s.generate_rows(), Err(FurrowError::NoValidContour));
        assert!(s.state().is_none());

        assert!(matches!(s.save_rows(), Err(FurrowError::InvalidParameters(_))));
    }

    #[test]
    fn save_clips_and_clears_preview() {
        let mut s = session();
        s.form_mut().direction = ScanDirection::RightToLeft;
        s.generate_rows().unwrap();

        let segments = s.save_rows().unwrap();
        assert!(!segments.is_empty());
        assert_eq!(segments.iter().filter(|seg| seg.first).count(), 1);
        assert!(s.state().is_none());
        assert_eq!(s.final_rows(), segments.as_slice());

        let area = extract_geographic_rings(&field(), &WebMercator).unwrap();
        for seg in &segments {
            let mid = midpoint(&seg.line.points).unwrap();
            assert!(point_in_multi_polygon(mid, &area));
        }
    }

    #[test]
    fn rotation_updates_form_angle() {
        let t0 = Instant::now();
        let mut s = session();
        s.generate_rows().unwrap();

        let pivot = WebMercator.to_display(s.state().unwrap().pivot);
        let handle = WebMercator.to_display(s.state().unwrap().handle());
        assert!(s.pointer_down(handle));

        // Swing the handle a quarter turn clockwise around the pivot.
        let (dx, dy) = (handle.x - pivot.x, handle.y - pivot.y);
        let release = Point::new(pivot.x + dy, pivot.y - dx);
        s.pointer_drag(release, t0);
        assert!(s.poll(t0 + Duration::from_millis(10)));

        assert_eq!(s.pointer_up(), Some(GestureEnd::Rotated(270.0)));
        assert_eq!(s.form().angle, 270.0);
        assert_eq!(s.state().unwrap().angle, 270.0);
    }

    #[test]
    fn handle_follows_the_pointer() {
        let t0 = Instant::now();
        let mut s = session();
        s.generate_rows().unwrap();

        let pivot = WebMercator.to_display(s.state().unwrap().pivot);
        let handle = WebMercator.to_display(s.state().unwrap().handle());
        let radius = handle.distance(pivot);

        for turn in [30.0_f64, -30.0, 135.0] {
            let start = WebMercator.to_display(s.state().unwrap().handle());
            let start_angle = (start.y - pivot.y).atan2(start.x - pivot.x);
            let target = start_angle + turn.to_radians();
            let release = Point::new(pivot.x + radius * target.cos(), pivot.y + radius * target.sin());

            assert!(s.pointer_down(start), "turn {turn}: handle not hit");
            s.pointer_drag(release, t0);
            assert!(s.poll(t0 + Duration::from_millis(10)));
            s.pointer_up();

            // Rounding to whole degrees moves the handle at most half a
            // degree of arc away from the release point.
            let now = WebMercator.to_display(s.state().unwrap().handle());
            let slack = radius * 0.5_f64.to_radians() + 0.01;
            assert!(now.distance(release) < slack, "turn {turn}: handle at {now:?}, released at {release:?}");
        }
    }

    #[test]
    fn zero_drag_keeps_pivot() {
        let t0 = Instant::now();
        let mut s = RowsSession::new(WebMercator);
        s.select(Shape::Polygon(vec![vec![
            Point::new(3_740_000.0, 5_540_000.0),
            Point::new(3_750_000.0, 5_540_000.0),
            Point::new(3_750_000.0, 5_550_000.0),
            Point::new(3_740_000.0, 5_550_000.0),
        ]]));
        s.form_mut().scale = 3.0;
        s.form_mut().step = 500.0;
        s.generate_rows().unwrap();
        let before = *s.state().unwrap();

        let grab = WebMercator.to_display(before.pivot);
        assert!(s.pointer_down(grab));
        s.pointer_drag(grab, t0);
        assert_eq!(s.pointer_up(), Some(GestureEnd::Translated));

        let after = *s.state().unwrap();
        let shift = crate::geodesy::distance(before.pivot, after.pivot);
        assert!(shift < 1e-3, "pivot moved {shift} m");
        assert!((after.source_bbox.min_x - before.source_bbox.min_x).abs() < 1e-9);
    }

    #[test]
    fn tiny_step_gives_empty_preview() {
        let mut s = session();
        s.form_mut().step = 1e-300;
        let preview = s.generate_rows().unwrap();
        assert!(preview.lines.is_empty());
        assert!(s.save_rows().unwrap().is_empty());
    }

    #[test]
    fn reset_after_rotation_leaves_nothing() {
        let t0 = Instant::now();
        let mut s = session();
        s.generate_rows().unwrap();
        let handle = WebMercator.to_display(s.state().unwrap().handle());
        assert!(s.pointer_down(handle));
        s.pointer_drag(handle.offset(0.0, -30.0), t0);

        s.reset_rows_form_and_preview();
        assert!(s.state().is_none());
        assert!(s.preview().is_none());
        assert_eq!(s.form(), &RowsForm::default());
        assert_eq!(s.form().angle, 0.0);

        // The recompute armed before the reset must not resurrect anything.
        assert!(!s.poll(t0 + Duration::from_millis(50)));
        assert_eq!(s.pointer_up(), None);
        assert!(s.state().is_none());
    }

    #[test]
    fn reset_clears_saved_rows() {
        let mut s = session();
        s.generate_rows().unwrap();
        s.save_rows().unwrap();
        assert!(!s.final_rows().is_empty());
        s.reset_rows_form_and_preview();
        assert!(s.final_rows().is_empty());
    }

    #[test]
    fn translate_commits_moved_pivot() {
        let t0 = Instant::now();
        let mut s = session();
        s.generate_rows().unwrap();
        let before = *s.state().unwrap();

        let grab = WebMercator.to_display(before.pivot);
        assert!(s.pointer_down(grab));
        assert!(s.pointer_drag(grab.offset(50.0, 0.0), t0));
        assert_eq!(s.pointer_up(), Some(GestureEnd::Translated));

        let after = *s.state().unwrap();
        assert!(after.pivot.x > before.pivot.x);
        assert!((after.pivot.y - before.pivot.y).abs() < 1e-6);
        assert!((after.source_bbox.width() - before.source_bbox.width()).abs() < 1e-12);
    }

    #[test]
    fn wheel_over_box_rescales() {
        let mut s = session();
        s.generate_rows().unwrap();
        let before = s.state().unwrap().source_bbox;

        let inside = WebMercator.to_display(before.center());
        assert!(s.pointer_move(inside));
        let preview = s.wheel(-500.0).unwrap();
        assert!(preview.is_some());
        assert_eq!(s.form().scale, 1.5);

        let after = s.state().unwrap().source_bbox;
        assert!((after.width() - 1.5 * before.width()).abs() < 1e-9);

        assert!(!s.pointer_move(Point::new(0.0, 0.0)));
        assert_eq!(s.wheel(-500.0), Ok(None));
    }
}
