//! Pointer gestures over the row preview.
//!
//! Three gestures edit the same [`RowGridState`]:
//!
//! - **rotate**: drag the handle; the angle follows the pointer around the
//!   pivot, recomputed at most once per [`ROTATE_DEBOUNCE`]
//! - **translate**: drag the box body; box and pivot move with it
//! - **scale**: wheel while hovering the box
//!
//! Only one gesture runs at a time. [`GestureMode`] is the guard: a gesture
//! can only start from `Idle` (or from hovering, for drags).
//!
//! The controller never owns the state. Drags produce a live override (see
//! [`GestureController::live_state`]) and only [`GestureController::end`]
//! writes back. Time is passed in by the caller, so the debounce is driven by
//! whatever clock the event loop uses.

use std::time::{Duration, Instant};

use crate::clip::{point_in_ring, point_on_ring};
use crate::geometry::{BoundingBox, Point};
use crate::projection::Projection;
use crate::rows::{RowGridState, MIN_SCALE};
use crate::transform::centroid;

/// Minimum time between two rotation recomputes.
pub const ROTATE_DEBOUNCE: Duration = Duration::from_millis(10);

/// Scale change per unit of wheel delta.
pub const WHEEL_SCALE_FACTOR: f64 = 0.001;

/// How close (display units) a pointer-down must be to the handle.
pub const HANDLE_TOLERANCE: f64 = 10.0;

// ============================================================================
// DEBOUNCE
// ============================================================================

/// Trailing-edge debounce with an epoch guard.
///
/// `schedule` arms the timer unless one is already pending. `fire` reports
/// whether the pending run is due and still belongs to the current epoch;
/// `invalidate` bumps the epoch so a run armed before it can never fire.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<Pending>,
    epoch: u64,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    epoch: u64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None, epoch: 0 }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Arm the timer. Returns `false` if a run was already pending.
    pub fn schedule(&mut self, now: Instant) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(Pending { due: now + self.window, epoch: self.epoch });
        true
    }

    /// Consume the pending run if it is due. Stale runs are dropped.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(pending) if now >= pending.due => {
                self.pending = None;
                if pending.epoch != self.epoch {
                    log::debug!("discarding stale recompute from epoch {}", pending.epoch);
                    return false;
                }
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Make every run armed so far stale.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
    }
}

// ============================================================================
// GESTURE MATH
// ============================================================================

/// Angle of `pointer` around `pivot`, radians.
#[inline]
pub fn pointer_angle(pointer: Point, pivot: Point) -> f64 {
    (pointer.y - pivot.y).atan2(pointer.x - pivot.x)
}

/// Degrees turned from `start` to `current` (both radians), in `[0, 360)`
/// for any turn smaller than a full circle.
///
/// Counter-clockwise in y-up coordinates, the same sense as
/// [`crate::transform::rotation_about`], so the box turns with the pointer.
#[inline]
pub fn rotation_delta_degrees(start: f64, current: f64) -> f64 {
    let delta = (current - start).to_degrees();
    if delta < 0.0 { delta + 360.0 } else { delta }
}

/// New box scale after a wheel event: never below [`MIN_SCALE`], two decimals.
pub fn wheel_scale(current: f64, delta_y: f64) -> f64 {
    let scale = (current - delta_y * WHEEL_SCALE_FACTOR).max(MIN_SCALE);
    (scale * 100.0).round() / 100.0
}

// ============================================================================
// CONTROLLER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateDrag {
    /// Pivot in display coordinates.
    pivot: Point,
    start_angle: f64,
    start_preview_angle: f64,
    /// Last computed angle, degrees.
    preview_angle: f64,
    /// Latest pointer position; read when the debounced recompute fires.
    pointer: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslateDrag {
    start_pointer: Point,
    start_bbox: BoundingBox,
    start_pivot: Point,
    /// Rotated box as displayed when the drag began.
    start_corners: [Point; 4],
    moved_bbox: BoundingBox,
    moved_pivot: Point,
}

/// Which gesture, if any, owns the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    Rotating(RotateDrag),
    Translating(TranslateDrag),
    /// Pointer is over the box: wheel scales it instead of zooming the map.
    Scaling,
}

/// What a finished gesture committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEnd {
    /// Rounded angle, degrees.
    Rotated(f64),
    Translated,
}

#[derive(Debug, Clone)]
pub struct GestureController {
    mode: GestureMode,
    debounce: Debouncer,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

fn display_corners<P: Projection + ?Sized>(state: &RowGridState, projection: &P) -> [Point; 4] {
    state.bbox().map(|p| projection.to_display(p))
}

/// Is a display-space pointer over the displayed box?
fn over_box<P: Projection + ?Sized>(pointer: Point, state: &RowGridState, projection: &P) -> bool {
    let corners = display_corners(state, projection);
    let ring = [corners[0], corners[1], corners[2], corners[3], corners[0]];
    point_in_ring(pointer, &ring) || point_on_ring(pointer, &ring)
}

impl GestureController {
    pub fn new() -> Self {
        Self {
            mode: GestureMode::Idle,
            debounce: Debouncer::new(ROTATE_DEBOUNCE),
        }
    }

    pub fn mode(&self) -> &GestureMode {
        &self.mode
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, GestureMode::Rotating(_) | GestureMode::Translating(_))
    }

    /// Pointer-down in display coordinates.
    ///
    /// Starts a rotation when the pointer hits the handle, a translation when
    /// it hits the box body. Returns whether a gesture started.
    pub fn begin<P: Projection + ?Sized>(
        &mut self,
        pointer: Point,
        state: &RowGridState,
        projection: &P,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }

        let handle = projection.to_display(state.handle());
        if handle.distance(pointer) <= HANDLE_TOLERANCE {
            let pivot = projection.to_display(state.pivot);
            self.mode = GestureMode::Rotating(RotateDrag {
                pivot,
                start_angle: pointer_angle(pointer, pivot),
                start_preview_angle: state.angle,
                preview_angle: state.angle,
                pointer,
            });
            log::debug!("rotation started at {:.1}°", state.angle);
            return true;
        }

        if over_box(pointer, state, projection) {
            self.mode = GestureMode::Translating(TranslateDrag {
                start_pointer: pointer,
                start_bbox: state.source_bbox,
                start_pivot: state.pivot,
                start_corners: display_corners(state, projection),
                moved_bbox: state.source_bbox,
                moved_pivot: state.pivot,
            });
            log::debug!("translation started");
            return true;
        }

        false
    }

    /// Pointer-drag in display coordinates.
    ///
    /// Translation follows immediately. Rotation records the pointer and
    /// recomputes only when the debounce window allows. Returns whether the
    /// live state changed.
    pub fn drag<P: Projection + ?Sized>(&mut self, pointer: Point, now: Instant, projection: &P) -> bool {
        match &mut self.mode {
            GestureMode::Rotating(drag) => {
                drag.pointer = pointer;
                if self.debounce.fire(now) {
                    Self::recompute_angle(drag);
                    return true;
                }
                self.debounce.schedule(now);
                false
            }
            GestureMode::Translating(drag) => {
                let (dx, dy) = (pointer.x - drag.start_pointer.x, pointer.y - drag.start_pointer.y);
                // Averaged after projecting: a display-space centroid does not
                // map back onto the geographic pivot.
                let moved = drag.start_corners.map(|p| projection.to_geographic(p.offset(dx, dy)));
                let Some(center) = centroid(&moved) else {
                    return false;
                };
                let (dx, dy) = (center.x - drag.start_pivot.x, center.y - drag.start_pivot.y);
                drag.moved_bbox = drag.start_bbox.translated(dx, dy);
                drag.moved_pivot = drag.start_pivot.offset(dx, dy);
                true
            }
            GestureMode::Idle | GestureMode::Scaling => false,
        }
    }

    /// Run a due rotation recompute. Call from the event loop's timer.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.debounce.fire(now) {
            return false;
        }
        match &mut self.mode {
            GestureMode::Rotating(drag) => {
                Self::recompute_angle(drag);
                true
            }
            _ => false,
        }
    }

    fn recompute_angle(drag: &mut RotateDrag) {
        let current = pointer_angle(drag.pointer, drag.pivot);
        drag.preview_angle = drag.start_preview_angle + rotation_delta_degrees(drag.start_angle, current);
    }

    /// The committed state with the running drag applied.
    pub fn live_state(&self, state: &RowGridState) -> RowGridState {
        match &self.mode {
            GestureMode::Rotating(drag) => state.with_angle(drag.preview_angle),
            GestureMode::Translating(drag) => RowGridState {
                source_bbox: drag.moved_bbox,
                pivot: drag.moved_pivot,
                ..*state
            },
            GestureMode::Idle | GestureMode::Scaling => *state,
        }
    }

    /// Pointer-up: commit the drag into `state`.
    ///
    /// Rotation commits its last computed angle rounded to whole degrees; a
    /// pointer position not yet recomputed is dropped.
    pub fn end(&mut self, state: &mut RowGridState) -> Option<GestureEnd> {
        self.debounce.cancel();
        match std::mem::take(&mut self.mode) {
            GestureMode::Rotating(drag) => {
                let angle = drag.preview_angle.round();
                state.angle = angle;
                log::debug!("rotation committed at {angle}°");
                Some(GestureEnd::Rotated(angle))
            }
            GestureMode::Translating(drag) => {
                state.source_bbox = drag.moved_bbox;
                state.pivot = drag.moved_pivot;
                log::debug!("translation committed, pivot now {:?}", drag.moved_pivot);
                Some(GestureEnd::Translated)
            }
            mode @ (GestureMode::Idle | GestureMode::Scaling) => {
                self.mode = mode;
                None
            }
        }
    }

    /// Pointer-move without buttons. Returns whether the map's own wheel
    /// zoom should be suppressed (pointer over the box).
    pub fn hover<P: Projection + ?Sized>(&mut self, pointer: Point, state: &RowGridState, projection: &P) -> bool {
        match self.mode {
            GestureMode::Idle | GestureMode::Scaling => {
                let over = over_box(pointer, state, projection);
                self.mode = if over { GestureMode::Scaling } else { GestureMode::Idle };
                over
            }
            GestureMode::Rotating(_) | GestureMode::Translating(_) => true,
        }
    }

    /// Wheel event. Returns the new scale when the pointer is over the box.
    pub fn wheel(&self, current_scale: f64, delta_y: f64) -> Option<f64> {
        match self.mode {
            GestureMode::Scaling => Some(wheel_scale(current_scale, delta_y)),
            _ => None,
        }
    }

    /// Drop any gesture in progress. Pending recomputes become stale.
    pub fn reset(&mut self) {
        self.mode = GestureMode::Idle;
        self.debounce.invalidate();
        self.debounce.cancel();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Identity;

    fn state() -> RowGridState {
        RowGridState {
            source_bbox: BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 100.0, max_y: 100.0 },
            pivot: Point::new(50.0, 50.0),
            angle: 0.0,
            step_meters: 1000.0,
        }
    }

    fn ms(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn debouncer_fires_once_per_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ROTATE_DEBOUNCE);
        assert!(d.schedule(t0));
        assert!(!d.schedule(ms(t0, 3)));
        assert!(!d.fire(ms(t0, 5)));
        assert!(d.fire(ms(t0, 10)));
        assert!(!d.fire(ms(t0, 11)));
    }

    #[test]
    fn invalidated_run_never_fires() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ROTATE_DEBOUNCE);
        d.schedule(t0);
        d.invalidate();
        assert!(!d.fire(ms(t0, 20)));
        assert!(!d.is_pending());
    }

    #[test]
    fn delta_is_normalized() {
        let quarter = std::f64::consts::FRAC_PI_2;
        assert!((rotation_delta_degrees(0.0, quarter) - 90.0).abs() < 1e-9);
        assert!((rotation_delta_degrees(quarter, 0.0) - 270.0).abs() < 1e-9);
        assert_eq!(rotation_delta_degrees(1.0, 1.0), 0.0);
    }

    #[test]
    fn wheel_scale_clamps_and_rounds() {
        assert_eq!(wheel_scale(1.0, 100.0), 1.0);
        assert_eq!(wheel_scale(1.0, -250.0), 1.25);
        assert_eq!(wheel_scale(2.0, 123.0), 1.88);
    }

    #[test]
    fn handle_hit_starts_rotation() {
        let s = state();
        let mut g = GestureController::new();
        assert!(g.begin(Point::new(103.0, 2.0), &s, &Identity));
        assert!(matches!(g.mode(), GestureMode::Rotating(_)));
        assert!(!g.begin(Point::new(50.0, 50.0), &s, &Identity));
    }

    #[test]
    fn body_hit_starts_translation_and_outside_does_nothing() {
        let s = state();
        let mut g = GestureController::new();
        assert!(!g.begin(Point::new(500.0, 500.0), &s, &Identity));
        assert_eq!(g.mode(), &GestureMode::Idle);
        assert!(g.begin(Point::new(50.0, 50.0), &s, &Identity));
        assert!(matches!(g.mode(), GestureMode::Translating(_)));
    }

    #[test]
    fn rotation_is_debounced_and_rounded() {
        let t0 = Instant::now();
        let mut s = state();
        let mut g = GestureController::new();
        // Handle sits at (100, 0): -45° around the pivot.
        assert!(g.begin(Point::new(100.0, 0.0), &s, &Identity));

        // Pointer swings clockwise to straight below the pivot: -90°, so the
        // box turns 45° clockwise, i.e. 315° counter-clockwise.
        assert!(!g.drag(Point::new(50.0, 0.0), t0, &Identity));
        assert_eq!(g.live_state(&s).angle, 0.0);

        // Inside the window: only the pointer is recorded.
        assert!(!g.drag(Point::new(50.2, 0.0), ms(t0, 4), &Identity));
        assert!(g.poll(ms(t0, 10)));
        let live = g.live_state(&s).angle;
        assert!((live - 315.0).abs() < 0.5, "got {live}");

        assert_eq!(g.end(&mut s), Some(GestureEnd::Rotated(315.0)));
        assert_eq!(s.angle, 315.0);
        assert_eq!(g.mode(), &GestureMode::Idle);
    }

    #[test]
    fn translation_moves_box_and_pivot() {
        let t0 = Instant::now();
        let mut s = state();
        let mut g = GestureController::new();
        assert!(g.begin(Point::new(40.0, 40.0), &s, &Identity));
        assert!(g.drag(Point::new(50.0, 45.0), t0, &Identity));

        let live = g.live_state(&s);
        assert_eq!(live.pivot, Point::new(60.0, 55.0));
        assert_eq!(s.pivot, Point::new(50.0, 50.0));

        assert_eq!(g.end(&mut s), Some(GestureEnd::Translated));
        assert_eq!(s.pivot, Point::new(60.0, 55.0));
        assert_eq!(s.source_bbox.min_x, 10.0);
        assert_eq!(s.source_bbox.max_y, 105.0);
    }

    #[test]
    fn hover_toggles_scaling() {
        let s = state();
        let mut g = GestureController::new();
        assert_eq!(g.wheel(1.0, -100.0), None);
        assert!(g.hover(Point::new(10.0, 10.0), &s, &Identity));
        assert_eq!(g.wheel(1.0, -100.0), Some(1.1));
        assert!(!g.hover(Point::new(-10.0, 10.0), &s, &Identity));
        assert_eq!(g.wheel(1.0, -100.0), None);
    }

    #[test]
    fn reset_discards_pending_rotation() {
        let t0 = Instant::now();
        let s = state();
        let mut g = GestureController::new();
        g.begin(Point::new(100.0, 0.0), &s, &Identity);
        g.drag(Point::new(50.0, 0.0), t0, &Identity);
        g.reset();
        assert!(!g.poll(ms(t0, 50)));
        assert_eq!(g.live_state(&s), s);
    }
}
