//! Row clipping against the selected polygon.
//!
//! Each row is split at every crossing with a polygon ring. A piece is kept
//! when its arc-length midpoint lies inside the polygon (boundary counts as
//! inside). Rows that never cross the boundary are kept whole if their own
//! midpoint is inside.
//!
//! Splitting is planar in lon/lat; midpoints are measured in meters.

use serde::{Deserialize, Serialize};

use crate::geodesy;
use crate::geometry::{Line, MultiPolygon, Point, Polygon};

/// Crossings closer than this (in coordinate units) are the same crossing.
const SNAP_TOLERANCE: f64 = 1e-12;

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================
//
// ## Rust Lesson #8: References & Slices
//
// `&[Point]` is a "slice" - a borrowed view into a contiguous sequence.
// It works with Vec<Point>, arrays, or a `Ring`'s points alike.

/// Test if a point is strictly inside a closed ring using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside. Points exactly on the boundary
/// may land either way; use [`point_on_ring`] for those.
#[inline]
pub fn point_in_ring(p: Point, ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);

        if ((yi > p.y) != (yj > p.y)) && (p.x < (xj - xi) * (p.y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }

        j = i;
    }

    inside
}

/// Is `p` on the segment `a`-`b`, within a tolerance relative to its length?
fn point_on_segment(p: Point, a: Point, b: Point) -> bool {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p == a;
    }

    let cross = (p.x - a.x) * dy - (p.y - a.y) * dx;
    if cross.abs() > 1e-9 * len_sq {
        return false;
    }

    let dot = (p.x - a.x) * dx + (p.y - a.y) * dy;
    (-1e-12 * len_sq..=len_sq * (1.0 + 1e-12)).contains(&dot)
}

pub fn point_on_ring(p: Point, ring: &[Point]) -> bool {
    ring.windows(2).any(|e| point_on_segment(p, e[0], e[1]))
}

/// Boundary-inclusive point-in-polygon.
///
/// Inside or on the exterior, and not strictly inside any hole. A point on a
/// hole's edge is on the polygon's boundary, so it counts as inside.
pub fn point_in_polygon(p: Point, polygon: &Polygon) -> bool {
    let exterior = polygon.exterior.points();
    if !(point_on_ring(p, exterior) || point_in_ring(p, exterior)) {
        return false;
    }

    !polygon.interiors.iter().any(|hole| {
        let hole = hole.points();
        point_in_ring(p, hole) && !point_on_ring(p, hole)
    })
}

pub fn point_in_multi_polygon(p: Point, area: &MultiPolygon) -> bool {
    area.polygons().iter().any(|polygon| point_in_polygon(p, polygon))
}

// ============================================================================
// LINE-LINE INTERSECTION
// ============================================================================

/// Result of a line-line intersection test.
///
/// ## Rust Lesson #10: Enums (Sum Types)
///
/// Rust enums can carry data. The compiler ensures you handle ALL variants
/// (exhaustive matching).
#[derive(Debug, Clone, Copy)]
pub enum Intersection {
    None,
    Point { x: f64, y: f64, t: f64 },
}

/// Find the intersection point between segments `a1`-`a2` and `b1`-`b2`.
///
/// `t` is the parameter along the first segment (0 at `a1`, 1 at `a2`).
/// Parallel and collinear segments report no intersection; the parallel test
/// is relative to the segment lengths, since lon/lat rows are tiny.
#[inline]
pub fn line_segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Intersection {
    let (dax, day) = (a2.x - a1.x, a2.y - a1.y);
    let (dbx, dby) = (b2.x - b1.x, b2.y - b1.y);
    let denom = dby * dax - dbx * day;

    let scale = (dax * dax + day * day).sqrt() * (dbx * dbx + dby * dby).sqrt();
    if scale == 0.0 || denom.abs() <= 1e-12 * scale {
        return Intersection::None;
    }

    let ua = (dbx * (a1.y - b1.y) - dby * (a1.x - b1.x)) / denom;
    let ub = (dax * (a1.y - b1.y) - day * (a1.x - b1.x)) / denom;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Intersection::Point {
            x: a1.x + ua * dax,
            y: a1.y + ua * day,
            t: ua,
        }
    } else {
        Intersection::None
    }
}

// ============================================================================
// LINE SPLITTING
// ============================================================================

/// A crossing between a row and a ring edge.
#[derive(Debug, Clone, Copy)]
struct Cut {
    /// Index of the row segment that is crossed.
    segment: usize,
    /// Position along that segment.
    t: f64,
    point: Point,
}

/// Every boundary crossing of `line`, in order along the line.
///
/// Crossings at the line's own start or end do not split anything and are
/// left out, as are repeats of the same point (a row passing through a ring
/// vertex hits two edges there).
fn boundary_cuts(line: &[Point], area: &MultiPolygon) -> Vec<Cut> {
    let last_segment = line.len().saturating_sub(2);

    // ## Rust Lesson #11: Capacity Hints
    //
    // Vec::with_capacity(n) pre-allocates memory, avoiding reallocations as
    // we push items.
    let mut cuts = Vec::with_capacity(8);

    for (segment, pair) in line.windows(2).enumerate() {
        for edge in area.rings().flat_map(|ring| ring.edges()) {
            // ## Rust Lesson #12: Pattern Matching
            //
            // `if let` only executes if the pattern matches.
            if let Intersection::Point { x, y, t } =
                line_segment_intersection(pair[0], pair[1], edge.0, edge.1)
            {
                let at_start = segment == 0 && t <= SNAP_TOLERANCE;
                let at_end = segment == last_segment && t >= 1.0 - SNAP_TOLERANCE;
                if !(at_start || at_end) {
                    cuts.push(Cut { segment, t, point: Point::new(x, y) });
                }
            }
        }
    }

    cuts.sort_by(|a, b| a.segment.cmp(&b.segment).then(a.t.total_cmp(&b.t)));
    cuts.dedup_by(|b, a| a.point.distance(b.point) <= SNAP_TOLERANCE);
    cuts
}

/// Split a polyline at the given cuts into consecutive pieces.
fn split_at(line: &[Point], cuts: &[Cut]) -> Vec<Vec<Point>> {
    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let Some(&first) = line.first() else {
        return pieces;
    };

    let mut cuts = cuts.iter().peekable();
    let mut current = vec![first];

    for (segment, pair) in line.windows(2).enumerate() {
        while let Some(cut) = cuts.next_if(|cut| cut.segment == segment) {
            push_distinct(&mut current, cut.point);
            pieces.push(std::mem::replace(&mut current, vec![cut.point]));
        }
        push_distinct(&mut current, pair[1]);
    }

    pieces.push(current);
    pieces
}

#[inline]
fn push_distinct(points: &mut Vec<Point>, p: Point) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

/// The point halfway along a polyline, by arc length.
pub fn midpoint(points: &[Point]) -> Option<Point> {
    geodesy::along(points, geodesy::length(points) / 2.0)
}

// ============================================================================
// ROW CLIPPING
// ============================================================================

/// Which end of the field row traversal starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl ScanDirection {
    /// Sort key: smaller means earlier in the scan.
    fn rank(self, p: Point) -> f64 {
        match self {
            ScanDirection::LeftToRight => p.x,
            ScanDirection::RightToLeft => -p.x,
            ScanDirection::TopToBottom => -p.y,
            ScanDirection::BottomToTop => p.y,
        }
    }
}

impl std::str::FromStr for ScanDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left-to-right" => Ok(ScanDirection::LeftToRight),
            "right-to-left" => Ok(ScanDirection::RightToLeft),
            "top-to-bottom" => Ok(ScanDirection::TopToBottom),
            "bottom-to-top" => Ok(ScanDirection::BottomToTop),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// A clipped row.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub line: Line,
    /// Where traversal starts for the chosen scan direction.
    pub first: bool,
}

/// Clip one row to the area.
///
/// Returns the kept pieces in order along the row.
pub fn clip_line(line: &Line, area: &MultiPolygon) -> Vec<Line> {
    let points = line.points.as_slice();
    if points.len() < 2 {
        return Vec::new();
    }

    let cuts = boundary_cuts(points, area);
    if cuts.is_empty() {
        // Never crosses the boundary: wholly inside or wholly outside.
        return match midpoint(points) {
            Some(mid) if point_in_multi_polygon(mid, area) => vec![line.clone()],
            _ => Vec::new(),
        };
    }

    // ## Rust Lesson #14: Iterators & Collecting
    //
    // .filter() keeps what we want, .map() converts the survivors, and
    // .collect() gathers the results into a Vec.
    split_at(points, &cuts)
        .into_iter()
        .filter(|piece| piece.len() >= 2 && geodesy::length(piece) > 0.0)
        .filter(|piece| midpoint(piece).is_some_and(|mid| point_in_multi_polygon(mid, area)))
        .map(Line::new)
        .collect()
}

/// Clip every row to the area and mark the first segment for `direction`.
///
/// Empty rows or a zero-area polygon give an empty result.
pub fn clip_rows(lines: &[Line], area: &MultiPolygon, direction: ScanDirection) -> Vec<Segment> {
    if lines.is_empty() || area.area() <= 0.0 {
        log::debug!("nothing to clip ({} rows, area {})", lines.len(), area.area());
        return Vec::new();
    }

    // ## Rust Lesson #16: flat_map
    //
    // For each input row we get 0 or more output pieces.
    // flat_map flattens: [[a,b], [c], [d,e,f]] -> [a,b,c,d,e,f]
    let mut segments: Vec<Segment> = lines
        .iter()
        .flat_map(|line| clip_line(line, area))
        .map(|line| Segment { line, first: false })
        .collect();

    let first = segments
        .iter()
        .enumerate()
        .filter_map(|(i, seg)| midpoint(&seg.line.points).map(|mid| (i, direction.rank(mid))))
        .fold(None, |best: Option<(usize, f64)>, (i, rank)| match best {
            Some((_, best_rank)) if best_rank <= rank => best,
            _ => Some((i, rank)),
        });

    if let Some((i, _)) = first {
        segments[i].first = true;
    }

    log::debug!("clipped {} rows into {} segments", lines.len(), segments.len());
    segments
}

// ============================================================================
// TESTS
// ============================================================================
