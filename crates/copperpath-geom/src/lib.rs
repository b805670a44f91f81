//! Integer plane geometry for interactive track routing.
//!
//! Coordinates are board internal units stored as `i32`. Dot products, cross
//! products and squared lengths are widened to `i64` so they never overflow
//! for on-board coordinates; anything involving a square root is done in
//! `f64` and rounded back to the grid only where a [`Point`] is produced.
//!
//! The functions here are pure. They back the router's angle snapping, hit
//! testing and clearance push-out.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Threshold, in 1/64ths, for the minor/major offset ratio below which a
/// cursor offset snaps onto an axis. 26/64 is close to tan(22.5°).
pub const SNAP_AXIS_RATIO: i64 = 26;

/// A position (or displacement) on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Displacements share the representation of positions.
pub type Vector = Point;

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Narrow widened coordinates back to a point, saturating at the `i32`
    /// range.
    pub fn from_wide(x: i64, y: i64) -> Self {
        let narrow = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        Self::new(narrow(x), narrow(y))
    }

    pub fn dot(self, other: Point) -> i64 {
        self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64
    }

    /// 2-D cross product `self.x * other.y - self.y * other.x`.
    pub fn cross(self, other: Point) -> i64 {
        self.x as i64 * other.y as i64 - self.y as i64 * other.x as i64
    }

    pub fn length_squared(self) -> i64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        (self.x as f64).hypot(self.y as f64)
    }

    pub fn is_zero(self) -> bool {
        self == Point::ZERO
    }

    /// True when the vector lies on the X or Y axis (the null vector counts).
    pub fn is_axis_aligned(self) -> bool {
        self.x == 0 || self.y == 0
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::from_wide(
            self.x as i64 + rhs.x as i64,
            self.y as i64 + rhs.y as i64,
        )
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::from_wide(
            self.x as i64 - rhs.x as i64,
            self.y as i64 - rhs.y as i64,
        )
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::from_wide(-(self.x as i64), -(self.y as i64))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

/// The three direction buckets produced by [`snap_angle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapAngle {
    /// 0°: the endpoint keeps the origin's Y.
    Horizontal,
    /// 45°: both offsets are forced to the smaller of the two.
    Diagonal,
    /// 90°: the endpoint keeps the origin's X.
    Vertical,
}

/// Classify the cursor offset from `origin` into a 0°, 45° or 90° bucket.
///
/// The axis wins when `(minor << 6) / major` is below [`SNAP_AXIS_RATIO`];
/// ties between the two offsets go to the horizontal axis.
pub fn snap_angle(origin: Point, cursor: Point) -> SnapAngle {
    let dx = (cursor.x as i64 - origin.x as i64).abs();
    let dy = (cursor.y as i64 - origin.y as i64).abs();

    if dx >= dy {
        if dx == 0 || (dy << 6) / dx < SNAP_AXIS_RATIO {
            SnapAngle::Horizontal
        } else {
            SnapAngle::Diagonal
        }
    } else if (dx << 6) / dy < SNAP_AXIS_RATIO {
        SnapAngle::Vertical
    } else {
        SnapAngle::Diagonal
    }
}

/// Endpoint for a segment starting at `origin`, constrained to 0°, 45° or
/// 90° and chosen from the cursor position.
pub fn snap_direction(origin: Point, cursor: Point) -> Point {
    match snap_angle(origin, cursor) {
        SnapAngle::Horizontal => Point::new(cursor.x, origin.y),
        SnapAngle::Vertical => Point::new(origin.x, cursor.y),
        SnapAngle::Diagonal => {
            let dx = cursor.x as i64 - origin.x as i64;
            let dy = cursor.y as i64 - origin.y as i64;
            let d = dx.abs().min(dy.abs());
            let sx = if dx < 0 { -d } else { d };
            let sy = if dy < 0 { -d } else { d };
            Point::from_wide(origin.x as i64 + sx, origin.y as i64 + sy)
        }
    }
}

/// Distance from `point` to the segment `a`-`b`, clamped to its endpoints.
pub fn point_segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = point - a;
    let len2 = ab.length_squared();

    if len2 == 0 {
        return ap.length();
    }

    let t = (ap.dot(ab) as f64 / len2 as f64).clamp(0.0, 1.0);
    let cx = a.x as f64 + t * ab.x as f64;
    let cy = a.y as f64 + t * ab.y as f64;
    (point.x as f64 - cx).hypot(point.y as f64 - cy)
}

/// True when `point` lies strictly closer than `tolerance` to the segment.
pub fn segment_hit_test(point: Point, seg_start: Point, seg_end: Point, tolerance: i32) -> bool {
    point_segment_distance(point, seg_start, seg_end) < tolerance as f64
}

/// True when the projection of `point` onto the line through `a`-`b` falls
/// between the two endpoints (inclusive).
pub fn projects_onto_interior(point: Point, a: Point, b: Point) -> bool {
    let pos = point - a;
    let vec = b - a;
    let along = pos.dot(vec);
    along >= 0 && along <= vec.length_squared()
}

/// Nearest grid point to `point` on the segment `a`-`b`.
pub fn project_onto_segment(point: Point, a: Point, b: Point) -> Point {
    let ab = b - a;
    let len2 = ab.length_squared();

    if len2 == 0 {
        return a;
    }

    let t = ((point - a).dot(ab) as f64 / len2 as f64).clamp(0.0, 1.0);
    Point::new(
        (a.x as f64 + t * ab.x as f64).round() as i32,
        (a.y as f64 + t * ab.y as f64).round() as i32,
    )
}

/// Vector of length `distance`, normal to the segment `seg_start`-`seg_end`
/// and pointing to the side `cursor` is on.
///
/// Returns [`Point::ZERO`] when the cursor is collinear with the segment,
/// since there is no side to push towards.
pub fn perpendicular_push_vector(
    cursor: Point,
    seg_start: Point,
    seg_end: Point,
    distance: i32,
) -> Vector {
    let cv = cursor - seg_start;
    let vec = seg_end - seg_start;
    let det = cv.cross(vec);

    if det == 0 {
        return Point::ZERO;
    }

    let (nx, ny) = if det > 0 {
        (vec.y as f64, -(vec.x as f64))
    } else {
        (-(vec.y as f64), vec.x as f64)
    };

    let f = distance as f64 / nx.hypot(ny);
    Point::new((f * nx).round() as i32, (f * ny).round() as i32)
}

fn orientation(a: Point, b: Point, c: Point) -> i64 {
    (b - a).cross(c - a)
}

fn on_segment(p: Point, a: Point, b: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// True when the closed segments `a1`-`a2` and `b1`-`b2` share a point.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0)) && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0))
    {
        return true;
    }

    (d1 == 0 && on_segment(a1, b1, b2))
        || (d2 == 0 && on_segment(a2, b1, b2))
        || (d3 == 0 && on_segment(b1, a1, a2))
        || (d4 == 0 && on_segment(b2, a1, a2))
}

/// Minimum distance between two closed segments; zero when they cross.
pub fn segment_segment_distance(a1: Point, a2: Point, b1: Point, b2: Point) -> f64 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }

    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

/// Even-odd point-in-polygon test. The outline is implicitly closed.
pub fn point_in_polygon(point: Point, outline: &[Point]) -> bool {
    if outline.len() < 3 {
        return false;
    }

    let px = point.x as f64;
    let py = point.y as f64;
    let mut inside = false;
    let mut j = outline.len() - 1;

    for i in 0..outline.len() {
        let (pi, pj) = (outline[i], outline[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) as f64 * (py - pi.y as f64) / (pj.y - pi.y) as f64
                + pi.x as f64;
            if px < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Axis-aligned rectangle with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_center_size(center: Point, width: i32, height: i32) -> Self {
        let half = Point::new(width / 2, height / 2);
        Self::new(center - half, center + half)
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn edges(&self) -> [(Point, Point); 4] {
        let tl = self.min;
        let tr = Point::new(self.max.x, self.min.y);
        let br = self.max;
        let bl = Point::new(self.min.x, self.max.y);
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
    }

    /// Distance from the segment to the rectangle's area; zero on overlap.
    pub fn distance_to_segment(&self, a: Point, b: Point) -> f64 {
        if self.contains(a) || self.contains(b) {
            return 0.0;
        }

        self.edges()
            .iter()
            .map(|&(e1, e2)| segment_segment_distance(a, b, e1, e2))
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn arithmetic_saturates_at_the_coordinate_range() {
        let far = p(i32::MAX, i32::MIN);
        assert_eq!(far + p(10, -10), far);
        assert_eq!(far - p(-10, 10), far);
        assert_eq!(-p(i32::MIN, 3), p(i32::MAX, -3));

        let mut q = p(i32::MAX - 1, 0);
        q += p(5, 1);
        assert_eq!(q, p(i32::MAX, 1));
        assert_eq!(p(-7, 4) - p(3, -6), p(-10, 10));
    }

    #[test]
    fn snap_small_offset_goes_horizontal() {
        assert_eq!(snap_direction(p(0, 0), p(100, 10)), p(100, 0));
        assert_eq!(snap_angle(p(0, 0), p(100, 10)), SnapAngle::Horizontal);
    }

    #[test]
    fn snap_steep_offset_goes_diagonal() {
        // (50 << 6) / 60 = 53, well above the axis threshold.
        assert_eq!(snap_direction(p(0, 0), p(50, 60)), p(50, 50));
    }

    #[test]
    fn snap_diagonal_follows_cursor_quadrant() {
        assert_eq!(snap_direction(p(10, 10), p(-50, 70)), p(-50, 70));
        assert_eq!(snap_direction(p(10, 10), p(-40, -30)), p(-30, -30));
        assert_eq!(snap_direction(p(0, 0), p(60, -50)), p(50, -50));
    }

    #[test]
    fn snap_vertical_keeps_origin_x() {
        assert_eq!(snap_direction(p(5, 5), p(9, 200)), p(5, 200));
        assert_eq!(snap_angle(p(5, 5), p(9, 200)), SnapAngle::Vertical);
    }

    #[test]
    fn snap_threshold_edges() {
        // 25/64 of the major offset stays on the axis, 26/64 does not.
        assert_eq!(snap_angle(p(0, 0), p(64, 25)), SnapAngle::Horizontal);
        assert_eq!(snap_angle(p(0, 0), p(64, 26)), SnapAngle::Diagonal);
        assert_eq!(snap_angle(p(0, 0), p(25, 64)), SnapAngle::Vertical);
        assert_eq!(snap_angle(p(0, 0), p(26, 64)), SnapAngle::Diagonal);
    }

    #[test]
    fn snap_on_origin_is_origin() {
        assert_eq!(snap_direction(p(7, -3), p(7, -3)), p(7, -3));
    }

    #[test]
    fn hit_test_clamps_to_endpoints() {
        let a = p(0, 0);
        let b = p(100, 0);
        assert!(segment_hit_test(p(50, 9), a, b, 10));
        assert!(!segment_hit_test(p(50, 10), a, b, 10));
        // Past the end the distance is measured to the endpoint.
        assert!(segment_hit_test(p(106, 6), a, b, 10));
        assert!(!segment_hit_test(p(108, 8), a, b, 10));
    }

    #[test]
    fn hit_test_on_degenerate_segment() {
        assert!(segment_hit_test(p(3, 4), p(0, 0), p(0, 0), 6));
        assert!(!segment_hit_test(p(3, 4), p(0, 0), p(0, 0), 5));
    }

    #[test]
    fn push_vector_points_to_cursor_side() {
        let a = p(0, 0);
        let b = p(100, 0);
        assert_eq!(perpendicular_push_vector(p(40, 3), a, b, 20), p(0, 20));
        assert_eq!(perpendicular_push_vector(p(40, -3), a, b, 20), p(0, -20));

        let v = perpendicular_push_vector(p(0, 10), a, p(100, 100), 100);
        assert_eq!(v, p(-71, 71));
    }

    #[test]
    fn push_vector_is_null_when_collinear() {
        assert_eq!(
            perpendicular_push_vector(p(50, 0), p(0, 0), p(100, 0), 20),
            Point::ZERO
        );
        assert_eq!(
            perpendicular_push_vector(p(300, 300), p(0, 0), p(100, 100), 20),
            Point::ZERO
        );
    }

    #[test]
    fn interior_projection() {
        let a = p(0, 0);
        let b = p(100, 0);
        assert!(projects_onto_interior(p(0, 50), a, b));
        assert!(projects_onto_interior(p(100, -50), a, b));
        assert!(!projects_onto_interior(p(-1, 0), a, b));
        assert!(!projects_onto_interior(p(101, 3), a, b));
    }

    #[test]
    fn projection_is_clamped_and_rounded() {
        assert_eq!(project_onto_segment(p(30, 40), p(0, 0), p(100, 0)), p(30, 0));
        assert_eq!(project_onto_segment(p(-30, 40), p(0, 0), p(100, 0)), p(0, 0));
        assert_eq!(project_onto_segment(p(0, 10), p(0, 0), p(10, 10)), p(5, 5));
    }

    #[test]
    fn crossing_segments_have_zero_distance() {
        assert!(segments_intersect(p(0, 0), p(10, 10), p(0, 10), p(10, 0)));
        assert_eq!(
            segment_segment_distance(p(0, 0), p(10, 10), p(0, 10), p(10, 0)),
            0.0
        );
    }

    #[test]
    fn parallel_segments_distance() {
        assert!(!segments_intersect(p(0, 0), p(100, 0), p(0, 30), p(100, 30)));
        assert_eq!(
            segment_segment_distance(p(0, 0), p(100, 0), p(0, 30), p(100, 30)),
            30.0
        );
        // Collinear and touching at an endpoint.
        assert!(segments_intersect(p(0, 0), p(10, 0), p(10, 0), p(20, 0)));
    }

    #[test]
    fn polygon_containment() {
        let square = [p(0, 0), p(100, 0), p(100, 100), p(0, 100)];
        assert!(point_in_polygon(p(50, 50), &square));
        assert!(!point_in_polygon(p(150, 50), &square));
        assert!(!point_in_polygon(p(50, 50), &square[..2]));
    }

    #[test]
    fn rect_segment_distance() {
        let r = Rect::from_center_size(p(0, 0), 20, 10);
        assert_eq!(r.min, p(-10, -5));
        assert_eq!(r.distance_to_segment(p(-50, 0), p(50, 0)), 0.0);
        assert_eq!(r.distance_to_segment(p(-50, 20), p(50, 20)), 15.0);
        assert_eq!(r.distance_to_segment(p(30, 0), p(40, 0)), 20.0);
    }
}
