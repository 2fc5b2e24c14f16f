//! Shared geometry utilities: lattice points and point/segment math.

use std::f64::consts::PI;

use kurbo::{Point, Vec2};

/// Integer point on the pixel grid. `up` is +y, `right` is +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        GridPoint { x, y }
    }

    pub const fn up(self) -> Self {
        GridPoint::new(self.x, self.y + 1)
    }

    pub const fn down(self) -> Self {
        GridPoint::new(self.x, self.y - 1)
    }

    pub const fn left(self) -> Self {
        GridPoint::new(self.x - 1, self.y)
    }

    pub const fn right(self) -> Self {
        GridPoint::new(self.x + 1, self.y)
    }

    /// The four 4-connected neighbours, in up/left/down/right order.
    pub const fn neighbors(self) -> [GridPoint; 4] {
        [self.up(), self.left(), self.down(), self.right()]
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }
}

/// Point operations the tracer needs that kurbo does not provide.
pub trait PointExt {
    /// Angle in `[0, π]` between the vectors `a - self` and `b - self`,
    /// with `self` as the vertex. A straight run gives π, a hairpin 0.
    /// Degenerate (zero-length) vectors count as straight.
    fn angle_between(self, a: Point, b: Point) -> f64;

    /// Scale about `origin`.
    fn scaled(self, factor: f64, origin: Point) -> Point;
}

impl PointExt for Point {
    fn angle_between(self, a: Point, b: Point) -> f64 {
        let u = a - self;
        let v = b - self;
        if u.hypot2() == 0.0 || v.hypot2() == 0.0 {
            return PI;
        }
        u.cross(v).abs().atan2(u.dot(v))
    }

    fn scaled(self, factor: f64, origin: Point) -> Point {
        origin + (self - origin) * factor
    }
}

/// Mean of a set of points. Empty input gives the origin.
pub fn average(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    let sum = points
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / points.len() as f64).to_point()
}

/// Signed curvature of the circle through `a`, `b`, `c`.
///
/// Positive for a counter-clockwise (left) turn, negative for clockwise,
/// zero for collinear or coincident points.
pub fn signed_curvature(a: Point, b: Point, c: Point) -> f64 {
    let ab = b - a;
    let bc = c - b;
    let denom = ab.hypot() * bc.hypot() * (c - a).hypot();
    if denom < 1e-12 {
        return 0.0;
    }
    2.0 * ab.cross(bc) / denom
}

/// Closest distance from `p` to the segment `l1`–`l2`.
pub fn dist_to_segment(l1: Point, l2: Point, p: Point) -> f64 {
    let ab = l2 - l1;
    if ab.dot(p - l2) > 0.0 {
        return p.distance(l2);
    }
    if ab.dot(p - l1) < 0.0 {
        return p.distance(l1);
    }
    let len = ab.hypot();
    if len == 0.0 {
        return p.distance(l1);
    }
    ab.cross(p - l1).abs() / len
}

/// Closest distance from `p` to an open polyline.
/// A single-point polyline degenerates to point distance.
pub fn dist_to_polyline(polyline: &[Point], p: Point) -> f64 {
    match polyline.len() {
        0 => f64::INFINITY,
        1 => p.distance(polyline[0]),
        _ => polyline
            .windows(2)
            .map(|w| dist_to_segment(w[0], w[1], p))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Centered moving average. The window is clamped at both ends.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            values[lo..hi].iter().sum::<f64>() / (hi - lo) as f64
        })
        .collect()
}

/// Wrap an angle difference into `[-π, π]`.
pub fn wrap_angle(a: f64) -> f64 {
    let mut a = a % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_moves_are_unit_steps() {
        let p = GridPoint::new(3, 4);
        assert_eq!(p.up(), GridPoint::new(3, 5));
        assert_eq!(p.down(), GridPoint::new(3, 3));
        assert_eq!(p.left(), GridPoint::new(2, 4));
        assert_eq!(p.right(), GridPoint::new(4, 4));
    }

    #[test]
    fn angle_between_straight_and_right_angle() {
        let v = Point::new(0.0, 0.0);
        let straight = v.angle_between(Point::new(-1.0, 0.0), Point::new(2.0, 0.0));
        assert!((straight - PI).abs() < 1e-12);
        let right = v.angle_between(Point::new(-1.0, 0.0), Point::new(0.0, 3.0));
        assert!((right - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn segment_distance_cases() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(4.0, 0.0);
        assert_eq!(dist_to_segment(a, b, Point::new(2.0, 3.0)), 3.0);
        assert_eq!(dist_to_segment(a, b, Point::new(7.0, 4.0)), 5.0);
        assert_eq!(dist_to_segment(a, b, Point::new(-3.0, -4.0)), 5.0);
    }

    #[test]
    fn curvature_sign_follows_turn() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert!(signed_curvature(a, b, Point::new(1.0, 1.0)) > 0.0);
        assert!(signed_curvature(a, b, Point::new(1.0, -1.0)) < 0.0);
        assert_eq!(signed_curvature(a, b, Point::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn rolling_average_clamps_window() {
        let avg = rolling_average(&[0.0, 3.0, 6.0, 9.0], 3);
        assert_eq!(avg, vec![1.5, 3.0, 6.0, 7.5]);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        assert!((wrap_angle(1.5 * PI) + 0.5 * PI).abs() < 1e-12);
        assert!((wrap_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-12);
    }
}
