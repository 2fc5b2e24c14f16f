//! Adaptive segmentation: point path → smoothed cubic Béziers.
//!
//! 1. Pick breakpoints at sharp turns, curvature minima, and at least
//!    every quarter of the path length
//! 2. Fit one cubic per breakpoint span
//! 3. Re-optimize nearly-smooth joints so the tangent is continuous
//! 4. Merge runs of collinear straight segments

use std::f64::consts::PI;

use kurbo::{Point, Vec2};

use crate::bezier::{BezierCurve, FitParams};
use crate::config::TracingConfig;
use crate::error::{Result, TraceError};
use crate::geom::{average, rolling_average, signed_curvature, PointExt};
use crate::shape::Shape;
use crate::solver::Solver;

/// Paths this short skip corner detection and are split into quarters.
const SMALL_PATH: usize = 16;

/// Relative cross-product tolerance for merging straight segments.
const COLLINEAR_EPS: f64 = 1e-9;

/// Parameters for adaptive segmentation.
#[derive(Debug, Clone, Copy)]
pub struct SegmentParams {
    /// Half-width of the averaging window, in samples.
    pub window: usize,
    /// Turning angles below this (radians) are corners. Default: 0.75π.
    pub corner_angle: f64,
    /// Joints flatter than this (radians) get smoothed. Default: 0.75π.
    pub smooth_angle: f64,
    /// Rolling-average window for the curvature signal. Default: 7.
    pub curvature_window: usize,
    pub fit: FitParams,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            window: 5,
            corner_angle: 0.75 * PI,
            smooth_angle: 0.75 * PI,
            curvature_window: 7,
            fit: FitParams::default(),
        }
    }
}

impl SegmentParams {
    pub fn from_config(config: &TracingConfig) -> Result<Self> {
        Ok(Self {
            window: config.fitting_window.max(1),
            corner_angle: config.corner_angle,
            smooth_angle: config.smooth_angle,
            curvature_window: config.curvature_window.max(1),
            fit: FitParams::from_config(config)?,
        })
    }
}

/// Converts a closed or open point path into a shape of fitted curves,
/// placing breakpoints from the path's own geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolylineSegmenter {
    params: SegmentParams,
}

impl PolylineSegmenter {
    pub fn new(params: SegmentParams) -> Self {
        PolylineSegmenter { params }
    }

    pub fn params(&self) -> &SegmentParams {
        &self.params
    }

    /// Segment `points` into a shape with color 0.
    ///
    /// Closed paths need at least 3 points, open paths 2.
    pub fn segment(&self, points: &[Point], closed: bool) -> Result<Shape> {
        check_path_len(points, closed)?;
        let n = points.len();
        let nodes = breakpoints(points, closed, &self.params);
        log::trace!("{} points, breakpoints {:?}", n, nodes);

        // Fit each span between consecutive breakpoints.
        let mut spans: Vec<Vec<Point>> = Vec::with_capacity(nodes.len());
        let mut curves: Vec<BezierCurve> = Vec::with_capacity(nodes.len());
        for pair in nodes.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            // A closing span ends back at index 0.
            let end_i = if end == 0 { n } else { end };
            let samples: Vec<Point> = (start..=end_i).map(|k| points[k % n]).collect();
            let seed = BezierCurve::new(
                points[start],
                points[(start + 1) % n],
                points[(end + n - 1) % n],
                points[end],
            );
            curves.push(seed.fit_to_points(&samples, &self.params.fit));
            spans.push(samples);
        }

        smooth_joints(&mut curves, &spans, closed, &self.params);
        let before = curves.len();
        let curves = merge_collinear_lines(curves);
        if curves.len() != before {
            log::trace!("merged {} collinear segments", before - curves.len());
        }
        Ok(Shape::new(curves, 0, closed))
    }
}

/// Validate the minimum point count for a path.
pub(crate) fn check_path_len(points: &[Point], closed: bool) -> Result<()> {
    let (required, kind) = if closed { (3, "closed") } else { (2, "open") };
    if points.len() < required {
        return Err(TraceError::TooFewPoints {
            required,
            actual: points.len(),
            kind,
        });
    }
    Ok(())
}

// ── Breakpoints ──────────────────────────────────────────

/// Sorted, de-duplicated breakpoint indices. The last entry is the final
/// index for open paths, or 0 again for closed ones.
fn breakpoints(points: &[Point], closed: bool, params: &SegmentParams) -> Vec<usize> {
    let n = points.len();
    let mut nodes = vec![0];
    if n <= SMALL_PATH {
        nodes.extend([n / 4, n / 2, 3 * n / 4]);
    } else {
        let w = params.window;
        let quarter = (n / 4).max(1);
        // Sharp turn = small angle. History starts out straight.
        let (mut before_last, mut last) = (PI, PI);
        let mut curvature = vec![0.0; n];

        for i in 1..n - 2 {
            let lo = i.saturating_sub(w);
            let hi = (i + w).min(n);
            let pre = average(&points[lo..i]);
            let post = average(&points[i + 1..hi]);
            let whole = average(&points[lo..hi]);
            let angle = points[i].angle_between(pre, post);
            curvature[i] = signed_curvature(pre, whole, post);

            let last_node = nodes.last().copied().unwrap_or(0);
            if i - last_node >= quarter {
                nodes.push(i);
            } else if angle < params.corner_angle && angle > last && last < before_last {
                // The turn peaked at the previous sample.
                nodes.push(i - 1);
            }
            before_last = last;
            last = angle;
        }

        // Strict two-sided minima of the smoothed signed curvature.
        let c = rolling_average(&curvature, params.curvature_window);
        for i in 2..n - 2 {
            if c[i] < c[i - 1] && c[i - 1] < c[i - 2] && c[i] < c[i + 1] && c[i + 1] < c[i + 2] {
                nodes.push(i);
            }
        }
        nodes.sort_unstable();
    }
    nodes.push(if closed { 0 } else { n - 1 });
    nodes.dedup();
    nodes
}

// ── Joint smoothing ──────────────────────────────────────

/// The point the outgoing tangent at P4 aims away from. Collapsed handles
/// fall back to the far handle, then to P1.
fn tangent_before(c: &BezierCurve) -> Point {
    if c.p3 != c.p4 {
        c.p3
    } else if c.p2 != c.p4 {
        c.p2
    } else {
        c.p1
    }
}

/// The point the incoming tangent at P1 aims toward.
fn tangent_after(c: &BezierCurve) -> Point {
    if c.p2 != c.p1 {
        c.p2
    } else if c.p3 != c.p1 {
        c.p3
    } else {
        c.p4
    }
}

/// Re-optimize every nearly-smooth joint. Closed shapes include the
/// joint between the last and first segment.
fn smooth_joints(
    curves: &mut [BezierCurve],
    spans: &[Vec<Point>],
    closed: bool,
    params: &SegmentParams,
) {
    let m = curves.len();
    if m < 2 {
        return;
    }
    let joints = if closed { m } else { m - 1 };
    let mut smoothed = 0;
    for j in 0..joints {
        let k = (j + 1) % m;
        let (curr, next) = (curves[j], curves[k]);
        let angle = curr.p4.angle_between(tangent_before(&curr), tangent_after(&next));
        if angle <= params.smooth_angle || lines_are_collinear(&curr, &next) {
            continue;
        }
        let (a, b) = smooth_joint(&curr, &next, &spans[j], &spans[k], &params.fit);
        curves[j] = a;
        curves[k] = b;
        smoothed += 1;
    }
    if smoothed > 0 {
        log::trace!("smoothed {} of {} joints", smoothed, joints);
    }
}

/// Fit both handles at the shared point as one tangent direction θ plus
/// two lengths, minimizing the summed error of both segments.
fn smooth_joint(
    curr: &BezierCurve,
    next: &BezierCurve,
    curr_samples: &[Point],
    next_samples: &[Point],
    fit: &FitParams,
) -> (BezierCurve, BezierCurve) {
    let joint = curr.p4;
    let chord = tangent_after(next) - tangent_before(curr);
    let initial = [
        chord.y.atan2(chord.x),
        -curr.p3.distance(curr.p4),
        next.p2.distance(next.p1),
    ];
    let build = |v: &[f64]| {
        let dir = Vec2::new(v[0].cos(), v[0].sin());
        (
            BezierCurve::new(curr.p1, curr.p2, joint + dir * v[1], joint),
            BezierCurve::new(joint, joint + dir * v[2], next.p3, next.p4),
        )
    };
    let best = fit.solver.minimize(
        |v| {
            let (a, b) = build(v);
            a.fit_error(curr_samples, fit.rmse_samples) + b.fit_error(next_samples, fit.rmse_samples)
        },
        &initial,
    );
    build(&best)
}

// ── Collinear merge ──────────────────────────────────────

/// Two straight segments that continue in the same direction.
fn lines_are_collinear(a: &BezierCurve, b: &BezierCurve) -> bool {
    if !a.is_line() || !b.is_line() {
        return false;
    }
    let u = a.p4 - a.p1;
    let v = b.p4 - b.p1;
    let scale = u.hypot() * v.hypot();
    scale > 0.0 && u.cross(v).abs() <= COLLINEAR_EPS * scale && u.dot(v) > 0.0
}

/// Merge consecutive collinear straight segments. The closing joint of a
/// closed shape is left alone so the start point stays put.
fn merge_collinear_lines(curves: Vec<BezierCurve>) -> Vec<BezierCurve> {
    let mut out: Vec<BezierCurve> = Vec::with_capacity(curves.len());
    for c in curves {
        if let Some(prev) = out.last_mut() {
            if lines_are_collinear(prev, &c) {
                *prev = BezierCurve::line(prev.p1, c.p4);
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(n: usize, r: f64) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * 2.0 * PI;
                Point::new(r * t.cos(), r * t.sin())
            })
            .collect()
    }

    #[test]
    fn too_few_points_is_an_error() {
        let seg = PolylineSegmenter::default();
        let two = [Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        assert!(matches!(
            seg.segment(&two, true),
            Err(TraceError::TooFewPoints { required: 3, actual: 2, .. })
        ));
        assert!(seg.segment(&two[..1], false).is_err());
        let open = seg.segment(&two, false).unwrap();
        assert_eq!(open.len(), 1);
        assert!(open.curves[0].is_line());
    }

    #[test]
    fn small_paths_split_into_quarters() {
        let pts = circle(12, 5.0);
        assert_eq!(breakpoints(&pts, true, &SegmentParams::default()), vec![0, 3, 6, 9, 0]);
        assert_eq!(breakpoints(&pts, false, &SegmentParams::default()), vec![0, 3, 6, 9, 11]);
        // Tiny paths collapse duplicate indices.
        let tri = circle(3, 1.0);
        assert_eq!(breakpoints(&tri, true, &SegmentParams::default()), vec![0, 1, 2, 0]);
    }

    #[test]
    fn long_paths_break_at_least_every_quarter() {
        let pts = circle(80, 20.0);
        let nodes = breakpoints(&pts, true, &SegmentParams::default());
        assert_eq!(nodes[0], 0);
        assert_eq!(*nodes.last().unwrap(), 0);
        for w in nodes[..nodes.len() - 1].windows(2) {
            assert!(w[1] > w[0], "unsorted: {nodes:?}");
            assert!(w[1] - w[0] <= 20, "gap too long: {nodes:?}");
        }
    }

    #[test]
    fn rectangle_corners_become_breakpoints() {
        // 14 x 6 rectangle, one sample per unit, counter-clockwise from
        // the origin. Corners sit at indices 14, 20 and 34.
        let mut pts = Vec::new();
        pts.extend((0..14).map(|i| Point::new(i as f64, 0.0)));
        pts.extend((0..6).map(|j| Point::new(14.0, j as f64)));
        pts.extend((0..14).map(|i| Point::new(14.0 - i as f64, 6.0)));
        pts.extend((0..6).map(|j| Point::new(0.0, 6.0 - j as f64)));
        assert_eq!(pts.len(), 40);
        let nodes = breakpoints(&pts, true, &SegmentParams::default());
        for corner in [14, 20, 34] {
            assert!(nodes.contains(&corner), "corner {corner} missing from {nodes:?}");
        }
    }

    #[test]
    fn curvature_minimum_adds_breakpoint() {
        // Sample-dense S-curve along y = sin(x). Forced breakpoints land at
        // 50, 100 and 150; the sharpest clockwise bend (x = π/2) is at 75.
        let pts: Vec<Point> = (0..200)
            .map(|i| {
                let x = 0.04 * i as f64 - 1.43;
                Point::new(x, x.sin())
            })
            .collect();
        let nodes = breakpoints(&pts, false, &SegmentParams::default());
        for forced in [50, 100, 150] {
            assert!(nodes.contains(&forced), "{nodes:?}");
        }
        assert!(
            nodes.iter().any(|k| (72..=78).contains(k)),
            "no breakpoint near the bend: {nodes:?}"
        );
    }

    fn arc(from: f64, to: f64, n: usize) -> Vec<Point> {
        (0..=n)
            .map(|i| {
                let t = from + (to - from) * i as f64 / n as f64;
                Point::new(10.0 * t.cos(), 10.0 * t.sin())
            })
            .collect()
    }

    fn summed_error(curves: &[BezierCurve], spans: &[Vec<Point>]) -> f64 {
        curves
            .iter()
            .zip(spans)
            .map(|(c, s)| c.fit_error(s, 16))
            .sum()
    }

    #[test]
    fn kinked_joint_gets_one_tangent() {
        let joint = Point::new(0.0, 10.0);
        let mut curves = vec![
            BezierCurve::new(Point::new(10.0, 0.0), Point::new(10.0, 4.0), Point::new(3.0, 11.0), joint),
            BezierCurve::new(joint, Point::new(-4.0, 10.0), Point::new(-10.0, 4.0), Point::new(-10.0, 0.0)),
        ];
        let spans = vec![arc(0.0, PI / 2.0, 8), arc(PI / 2.0, PI, 8)];
        let params = SegmentParams::default();
        let angle = joint.angle_between(curves[0].p3, curves[1].p2);
        assert!(angle > params.smooth_angle && angle < PI);

        smooth_joints(&mut curves, &spans, false, &params);
        let (a, b) = (curves[0], curves[1]);
        assert_eq!(a.p4, joint);
        assert_eq!(b.p1, joint);
        assert_eq!(a.p1, Point::new(10.0, 0.0));
        assert_eq!(b.p4, Point::new(-10.0, 0.0));

        let u = a.p3 - joint;
        let v = b.p2 - joint;
        assert!(u.cross(v).abs() <= 1e-9 * u.hypot() * v.hypot(), "{u:?} {v:?}");
        assert!(u.dot(v) < 0.0, "handles on the same side: {u:?} {v:?}");
    }

    #[test]
    fn smoothing_never_worsens_an_aligned_joint() {
        // Tangent already continuous but handles too short for the arc.
        let joint = Point::new(0.0, 10.0);
        let mut curves = vec![
            BezierCurve::new(Point::new(10.0, 0.0), Point::new(10.0, 2.0), Point::new(2.0, 10.0), joint),
            BezierCurve::new(joint, Point::new(-2.0, 10.0), Point::new(-10.0, 2.0), Point::new(-10.0, 0.0)),
        ];
        let spans = vec![arc(0.0, PI / 2.0, 8), arc(PI / 2.0, PI, 8)];
        let before = summed_error(&curves, &spans);

        smooth_joints(&mut curves, &spans, false, &SegmentParams::default());
        let after = summed_error(&curves, &spans);
        assert!(after <= before + 1e-12, "error rose from {before} to {after}");

        let u = curves[0].p3 - joint;
        let v = curves[1].p2 - joint;
        assert!(u.cross(v).abs() <= 1e-9 * u.hypot() * v.hypot());
        assert!(u.dot(v) < 0.0);
    }

    #[test]
    fn collinear_lines_are_not_smoothed() {
        let a = BezierCurve::line(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        let b = BezierCurve::line(Point::new(1.0, 0.0), Point::new(3.0, 0.0));
        let spans = vec![
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            vec![Point::new(1.0, 0.0), Point::new(3.0, 0.0)],
        ];
        let mut curves = vec![a, b];
        smooth_joints(&mut curves, &spans, false, &SegmentParams::default());
        assert_eq!(curves, vec![a, b]);
    }

    #[test]
    fn closed_shape_is_continuous() {
        let pts = circle(60, 15.0);
        let shape = PolylineSegmenter::default().segment(&pts, true).unwrap();
        assert!(shape.closed);
        assert!(shape.len() >= 4);
        for w in shape.curves.windows(2) {
            assert_eq!(w[0].p4, w[1].p1);
        }
        assert_eq!(shape.curves.last().unwrap().p4, shape.curves[0].p1);
        assert_eq!(shape.curves[0].p1, pts[0]);
    }

    #[test]
    fn circle_fit_stays_close() {
        let pts = circle(60, 15.0);
        let shape = PolylineSegmenter::default().segment(&pts, true).unwrap();
        for c in &shape.curves {
            for p in c.make_points(9) {
                let r = p.distance(Point::ZERO);
                assert!((r - 15.0).abs() < 1.5, "sample {p:?} at radius {r}");
            }
        }
    }

    #[test]
    fn collinear_open_path_is_one_line() {
        let pts: Vec<Point> = (0..20).map(|i| Point::new(i as f64, 2.0 * i as f64)).collect();
        let shape = PolylineSegmenter::default().segment(&pts, false).unwrap();
        assert_eq!(shape.len(), 1, "{:?}", shape.curves);
        assert_eq!(shape.curves[0], BezierCurve::line(pts[0], pts[19]));
    }

    #[test]
    fn merge_keeps_turns_and_reversals() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(2.0, 0.0);
        let d = Point::new(2.0, 1.0);
        let merged = merge_collinear_lines(vec![
            BezierCurve::line(a, b),
            BezierCurve::line(b, c),
            BezierCurve::line(c, d),
            BezierCurve::line(d, c),
        ]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], BezierCurve::line(a, c));
    }

    #[test]
    fn degenerate_handles_fall_back() {
        let line = BezierCurve::line(Point::new(0.0, 0.0), Point::new(3.0, 0.0));
        assert_eq!(tangent_before(&line), Point::new(0.0, 0.0));
        assert_eq!(tangent_after(&line), Point::new(3.0, 0.0));
    }
}
