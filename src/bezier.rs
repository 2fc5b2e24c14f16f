//! Cubic Bézier segments and least-error fitting of their handles.

use kurbo::{CubicBez, Point};

use crate::config::TracingConfig;
use crate::error::Result;
use crate::geom::{dist_to_polyline, dist_to_segment, wrap_angle, PointExt};
use crate::solver::{HillClimbSolver, Solver};

/// Parameters for fitting a curve's handles to samples.
#[derive(Debug, Clone, Copy)]
pub struct FitParams {
    /// Max angular deviation (radians) of any sample from the chord for
    /// the samples to count as a straight line.
    pub collinear_tolerance: f64,
    /// Number of linear sub-segments a candidate curve is split into
    /// when measuring error.
    pub rmse_samples: usize,
    pub solver: HillClimbSolver,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            collinear_tolerance: 0.03125,
            rmse_samples: 16,
            solver: HillClimbSolver::for_fitting(),
        }
    }
}

impl FitParams {
    /// Derive fitting parameters from a config. Fails if the solver
    /// precision is not positive.
    pub fn from_config(config: &TracingConfig) -> Result<Self> {
        Ok(Self {
            collinear_tolerance: config.collinear_tolerance,
            rmse_samples: config.rmse_samples.max(1),
            solver: HillClimbSolver::new(config.solver_precision, config.solver_iterations)?,
        })
    }
}

/// A cubic Bézier segment: start point, two handles, end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierCurve {
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
    pub p4: Point,
}

impl BezierCurve {
    pub const fn new(p1: Point, p2: Point, p3: Point, p4: Point) -> Self {
        BezierCurve { p1, p2, p3, p4 }
    }

    /// Straight segment: handles collapsed onto the endpoints.
    pub const fn line(p1: Point, p4: Point) -> Self {
        BezierCurve::new(p1, p1, p4, p4)
    }

    /// True when both handles sit on their endpoints.
    pub fn is_line(&self) -> bool {
        self.p1 == self.p2 && self.p3 == self.p4
    }

    /// Evaluate at `t` in [0, 1]. Exact at both ends.
    pub fn f(&self, t: f64) -> Point {
        if t == 0.0 {
            return self.p1;
        }
        if t == 1.0 {
            return self.p4;
        }
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point::new(
            a * self.p1.x + b * self.p2.x + c * self.p3.x + d * self.p4.x,
            a * self.p1.y + b * self.p2.y + c * self.p3.y + d * self.p4.y,
        )
    }

    /// `count` points evenly spaced in t, first and last exactly on the
    /// endpoints.
    pub fn make_points(&self, count: usize) -> Vec<Point> {
        match count {
            0 => Vec::new(),
            1 => vec![self.p1],
            _ => {
                let last = (count - 1) as f64;
                (0..count).map(|i| self.f(i as f64 / last)).collect()
            }
        }
    }

    /// Return a copy with P2 and P3 fitted to `points`; P1 and P4 stay.
    ///
    /// Two or fewer samples, or samples all lying along the chord, give a
    /// straight line. Otherwise the handles are searched with the solver,
    /// starting from this curve's handles.
    pub fn fit_to_points(&self, points: &[Point], params: &FitParams) -> BezierCurve {
        let (first, last) = match (points.first(), points.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return *self,
        };
        if points.len() <= 2 || is_collinear(points, params.collinear_tolerance) {
            return BezierCurve::new(self.p1, first, last, self.p4);
        }

        let (p1, p4) = (self.p1, self.p4);
        let initial = [self.p2.x, self.p2.y, self.p3.x, self.p3.y];
        let best = params.solver.minimize(
            |v| {
                let candidate =
                    BezierCurve::new(p1, Point::new(v[0], v[1]), Point::new(v[2], v[3]), p4);
                candidate.fit_error(points, params.rmse_samples)
            },
            &initial,
        );
        BezierCurve::new(p1, Point::new(best[0], best[1]), Point::new(best[2], best[3]), p4)
    }

    /// Symmetric mean distance between this curve and `points`, with the
    /// default sampling.
    pub fn rmse(&self, points: &[Point]) -> f64 {
        self.fit_error(points, FitParams::default().rmse_samples)
    }

    /// Symmetric mean distance, curve split into `segments` pieces.
    ///
    /// Sums each sample's distance to the curve polyline and each curve
    /// point's distance to the sample polyline, divided by the total
    /// count. Empty input has zero error.
    pub(crate) fn fit_error(&self, points: &[Point], segments: usize) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let curve = self.make_points(segments.max(1) + 1);
        let to_curve: f64 = points
            .iter()
            .map(|&p| {
                curve
                    .windows(2)
                    .map(|w| dist_to_segment(w[0], w[1], p))
                    .fold(f64::INFINITY, f64::min)
            })
            .sum();
        let to_samples: f64 = curve.iter().map(|&c| dist_to_polyline(points, c)).sum();
        (to_curve + to_samples) / (points.len() + curve.len()) as f64
    }

    /// Scale all four points about `origin`.
    pub fn scaled(&self, factor: f64, origin: Point) -> BezierCurve {
        BezierCurve::new(
            self.p1.scaled(factor, origin),
            self.p2.scaled(factor, origin),
            self.p3.scaled(factor, origin),
            self.p4.scaled(factor, origin),
        )
    }

    pub fn to_cubic(&self) -> CubicBez {
        CubicBez::new(self.p1, self.p2, self.p3, self.p4)
    }
}

impl From<CubicBez> for BezierCurve {
    fn from(c: CubicBez) -> Self {
        BezierCurve::new(c.p0, c.p1, c.p2, c.p3)
    }
}

impl From<BezierCurve> for CubicBez {
    fn from(b: BezierCurve) -> Self {
        b.to_cubic()
    }
}

/// Every sample's direction from the first deviates from the chord
/// direction by at most `tolerance`. Samples on top of the first one are
/// ignored.
fn is_collinear(points: &[Point], tolerance: f64) -> bool {
    let origin = points[0];
    let chord = points[points.len() - 1] - origin;
    let theta = chord.y.atan2(chord.x);
    points[1..].iter().all(|&p| {
        let v = p - origin;
        v.hypot2() == 0.0 || wrap_angle(v.y.atan2(v.x) - theta).abs() <= tolerance
    })
}
