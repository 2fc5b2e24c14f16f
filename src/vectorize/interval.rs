//! Fixed-density segmentation: one curve per `interval` path points.
//!
//! Cheaper and more predictable than the adaptive segmenter, but blind to
//! corners: a corner inside a span is rounded off.

use kurbo::Point;

use super::curve::check_path_len;
use crate::bezier::{BezierCurve, FitParams};
use crate::error::{Result, TraceError};
use crate::shape::Shape;

#[derive(Debug, Clone, Copy)]
pub struct IntervalSegmenter {
    interval: usize,
    fit: FitParams,
}

impl IntervalSegmenter {
    /// `interval` is the number of path points per curve; must be ≥ 1.
    pub fn new(interval: i32, fit: FitParams) -> Result<Self> {
        if interval < 1 {
            return Err(TraceError::InvalidInterval(interval));
        }
        Ok(IntervalSegmenter {
            interval: interval as usize,
            fit,
        })
    }

    /// Segment `points` into a shape with color 0.
    ///
    /// Spans of fewer than 3 points become straight lines. Longer spans
    /// are fitted to their interior points only, so each curve passes
    /// exactly through the span's end points.
    pub fn segment(&self, points: &[Point], closed: bool) -> Result<Shape> {
        check_path_len(points, closed)?;
        let n = points.len();
        let min_curves = if closed { 2 } else { 1 };
        let count = (n / self.interval).max(min_curves);
        let span = n / count + 1;
        // Closed spans end back at index n (== 0); open ones at n - 1.
        let last = if closed { n } else { n - 1 };

        let mut curves = Vec::with_capacity(count);
        let mut start = 0;
        while curves.len() < count && start < last {
            let end = (start + span).min(last);
            let curve = if end - start < 3 {
                BezierCurve::line(points[start], points[end % n])
            } else {
                let interior = &points[start + 1..end - 1];
                let seed = BezierCurve::new(
                    points[start],
                    interior[0],
                    interior[interior.len() - 1],
                    points[end % n],
                );
                seed.fit_to_points(interior, &self.fit)
            };
            curves.push(curve);
            start = end;
        }
        log::trace!("{} points in {} spans of {}", n, curves.len(), span);
        Ok(Shape::new(curves, 0, closed))
    }
}
