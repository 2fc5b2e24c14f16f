use kurbo::{BezPath, Point};

use crate::bezier::BezierCurve;

/// A traced outline: consecutive Bézier segments plus the raster value of
/// the region they enclose.
///
/// When `closed` and non-empty, the last segment ends where the first
/// begins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    pub curves: Vec<BezierCurve>,
    pub color: i32,
    pub closed: bool,
}

impl Shape {
    pub fn new(curves: Vec<BezierCurve>, color: i32, closed: bool) -> Self {
        Shape {
            curves,
            color,
            closed,
        }
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Scale every curve about `origin`, in place.
    pub fn scale(&mut self, factor: f64, origin: Point) {
        for c in &mut self.curves {
            *c = c.scaled(factor, origin);
        }
    }

    /// Convert to a kurbo path. Straight segments become `LineTo`; closed
    /// shapes end with `ClosePath`.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.curves.first() else {
            return path;
        };
        path.move_to(first.p1);
        for c in &self.curves {
            if c.is_line() {
                path.line_to(c.p4);
            } else {
                path.curve_to(c.p2, c.p3, c.p4);
            }
        }
        if self.closed {
            path.close_path();
        }
        path
    }

    /// SVG path `d` attribute for this shape.
    pub fn svg_path_data(&self) -> String {
        self.to_bezpath().to_svg()
    }
}
