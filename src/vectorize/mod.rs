//! Vectorization pipeline: raster → colored Bézier shapes.
//!
//! 1. Scan the raster for the first unvisited cell of each region
//! 2. Walk the region's outer boundary on the pixel-corner grid
//! 3. Flood-fill the region so it is never scanned again
//! 4. Segment the boundary loop into fitted cubic curves

pub mod corner;
pub mod curve;
pub mod decompose;
pub mod interval;

use kurbo::Point;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{Segmentation, TracingConfig};
use crate::error::{Result, TraceError};
use crate::raster::{Raster, VisitedBitmap};
use crate::shape::Shape;

use curve::{PolylineSegmenter, SegmentParams};
use interval::IntervalSegmenter;

/// A configured segmentation strategy.
enum Segmenter {
    Adaptive(PolylineSegmenter),
    Interval(IntervalSegmenter),
}

impl Segmenter {
    /// Validate `config` and build the segmenter it selects.
    fn from_config(config: &TracingConfig) -> Result<Self> {
        if config.interval < 1 {
            return Err(TraceError::InvalidInterval(config.interval));
        }
        let params = SegmentParams::from_config(config)?;
        Ok(match config.segmentation {
            Segmentation::Adaptive => Segmenter::Adaptive(PolylineSegmenter::new(params)),
            Segmentation::Interval => {
                Segmenter::Interval(IntervalSegmenter::new(config.interval, params.fit)?)
            }
        })
    }

    fn segment(&self, points: &[Point], closed: bool) -> Result<Shape> {
        match self {
            Segmenter::Adaptive(s) => s.segment(points, closed),
            Segmenter::Interval(s) => s.segment(points, closed),
        }
    }
}

/// Fit a closed point loop. Fails if `interval < 1` or there are fewer
/// than 3 points.
pub fn trace_closed_path(points: &[Point], interval: i32) -> Result<Shape> {
    trace_path(points, true, &TracingConfig::with_interval(interval))
}

/// Fit an open point path. Fails if `interval < 1` or there are fewer
/// than 2 points.
pub fn trace_open_path(points: &[Point], interval: i32) -> Result<Shape> {
    trace_path(points, false, &TracingConfig::with_interval(interval))
}

/// Fit a point path with full control over the tracing parameters.
pub fn trace_path(points: &[Point], closed: bool, config: &TracingConfig) -> Result<Shape> {
    Segmenter::from_config(config)?.segment(points, closed)
}

/// Trace every 4-connected region of `raster` into a closed shape.
///
/// Shapes come back in scan order, which is also back-to-front paint
/// order: a region's outer boundary is found before any region it
/// encloses.
pub fn trace_all_shapes<R: Raster + ?Sized>(raster: &R, interval: i32) -> Result<Vec<Shape>> {
    trace_all_shapes_with(raster, &TracingConfig::with_interval(interval))
}

/// [`trace_all_shapes`] with explicit tracing parameters.
pub fn trace_all_shapes_with<R: Raster + ?Sized>(
    raster: &R,
    config: &TracingConfig,
) -> Result<Vec<Shape>> {
    let segmenter = Segmenter::from_config(config)?;
    let regions = extract_regions(raster, config.centered_scan)?;
    log::debug!(
        "{}x{} raster: {} regions",
        raster.width(),
        raster.height(),
        regions.len()
    );

    let fit = |(color, boundary): &(i32, Vec<Point>)| -> Result<Shape> {
        let mut shape = segmenter.segment(boundary, true)?;
        shape.color = *color;
        log::trace!(
            "region color {:#010x}: {} boundary points → {} curves",
            color,
            boundary.len(),
            shape.len()
        );
        Ok(shape)
    };

    #[cfg(feature = "parallel")]
    let shapes = regions.par_iter().map(fit).collect::<Result<Vec<_>>>()?;
    #[cfg(not(feature = "parallel"))]
    let shapes = regions.iter().map(fit).collect::<Result<Vec<_>>>()?;

    let curves: usize = shapes.iter().map(Shape::len).sum();
    log::debug!("{} shapes, {} curves", shapes.len(), curves);
    Ok(shapes)
}

/// Scan for regions and return each one's color and boundary loop, in
/// scan order.
fn extract_regions<R: Raster + ?Sized>(
    raster: &R,
    centered_scan: bool,
) -> Result<Vec<(i32, Vec<Point>)>> {
    let (w, h) = (raster.width(), raster.height());
    let mut visited = VisitedBitmap::new(w, h);
    let offset = if centered_scan { w / 2 } else { 0 };
    let mut regions = Vec::new();
    for y in 0..h {
        for tx in 0..w {
            let x = (tx + offset) % w;
            if visited.is_set(x, y) {
                continue;
            }
            let color = raster.get(x, y)?;
            let boundary = decompose::follow_edge(raster, x, y)?;
            let cells = decompose::flood_fill(raster, &mut visited, x, y)?;
            log::trace!(
                "region at ({}, {}): {} cells, {} boundary points",
                x,
                y,
                cells,
                boundary.len()
            );
            regions.push((color, boundary));
        }
    }
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::IntGrid;

    #[test]
    fn interval_is_validated() {
        let grid = IntGrid::new(2, 2);
        assert!(matches!(
            trace_all_shapes(&grid, 0),
            Err(TraceError::InvalidInterval(0))
        ));
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        assert!(trace_closed_path(&pts, -3).is_err());
        assert!(trace_open_path(&pts, 1).is_ok());
    }

    #[test]
    fn empty_raster_has_no_shapes() {
        let grid = IntGrid::new(0, 5);
        assert!(trace_all_shapes(&grid, 10).unwrap().is_empty());
    }

    #[test]
    fn uniform_raster_is_one_shape() {
        let grid = IntGrid::from_fn(6, 4, |_, _| 3);
        let shapes = trace_all_shapes(&grid, 10).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].color, 3);
        assert!(shapes[0].closed);
    }

    #[test]
    fn scan_order_is_paint_order() {
        // Two vertical bands; the band containing the scan start comes first.
        let grid = IntGrid::from_fn(6, 3, |x, _| (x >= 3) as i32);
        let centered = trace_all_shapes(&grid, 10).unwrap();
        assert_eq!(centered.iter().map(|s| s.color).collect::<Vec<_>>(), vec![1, 0]);

        let config = TracingConfig {
            centered_scan: false,
            ..TracingConfig::default()
        };
        let plain = trace_all_shapes_with(&grid, &config).unwrap();
        assert_eq!(plain.iter().map(|s| s.color).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn interval_segmentation_is_selectable() {
        let grid = IntGrid::from_fn(8, 8, |x, y| ((2..6).contains(&x) && (2..6).contains(&y)) as i32);
        let config = TracingConfig {
            segmentation: Segmentation::Interval,
            interval: 4,
            ..TracingConfig::default()
        };
        let shapes = trace_all_shapes_with(&grid, &config).unwrap();
        assert_eq!(shapes.len(), 2);
        // 16 boundary points, one curve per 4.
        assert_eq!(shapes[1].len(), 4);
    }

    #[test]
    fn bad_solver_precision_is_rejected() {
        let grid = IntGrid::new(2, 2);
        let config = TracingConfig {
            solver_precision: 0.0,
            ..TracingConfig::default()
        };
        assert!(matches!(
            trace_all_shapes_with(&grid, &config),
            Err(TraceError::InvalidPrecision(_))
        ));
    }
}
