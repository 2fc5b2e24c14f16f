//! raster2bez: integer raster → colored cubic Bézier shapes.
//!
//! Every 4-connected region of equal-valued cells becomes one closed
//! [`Shape`]: the region's exact pixel boundary, fitted with a short run
//! of cubic curves and tagged with the region's value.
//!
//! # Example
//!
//! ```
//! use raster2bez::{trace_all_shapes, IntGrid};
//!
//! // A single foreground pixel on a 10x10 background.
//! let grid = IntGrid::from_fn(10, 10, |x, y| (x == 5 && y == 5) as i32);
//! let shapes = trace_all_shapes(&grid, 10)?;
//! assert_eq!(shapes.len(), 2);
//! assert_eq!(shapes[1].color, 1);
//! # Ok::<(), raster2bez::TraceError>(())
//! ```
//!
//! Coordinates are pixel-center based: pixel (x, y) covers the square
//! from (x − ½, y − ½) to (x + ½, y + ½).

#![forbid(unsafe_code)]

mod bezier;
mod config;
mod geom;
mod shape;
mod solver;

pub mod bitmap;
pub mod error;
pub mod output;
pub mod raster;
pub mod render;
pub mod vectorize;

// Re-export kurbo so downstream users get the same version
// used by `Shape::to_bezpath` and `BezierCurve` points.
pub use kurbo;

pub use bezier::{BezierCurve, FitParams};
pub use config::{Segmentation, TracingConfig};
pub use error::{Result, TraceError};
pub use geom::{GridPoint, PointExt};
pub use raster::{draw_onto, IntGrid, Raster, ValueMask, VisitedBitmap, WritableRaster, ZOrderGrid};
pub use shape::Shape;
pub use solver::{HillClimbSolver, Solver};
pub use vectorize::corner::{Corner, Direction};
pub use vectorize::curve::{PolylineSegmenter, SegmentParams};
pub use vectorize::decompose::{flood_fill, follow_edge, EdgeTracer};
pub use vectorize::interval::IntervalSegmenter;
pub use vectorize::{
    trace_all_shapes, trace_all_shapes_with, trace_closed_path, trace_open_path, trace_path,
};

use std::path::Path;
use std::time::Instant;

/// The result of tracing an image file.
#[derive(Debug, Clone)]
pub struct TraceResult {
    /// Shapes in paint order, colors as packed ARGB.
    pub shapes: Vec<Shape>,
    /// Source image size in pixels.
    pub width: u32,
    pub height: u32,
}

impl TraceResult {
    /// Count (curves, lines) segments over all shapes.
    pub fn count_segments(&self) -> (usize, usize) {
        let all = self.shapes.iter().flat_map(|s| &s.curves);
        let lines = all.clone().filter(|c| c.is_line()).count();
        (all.count() - lines, lines)
    }
}

/// Full pipeline: image file → shapes, one per region of identical color.
///
/// The image is not quantized; reduce its palette first if it is
/// photographic or anti-aliased.
pub fn trace_image(image_path: &Path, config: &TracingConfig) -> Result<TraceResult> {
    let t_start = Instant::now();
    let img = bitmap::load_raster(image_path)?;
    let (width, height) = img.dimensions();
    log::debug!("loaded {} ({}x{})", image_path.display(), width, height);

    let shapes = trace_all_shapes_with(&img, config)?;
    log::debug!(
        "traced {} shapes in {}ms",
        shapes.len(),
        t_start.elapsed().as_millis()
    );
    Ok(TraceResult {
        shapes,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn traces_a_png_file() {
        let mut img = RgbaImage::from_pixel(12, 8, Rgba([255, 255, 255, 255]));
        for y in 2..6 {
            for x in 3..9 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        let path = std::env::temp_dir().join(format!("raster2bez-{}.png", std::process::id()));
        img.save(&path).unwrap();

        let result = trace_image(&path, &TracingConfig::default());
        std::fs::remove_file(&path).unwrap();
        let result = result.unwrap();

        assert_eq!((result.width, result.height), (12, 8));
        let colors: Vec<u32> = result.shapes.iter().map(|s| s.color as u32).collect();
        assert_eq!(colors, vec![0xFFFF_FFFF, 0xFF00_0000]);
        let (curves, lines) = result.count_segments();
        assert_eq!(curves + lines, result.shapes.iter().map(Shape::len).sum::<usize>());
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = trace_image(Path::new("/nonexistent/raster2bez.png"), &TracingConfig::default())
            .unwrap_err();
        assert!(matches!(err, TraceError::ImageLoad(_)));
    }
}
