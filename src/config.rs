use std::f64::consts::PI;

/// All tracing parameters in one struct.
/// Adjustable field by field; every threshold here is a tunable default,
/// not a physical constraint.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    // -- Density --
    /// Density hint: path points per bezier curve. Must be at least 1.
    /// Drives `Segmentation::Interval`; validated but geometry-driven
    /// for `Segmentation::Adaptive`.
    pub interval: i32,
    /// Which segmentation algorithm turns a point loop into curves.
    pub segmentation: Segmentation,

    // -- Raster scan --
    /// Start each row scan at the middle column and wrap around,
    /// instead of starting at column 0.
    pub centered_scan: bool,

    // -- Breakpoint selection --
    /// Half-width (in samples) of the sliding window used for
    /// turning-angle and curvature estimates.
    pub fitting_window: usize,
    /// A local angle minimum below this (radians) is a corner.
    /// Sharp turn = small angle.
    pub corner_angle: f64,
    /// Joints whose tangent angle exceeds this (radians) are re-optimized
    /// to be smooth.
    pub smooth_angle: f64,
    /// Rolling-average window for the curvature signal.
    pub curvature_window: usize,

    // -- Curve fitting --
    /// Max angular deviation (radians) for a run of samples to count as
    /// a straight line.
    pub collinear_tolerance: f64,
    /// Number of linear sub-segments a candidate curve is split into
    /// when measuring fit error.
    pub rmse_samples: usize,
    /// Hill-climb precision (stop when every step is below this).
    pub solver_precision: f64,
    /// Hill-climb iteration cap.
    pub solver_iterations: usize,
}

/// Segmentation strategy for converting a point path into curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Segmentation {
    /// Corner, inflection and quarter-length breakpoints with a joint
    /// smoothing pass.
    #[default]
    Adaptive,
    /// One curve per `interval` path points.
    Interval,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            interval: 10,
            segmentation: Segmentation::Adaptive,
            centered_scan: true,
            fitting_window: 5,
            corner_angle: 0.75 * PI,
            smooth_angle: 0.75 * PI,
            curvature_window: 7,
            collinear_tolerance: 0.03125,
            rmse_samples: 16,
            solver_precision: 0.1,
            solver_iterations: 10_000,
        }
    }
}

impl TracingConfig {
    /// Default config with the given density hint.
    pub fn with_interval(interval: i32) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}
