use thiserror::Error;

/// Errors that can occur while tracing a raster into shapes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TraceError {
    #[error("must have at least {required} points to trace {kind} path, got {actual}")]
    TooFewPoints {
        required: usize,
        actual: usize,
        kind: &'static str,
    },

    #[error("interval must be a positive number, got {0}")]
    InvalidInterval(i32),

    #[error("value {value} cannot be stored in this raster (allowed: {allowed})")]
    InvalidValue { value: i32, allowed: &'static str },

    #[error("solver precision must be greater than zero, got {0}")]
    InvalidPrecision(f64),

    #[error("coordinate ({x}, {y}) is outside the {width}x{height} raster")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("edge tracer is not on a boundary corner at ({x}, {y}): all four pixels are the target color")]
    NotOnBoundary { x: i32, y: i32 },

    #[error("edge tracer wandered off the shape at ({x}, {y}): none of the four pixels is the target color")]
    OffShape { x: i32, y: i32 },

    #[error("edge tracer cursor did not move at ({x}, {y})")]
    StalledCursor { x: i32, y: i32 },

    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl TraceError {
    /// True for the boundary-walk invariant violations.
    ///
    /// These indicate an inconsistent `Raster` implementation or a bug in
    /// the tracer itself; they are never worth retrying.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            TraceError::NotOnBoundary { .. }
                | TraceError::OffShape { .. }
                | TraceError::StalledCursor { .. }
        )
    }
}

pub type Result<T, E = TraceError> = std::result::Result<T, E>;
