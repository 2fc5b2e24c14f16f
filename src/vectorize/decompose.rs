//! Region boundary extraction on the pixel-corner grid.
//!
//! The edge tracer walks lattice intersections, keeping the target color
//! on its left, and records the midpoint of every pixel edge it crosses.
//! A straight run of N pixels therefore yields N points, one per edge,
//! at half-integer offsets from the pixel centers.
//!
//! Flood fill marks a whole 4-connected region as visited so the scan
//! never traces it twice.

use kurbo::Point;

use super::corner::{Corner, Direction};
use crate::error::{Result, TraceError};
use crate::geom::GridPoint;
use crate::raster::{Raster, VisitedBitmap};

/// Boundary-following state machine for one region.
///
/// Each `step` looks at the four pixels around the current corner from
/// the perspective of the direction of travel:
///
/// ```text
///   fl │ fr      f = far (ahead), n = near (behind)
///   ───┼───      l = left, r = right
///   nl │ nr
///      ^ travel
/// ```
///
/// and turns according to the `nl nr fl fr` membership pattern:
///
/// ```text
///   pattern  │ action
///   ─────────┼────────────────────────────────────
///   1000     │ left  (outer corner)
///   1001     │ left  (diagonal pinch: stay 4-connected)
///   1100     │ left
///   0111     │ left
///   1011     │ right (inner corner)
///   0100     │ right
///   0110     │ right
///   0011     │ right
///   1111     │ error: not on a boundary
///   0000     │ error: off the shape
///   other    │ straight
/// ```
///
/// Pixels outside the raster never count as the target color.
pub struct EdgeTracer<'a, R: Raster + ?Sized> {
    raster: &'a R,
    pos: Corner,
    previous: Corner,
    initial: Corner,
    color: i32,
    steps: usize,
    points: Vec<Point>,
}

impl<'a, R: Raster + ?Sized> EdgeTracer<'a, R> {
    /// Prepare to walk the outer boundary of the region containing
    /// `start`, which must lie in the region's lowest row so that its
    /// lower edge is on the outer boundary.
    ///
    /// The cursor starts at the lower-right corner of `start`, as if it
    /// had just travelled right along the start pixel's lower edge.
    pub fn new(raster: &'a R, start: GridPoint, color: i32) -> Self {
        let pos = Corner::new(start);
        EdgeTracer {
            raster,
            pos,
            previous: pos.left(),
            initial: pos,
            color,
            steps: 0,
            points: Vec::new(),
        }
    }

    /// Cells outside the raster are background.
    fn is_color(&self, p: GridPoint) -> Result<bool> {
        if !self.raster.in_range(p.x, p.y) {
            return Ok(false);
        }
        Ok(self.raster.get(p.x, p.y)? == self.color)
    }

    /// Advance one lattice step and record the crossed edge's midpoint.
    pub fn step(&mut self) -> Result<()> {
        let dir = self.pos.dir_from(&self.previous)?;
        let c = &self.pos;
        let (nl, nr, fl, fr) = match dir {
            Direction::Up => (c.bottom_left, c.bottom_right, c.top_left, c.top_right),
            Direction::Down => (c.top_right, c.top_left, c.bottom_right, c.bottom_left),
            Direction::Left => (c.bottom_right, c.top_right, c.bottom_left, c.top_left),
            Direction::Right => (c.top_left, c.bottom_left, c.top_right, c.bottom_right),
            Direction::None => {
                let p = self.pos.top_left;
                return Err(TraceError::StalledCursor { x: p.x, y: p.y });
            }
        };
        let pattern = (self.is_color(nl)? as u8) << 3
            | (self.is_color(nr)? as u8) << 2
            | (self.is_color(fl)? as u8) << 1
            | self.is_color(fr)? as u8;

        let p = self.pos.top_left;
        let heading = match pattern {
            0b1000 | 0b0111 | 0b1001 | 0b1100 => dir.rotate_ccw(),
            0b0100 | 0b1011 | 0b0110 | 0b0011 => dir.rotate_cw(),
            0b1111 => return Err(TraceError::NotOnBoundary { x: p.x, y: p.y }),
            0b0000 => return Err(TraceError::OffShape { x: p.x, y: p.y }),
            _ => dir,
        };

        let next = self.pos.shift(heading);
        self.points.push(self.pos.midpoint(&next));
        self.previous = self.pos;
        self.pos = next;
        self.steps += 1;
        Ok(())
    }

    /// True once the cursor is back at its starting corner.
    pub fn done(&self) -> bool {
        self.steps > 0 && self.pos == self.initial
    }

    /// Edge midpoints recorded so far.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// Counter-clockwise loop of edge midpoints around the region that
/// contains pixel (x, y).
///
/// (x, y) must lie in the region's lowest row; the row-by-row scan of
/// `trace_all_shapes` guarantees this.
pub fn follow_edge<R: Raster + ?Sized>(raster: &R, x: i32, y: i32) -> Result<Vec<Point>> {
    let color = raster.get(x, y)?;
    let mut tracer = EdgeTracer::new(raster, GridPoint::new(x, y), color);
    loop {
        tracer.step()?;
        if tracer.done() {
            break;
        }
    }
    Ok(tracer.into_points())
}

/// Mark every cell 4-connected to (x, y) with the same value as visited.
///
/// Non-recursive: cells are marked as they are pushed, so each enters the
/// stack once. Returns the number of newly marked cells.
pub fn flood_fill<R: Raster + ?Sized>(
    raster: &R,
    visited: &mut VisitedBitmap,
    x: i32,
    y: i32,
) -> Result<usize> {
    let color = raster.get(x, y)?;
    if visited.get(x, y)? == 1 {
        return Ok(0);
    }
    visited.mark(x, y);
    let mut marked = 1;
    let mut stack = vec![GridPoint::new(x, y)];
    while let Some(p) = stack.pop() {
        for n in p.neighbors() {
            if !raster.in_range(n.x, n.y) || !visited.in_range(n.x, n.y) {
                continue;
            }
            if visited.is_set(n.x, n.y) || raster.get(n.x, n.y)? != color {
                continue;
            }
            visited.mark(n.x, n.y);
            marked += 1;
            stack.push(n);
        }
    }
    Ok(marked)
}
