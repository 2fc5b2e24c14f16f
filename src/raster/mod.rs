//! Integer rasters: the read-only `Raster` interface, the additive
//! `WritableRaster` capability, and the in-crate implementations.

mod zorder;

pub use zorder::{VisitedBitmap, ZOrderGrid};

use crate::error::{Result, TraceError};

/// Read-only view of a rectangular grid of integer cells.
///
/// Implementations may wrap arrays, images, or procedural generators.
/// They are not required to be thread-safe.
pub trait Raster {
    /// Cell value at (x, y). Fails with `OutOfBounds` outside the grid.
    fn get(&self, x: i32, y: i32) -> Result<i32>;

    fn width(&self) -> i32;

    fn height(&self) -> i32;

    /// True iff `get(x, y)` would succeed.
    fn in_range(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }
}

/// A `Raster` that can also be modified.
pub trait WritableRaster: Raster {
    /// Store `value` at (x, y), returning the previous value.
    ///
    /// Fails with `OutOfBounds` outside the grid, or `InvalidValue` if
    /// this raster cannot hold `value`.
    fn set(&mut self, x: i32, y: i32, value: i32) -> Result<i32>;
}

impl<R: Raster + ?Sized> Raster for &R {
    fn get(&self, x: i32, y: i32) -> Result<i32> {
        (**self).get(x, y)
    }

    fn width(&self) -> i32 {
        (**self).width()
    }

    fn height(&self) -> i32 {
        (**self).height()
    }
}

/// Bounds error for a raster of the given size.
pub(crate) fn out_of_bounds(x: i32, y: i32, width: i32, height: i32) -> TraceError {
    TraceError::OutOfBounds {
        x,
        y,
        width,
        height,
    }
}

/// Plain row-major `i32` raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntGrid {
    width: i32,
    height: i32,
    data: Vec<i32>,
}

impl IntGrid {
    /// All-zero grid. Negative dimensions are clamped to zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        IntGrid {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize)],
        }
    }

    /// Grid whose cell (x, y) is `f(x, y)`.
    pub fn from_fn(width: i32, height: i32, mut f: impl FnMut(i32, i32) -> i32) -> Self {
        let mut grid = IntGrid::new(width, height);
        for y in 0..grid.height {
            for x in 0..grid.width {
                let i = grid.index(x, y);
                grid.data[i] = f(x, y);
            }
        }
        grid
    }

    /// Build from rows, `rows[y][x]`. Rows shorter than the first are
    /// padded with zeros.
    pub fn from_rows(rows: &[Vec<i32>]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.len()) as i32;
        IntGrid::from_fn(width, height, |x, y| {
            rows[y as usize].get(x as usize).copied().unwrap_or(0)
        })
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }
}

impl Raster for IntGrid {
    fn get(&self, x: i32, y: i32) -> Result<i32> {
        if !self.in_range(x, y) {
            return Err(out_of_bounds(x, y, self.width, self.height));
        }
        Ok(self.data[self.index(x, y)])
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }
}

impl WritableRaster for IntGrid {
    fn set(&mut self, x: i32, y: i32, value: i32) -> Result<i32> {
        if !self.in_range(x, y) {
            return Err(out_of_bounds(x, y, self.width, self.height));
        }
        let i = self.index(x, y);
        Ok(std::mem::replace(&mut self.data[i], value))
    }
}

/// Binary view of another raster: 1 where the source equals `target`,
/// 0 elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct ValueMask<R> {
    source: R,
    target: i32,
}

impl<R: Raster> ValueMask<R> {
    pub fn new(source: R, target: i32) -> Self {
        ValueMask { source, target }
    }
}

impl<R: Raster> Raster for ValueMask<R> {
    fn get(&self, x: i32, y: i32) -> Result<i32> {
        Ok((self.source.get(x, y)? == self.target) as i32)
    }

    fn width(&self) -> i32 {
        self.source.width()
    }

    fn height(&self) -> i32 {
        self.source.height()
    }
}

/// Copy a `w`×`h` region of `src` starting at (`src_x`, `src_y`) into
/// `canvas` at (`dst_x`, `dst_y`). Destination cells outside the canvas
/// are skipped; source cells outside `src` are an error.
#[allow(clippy::too_many_arguments)]
pub fn draw_onto<S, W>(
    src: &S,
    src_x: i32,
    src_y: i32,
    w: i32,
    h: i32,
    canvas: &mut W,
    dst_x: i32,
    dst_y: i32,
) -> Result<()>
where
    S: Raster + ?Sized,
    W: WritableRaster + ?Sized,
{
    for dy in 0..h {
        for dx in 0..w {
            let (ox, oy) = (dst_x + dx, dst_y + dy);
            if canvas.in_range(ox, oy) {
                canvas.set(ox, oy, src.get(src_x + dx, src_y + dy)?)?;
            }
        }
    }
    Ok(())
}
