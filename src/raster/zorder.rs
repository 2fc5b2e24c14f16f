//! Z-order (Morton) tiled storage.
//!
//! Cells are grouped into square tiles; inside a tile the cell offset is
//! the bit-interleave of the low bits of x (even bits) and y (odd bits).
//! Flood fill and the edge tracer read small 2×2 and 4-neighbour
//! windows, which this layout keeps inside one or two memory words.

use std::fmt;

use super::{out_of_bounds, Raster, WritableRaster};
use crate::error::{Result, TraceError};

/// Spread the 4 low bits of `v` onto the even bit positions.
const ZLUT: [u8; 16] = [
    0b0000_0000,
    0b0000_0001,
    0b0000_0100,
    0b0000_0101,
    0b0001_0000,
    0b0001_0001,
    0b0001_0100,
    0b0001_0101,
    0b0100_0000,
    0b0100_0001,
    0b0100_0100,
    0b0100_0101,
    0b0101_0000,
    0b0101_0001,
    0b0101_0100,
    0b0101_0101,
];

/// 6-bit Morton offset of (x, y) inside an 8×8 tile.
fn morton3(x: i32, y: i32) -> u32 {
    ZLUT[(x & 0x07) as usize] as u32 | (ZLUT[(y & 0x07) as usize] as u32) << 1
}

/// 8-bit Morton offset of (x, y) inside a 16×16 tile.
fn morton4(x: i32, y: i32) -> u32 {
    ZLUT[(x & 0x0F) as usize] as u32 | (ZLUT[(y & 0x0F) as usize] as u32) << 1
}

// ── Visited bitmap ───────────────────────────────────────

/// One bit per cell, one `u64` per 8×8 tile.
///
/// Used by the tracer to remember which cells already belong to a traced
/// shape. Only 0 and 1 can be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedBitmap {
    width: i32,
    height: i32,
    tiles_per_row: usize,
    data: Vec<u64>,
}

impl VisitedBitmap {
    /// All-zero bitmap. Negative dimensions are clamped to zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let tiles_per_row = (width as usize >> 3) + 1;
        let tile_rows = (height as usize >> 3) + 1;
        VisitedBitmap {
            width,
            height,
            tiles_per_row,
            data: vec![0; tiles_per_row * tile_rows],
        }
    }

    fn tile(&self, x: i32, y: i32) -> usize {
        self.tiles_per_row * (y as usize >> 3) + (x as usize >> 3)
    }

    fn check(&self, x: i32, y: i32) -> Result<()> {
        if self.in_range(x, y) {
            Ok(())
        } else {
            Err(out_of_bounds(x, y, self.width, self.height))
        }
    }

    /// True iff the cell is marked. Caller guarantees (x, y) is in range.
    pub(crate) fn is_set(&self, x: i32, y: i32) -> bool {
        (self.data[self.tile(x, y)] >> morton3(x, y)) & 1 == 1
    }

    /// Mark the cell. Caller guarantees (x, y) is in range.
    pub(crate) fn mark(&mut self, x: i32, y: i32) {
        let tile = self.tile(x, y);
        self.data[tile] |= 1u64 << morton3(x, y);
    }

    /// Set every cell to `value` (0 or 1).
    pub fn fill(&mut self, value: i32) -> Result<()> {
        let word = match value {
            0 => 0,
            1 => u64::MAX,
            _ => return Err(invalid_bit(value)),
        };
        self.data.iter_mut().for_each(|w| *w = word);
        Ok(())
    }

    /// Number of in-range cells set to 1.
    pub fn count_set(&self) -> usize {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_set(x, y))
            .count()
    }
}

fn invalid_bit(value: i32) -> TraceError {
    TraceError::InvalidValue {
        value,
        allowed: "0 or 1",
    }
}

impl Raster for VisitedBitmap {
    fn get(&self, x: i32, y: i32) -> Result<i32> {
        self.check(x, y)?;
        Ok(self.is_set(x, y) as i32)
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }
}

impl WritableRaster for VisitedBitmap {
    fn set(&mut self, x: i32, y: i32, value: i32) -> Result<i32> {
        if value & !1 != 0 {
            return Err(invalid_bit(value));
        }
        self.check(x, y)?;
        let tile = self.tile(x, y);
        let shift = morton3(x, y);
        let old = self.data[tile];
        self.data[tile] = (old & !(1u64 << shift)) | ((value as u64) << shift);
        Ok(((old >> shift) & 1) as i32)
    }
}

/// Rows of `0`/`1`, highest y first.
impl fmt::Display for VisitedBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                write!(f, "{}", self.is_set(x, y) as u8)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ── Z-order integer grid ─────────────────────────────────

/// `i32` cells stored in 16×16 Z-order tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZOrderGrid {
    width: i32,
    height: i32,
    tiles_per_row: usize,
    data: Vec<i32>,
}

impl ZOrderGrid {
    /// All-zero grid. Negative dimensions are clamped to zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let tiles_per_row = (width as usize >> 4) + 1;
        let tile_rows = (height as usize >> 4) + 1;
        ZOrderGrid {
            width,
            height,
            tiles_per_row,
            data: vec![0; 256 * tiles_per_row * tile_rows],
        }
    }

    /// Copy any raster into Z-order storage.
    pub fn from_raster<R: Raster + ?Sized>(source: &R) -> Result<Self> {
        let mut grid = ZOrderGrid::new(source.width(), source.height());
        for y in 0..grid.height {
            for x in 0..grid.width {
                let i = grid.index(x, y);
                grid.data[i] = source.get(x, y)?;
            }
        }
        Ok(grid)
    }

    fn index(&self, x: i32, y: i32) -> usize {
        let tile = self.tiles_per_row * (y as usize >> 4) + (x as usize >> 4);
        (tile << 8) | morton4(x, y) as usize
    }
}

impl Raster for ZOrderGrid {
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

impl WritableRaster for ZOrderGrid {
    fn set(&mut self, x: i32, y: i32, value: i32) -> Result<i32> {
        if !self.in_range(x, y) {
            return Err(out_of_bounds(x, y, self.width, self.height));
        }
        let i = self.index(x, y);
        Ok(std::mem::replace(&mut self.data[i], value))
    }
}
