use std::path::Path;

use image::{GrayImage, ImageReader, RgbaImage};

use crate::error::{Result, TraceError};
use crate::raster::{out_of_bounds, Raster};

/// Load an image file as RGBA8.
///
/// Each pixel reads back through `Raster` as packed ARGB. No thresholding
/// or palette reduction happens here: every distinct color becomes its own
/// region, so quantize beforehand if the source is photographic.
pub fn load_raster(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)
        .map_err(|e| TraceError::ImageLoad(e.to_string()))?
        .decode()
        .map_err(|e| TraceError::ImageLoad(e.to_string()))?
        .into_rgba8();
    Ok(img)
}

/// Pack an RGBA pixel as `0xAARRGGBB`.
pub fn pack_argb([r, g, b, a]: [u8; 4]) -> i32 {
    u32::from_be_bytes([a, r, g, b]) as i32
}

/// Split `0xAARRGGBB` into `[r, g, b, a]`.
pub fn unpack_argb(argb: i32) -> [u8; 4] {
    let [a, r, g, b] = (argb as u32).to_be_bytes();
    [r, g, b, a]
}

/// Pixel (x, y) is image column x, image row y (row 0 at the top).
impl Raster for RgbaImage {
    fn get(&self, x: i32, y: i32) -> Result<i32> {
        if !self.in_range(x, y) {
            return Err(out_of_bounds(x, y, self.width() as i32, self.height() as i32));
        }
        Ok(pack_argb(self.get_pixel(x as u32, y as u32).0))
    }

    fn width(&self) -> i32 {
        self.dimensions().0 as i32
    }

    fn height(&self) -> i32 {
        self.dimensions().1 as i32
    }
}

impl Raster for GrayImage {
    fn get(&self, x: i32, y: i32) -> Result<i32> {
        if !self.in_range(x, y) {
            return Err(out_of_bounds(x, y, self.width() as i32, self.height() as i32));
        }
        Ok(self.get_pixel(x as u32, y as u32).0[0] as i32)
    }

    fn width(&self) -> i32 {
        self.dimensions().0 as i32
    }

    fn height(&self) -> i32 {
        self.dimensions().1 as i32
    }
}
