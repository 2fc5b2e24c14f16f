use std::io::Write;

use kurbo::Affine;

use crate::bitmap::unpack_argb;
use crate::error::Result;
use crate::shape::Shape;

/// Shapes are in pixel-center coordinates; SVG user space puts pixel
/// (x, y) in the unit square starting at (x, y).
const PIXEL_CENTER: Affine = Affine::new([1.0, 0.0, 0.0, 1.0, 0.5, 0.5]);

/// `#rrggbb` for an ARGB color. Alpha is dropped.
pub fn hex_color(argb: i32) -> String {
    let [r, g, b, _] = unpack_argb(argb);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Write `shapes` as an SVG document of the given pixel size.
///
/// One `<path>` per non-empty shape, in paint order, filled and stroked
/// with the shape's color so adjacent regions leave no hairline gaps.
pub fn write_svg<W: Write>(shapes: &[Shape], width: u32, height: u32, mut out: W) -> Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height,
    )?;
    writeln!(out, "  <g>")?;
    for (i, shape) in shapes.iter().filter(|s| !s.is_empty()).enumerate() {
        let mut path = shape.to_bezpath();
        path.apply_affine(PIXEL_CENTER);
        let color = hex_color(shape.color);
        writeln!(
            out,
            r#"    <path id="path{}" style="fill:{c};stroke:{c};stroke-width:1;stroke-linecap:round" d="{}"/>"#,
            i + 1,
            path.to_svg(),
            c = color,
        )?;
    }
    writeln!(out, "  </g>")?;
    writeln!(out, "</svg>")?;
    out.flush()?;
    Ok(())
}
