//! Raster previews of traced shapes.
//!
//! Converts shapes back to pixels via tiny-skia, painting them
//! back-to-front, optionally with their control points on top.

use std::path::Path;

use kurbo::{BezPath, PathEl};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::bitmap::unpack_argb;
use crate::error::{Result, TraceError};
use crate::shape::Shape;

/// Convert a kurbo `BezPath` to a `tiny_skia::Path`.
fn kurbo_to_tinyskia(bezpath: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in bezpath.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Pixel-center coordinates → preview pixels at `scale`.
fn preview_transform(scale: f32) -> Transform {
    Transform::from_row(scale, 0.0, 0.0, scale, 0.5 * scale, 0.5 * scale)
}

fn solid(argb: i32) -> Paint<'static> {
    let [r, g, b, a] = unpack_argb(argb);
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(r, g, b, a));
    paint.anti_alias = true;
    paint
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| TraceError::Render(format!("cannot allocate {}x{} pixmap", width, height)))
}

/// Paint `shapes` in order onto a transparent `width`×`height` raster
/// enlarged by `scale`.
///
/// Each shape is filled and outlined with its own ARGB color, like the
/// SVG writer does.
pub fn render_shapes(shapes: &[Shape], width: u32, height: u32, scale: f32) -> Result<Pixmap> {
    let w = (width as f32 * scale).ceil() as u32;
    let h = (height as f32 * scale).ceil() as u32;
    let mut pixmap = new_pixmap(w, h)?;
    let transform = preview_transform(scale);
    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    for shape in shapes {
        let Some(path) = kurbo_to_tinyskia(&shape.to_bezpath()) else {
            continue;
        };
        let paint = solid(shape.color);
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        pixmap.stroke_path(&path, &paint, &stroke, transform, None);
    }
    Ok(pixmap)
}

/// Draw handles (lines) and on-curve points (dots) over a preview made
/// by [`render_shapes`] at the same `scale`.
pub fn overlay_control_points(pixmap: &mut Pixmap, shapes: &[Shape], scale: f32) {
    let transform = preview_transform(scale);
    let handle_paint = solid(0xC000_80FFu32 as i32);
    let node_paint = solid(0xFFFF_3030u32 as i32);
    // Keep marks a constant size on screen.
    let stroke = Stroke {
        width: 1.0 / scale,
        ..Stroke::default()
    };
    let radius = 2.0 / scale;

    let mut handles = PathBuilder::new();
    let mut nodes = PathBuilder::new();
    for c in shapes.iter().flat_map(|s| &s.curves) {
        if !c.is_line() {
            handles.move_to(c.p1.x as f32, c.p1.y as f32);
            handles.line_to(c.p2.x as f32, c.p2.y as f32);
            handles.move_to(c.p4.x as f32, c.p4.y as f32);
            handles.line_to(c.p3.x as f32, c.p3.y as f32);
        }
        nodes.push_circle(c.p1.x as f32, c.p1.y as f32, radius);
    }
    if let Some(path) = handles.finish() {
        pixmap.stroke_path(&path, &handle_paint, &stroke, transform, None);
    }
    if let Some(path) = nodes.finish() {
        pixmap.fill_path(&path, &node_paint, FillRule::Winding, transform, None);
    }
}

/// Encode a pixmap to PNG bytes.
fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| TraceError::Render(e.to_string()))?;
    // tiny-skia stores premultiplied RGBA.
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    writer
        .write_image_data(&data)
        .map_err(|e| TraceError::Render(e.to_string()))?;
    drop(writer);
    Ok(buf)
}

/// Write a pixmap as a PNG file.
pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<()> {
    std::fs::write(path, encode_png(pixmap)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bezier::BezierCurve;
    use kurbo::Point;

    fn square(color: i32, lo: f64, hi: f64) -> Shape {
        let p = [
            Point::new(lo, lo),
            Point::new(hi, lo),
            Point::new(hi, hi),
            Point::new(lo, hi),
        ];
        let curves = (0..4).map(|i| BezierCurve::line(p[i], p[(i + 1) % 4])).collect();
        Shape::new(curves, color, true)
    }

    #[test]
    fn later_shapes_paint_over_earlier_ones() {
        let back = square(0xFF00_0000u32 as i32, -0.5, 9.5);
        let front = square(0xFFFF_FFFFu32 as i32, 3.5, 5.5);
        let pixmap = render_shapes(&[back, front], 10, 10, 2.0).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (20, 20));
        let at = |x: u32, y: u32| pixmap.pixel(x, y).unwrap();
        // Pixel (4, 4) at scale 2 covers preview pixels 8..10.
        assert_eq!(at(9, 9).red(), 255);
        assert_eq!(at(1, 1).red(), 0);
        assert_eq!(at(1, 1).alpha(), 255);
    }

    #[test]
    fn png_has_signature() {
        let mut pixmap = render_shapes(&[square(-1, 0.0, 2.0)], 4, 4, 1.0).unwrap();
        overlay_control_points(&mut pixmap, &[square(-1, 0.0, 2.0)], 1.0);
        let bytes = encode_png(&pixmap).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn zero_sized_preview_is_an_error() {
        assert!(matches!(
            render_shapes(&[], 0, 10, 1.0),
            Err(TraceError::Render(_))
        ));
    }
}
