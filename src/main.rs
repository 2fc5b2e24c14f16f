use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use raster2bez::{Segmentation, TracingConfig};

#[derive(Parser)]
#[command(name = "raster2bez", about = "Raster image to colored bezier shapes (SVG)")]
struct Cli {
    /// Input image path (PNG, JPEG, BMP, GIF). Every distinct color is
    /// traced as its own region, so quantize photos first.
    #[arg(short, long)]
    input: PathBuf,

    /// Output SVG path
    #[arg(short, long)]
    output: PathBuf,

    /// Path points per curve (interval segmentation); must be >= 1
    #[arg(long, default_value = "10")]
    interval: i32,

    /// Breakpoint placement
    #[arg(long, value_enum, default_value = "adaptive")]
    segmentation: SegmentationArg,

    /// Scan rows from column 0 instead of from the middle
    #[arg(long)]
    no_center_scan: bool,

    /// Also render a PNG preview of the traced shapes
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Preview magnification
    #[arg(long, default_value = "4.0")]
    scale: f32,

    /// Draw handles and on-curve points over the preview
    #[arg(long)]
    show_points: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SegmentationArg {
    /// Corners, inflections and smooth joints
    Adaptive,
    /// Fixed number of points per curve
    Interval,
}

impl From<SegmentationArg> for Segmentation {
    fn from(arg: SegmentationArg) -> Self {
        match arg {
            SegmentationArg::Adaptive => Segmentation::Adaptive,
            SegmentationArg::Interval => Segmentation::Interval,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = TracingConfig {
        interval: cli.interval,
        segmentation: cli.segmentation.into(),
        centered_scan: !cli.no_center_scan,
        ..TracingConfig::default()
    };

    eprintln!();
    eprintln!("  raster2bez \u{00b7} {}", cli.input.display());
    eprintln!();

    let t_start = Instant::now();
    let result = raster2bez::trace_image(&cli.input, &config)?;
    eprintln!("  Load        {}x{} px", result.width, result.height);

    let (curves, lines) = result.count_segments();
    let mode = match config.segmentation {
        Segmentation::Adaptive => "adaptive".to_string(),
        Segmentation::Interval => format!("interval {}", config.interval),
    };
    eprintln!(
        "  Trace       {} shapes \u{2192} {} curves + {} lines  ({})",
        result.shapes.len(),
        curves,
        lines,
        mode,
    );

    let out = BufWriter::new(File::create(&cli.output)?);
    raster2bez::output::write_svg(&result.shapes, result.width, result.height, out)?;
    eprintln!(
        "  Result      {}  ({}ms)",
        cli.output.display(),
        t_start.elapsed().as_millis()
    );

    if let Some(preview) = &cli.preview {
        let mut pixmap =
            raster2bez::render::render_shapes(&result.shapes, result.width, result.height, cli.scale)?;
        if cli.show_points {
            raster2bez::render::overlay_control_points(&mut pixmap, &result.shapes, cli.scale);
        }
        raster2bez::render::save_png(&pixmap, preview)?;
        eprintln!("  Preview     {}", preview.display());
    }

    eprintln!();
    eprintln!("  \u{2713} {}", cli.output.display());
    eprintln!();

    Ok(())
}
