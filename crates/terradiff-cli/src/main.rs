//! terradiff CLI — command-line driver for the change detection pipeline.
//!
//! Loads a reference/moving image pair, runs align → normalize → detect,
//! and persists intermediate and final products. All file I/O and
//! visualization concerns live here; the library stays pure.

use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

use terradiff::{
    align_ecc, run_pipeline, ChangeConfig, EccConfig, EccResult, KernelShape, PipelineConfig,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "terradiff")]
#[command(about = "Detect changes between two images of the same scene (drone overflights)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write aligned/normalized/mask images.
    Detect(CliDetectArgs),

    /// Estimate the alignment homography only and print it.
    Align(CliAlignArgs),
}

#[derive(Debug, Clone, Args)]
struct CliEccArgs {
    /// Maximum ECC iterations.
    #[arg(long, default_value = "5000")]
    max_iters: usize,

    /// ECC convergence epsilon on the correlation coefficient.
    #[arg(long, default_value = "1e-8")]
    eps: f64,

    /// Minimum usable correlation coefficient.
    #[arg(long, default_value = "0.5")]
    min_correlation: f64,
}

impl CliEccArgs {
    fn to_config(&self) -> EccConfig {
        EccConfig {
            max_iters: self.max_iters,
            eps: self.eps,
            min_correlation: self.min_correlation,
            ..EccConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KernelShapeArg {
    Rect,
    Cross,
    Ellipse,
}

impl From<KernelShapeArg> for KernelShape {
    fn from(a: KernelShapeArg) -> Self {
        match a {
            KernelShapeArg::Rect => KernelShape::Rect,
            KernelShapeArg::Cross => KernelShape::Cross,
            KernelShapeArg::Ellipse => KernelShape::Ellipse,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct CliDetectArgs {
    /// Path to the reference image.
    #[arg(long)]
    reference: PathBuf,

    /// Path to the moving image.
    #[arg(long)]
    moving: PathBuf,

    /// Directory for output images (created if missing).
    #[arg(long)]
    out_dir: PathBuf,

    #[command(flatten)]
    ecc: CliEccArgs,

    /// Change-detection threshold on the luma difference (0-255).
    #[arg(long, default_value = "65")]
    threshold: u8,

    /// Structuring-element shape for morphological opening.
    #[arg(long, value_enum, default_value_t = KernelShapeArg::Ellipse)]
    kernel_shape: KernelShapeArg,

    /// Structuring-element side length in pixels.
    #[arg(long, default_value = "3")]
    kernel_size: u32,

    /// Also write the reference with changed pixels painted red.
    #[arg(long)]
    overlay: bool,

    /// Path to write a JSON run report.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliAlignArgs {
    /// Path to the reference image.
    #[arg(long)]
    reference: PathBuf,

    /// Path to the moving image.
    #[arg(long)]
    moving: PathBuf,

    /// Optional path for the aligned image.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    ecc: CliEccArgs,
}

/// JSON run report written by `detect --report`.
#[derive(Debug, serde::Serialize)]
struct RunReport {
    reference: String,
    moving: String,
    image_size: [u32; 2],
    ecc: EccResult,
    threshold: u8,
    kernel_size: u32,
    changed_pixels: usize,
    changed_fraction: f64,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Align(args) => run_align(&args),
    }
}

fn load_rgb(path: &Path) -> CliResult<RgbImage> {
    let img = image::open(path)
        .map_err(|e| -> CliError { format!("failed to open {}: {}", path.display(), e).into() })?;
    Ok(img.to_rgb8())
}

// ── detect ─────────────────────────────────────────────────────────────

fn run_detect(args: &CliDetectArgs) -> CliResult<()> {
    let reference = load_rgb(&args.reference)?;
    let moving = load_rgb(&args.moving)?;
    let (w, h) = reference.dimensions();
    tracing::info!(
        "Loaded reference {}x{}, moving {}x{}",
        w,
        h,
        moving.width(),
        moving.height()
    );

    let config = PipelineConfig {
        ecc: args.ecc.to_config(),
        change: ChangeConfig {
            threshold: args.threshold,
            kernel_shape: args.kernel_shape.into(),
            kernel_size: args.kernel_size,
        },
    };

    let result = run_pipeline(&reference, &moving, &config).map_err(|e| -> CliError {
        tracing::error!("Pipeline aborted: {e}");
        e.to_string().into()
    })?;

    tracing::info!(
        "Alignment converged: correlation {:.4} after {} iterations",
        result.ecc.correlation,
        result.ecc.iterations
    );

    std::fs::create_dir_all(&args.out_dir)?;

    let aligned_path = args.out_dir.join("aligned.png");
    result.aligned.save(&aligned_path)?;
    tracing::info!("Wrote {}", aligned_path.display());

    let normalized_path = args.out_dir.join("normalized.png");
    result.normalized.save(&normalized_path)?;
    tracing::info!("Wrote {}", normalized_path.display());

    let mask_path = args.out_dir.join("change_mask.png");
    result.mask.save(&mask_path)?;
    tracing::info!("Wrote {}", mask_path.display());

    if args.overlay {
        let overlay_path = args.out_dir.join("overlay.png");
        paint_overlay(&reference, &result.mask).save(&overlay_path)?;
        tracing::info!("Wrote {}", overlay_path.display());
    }

    let changed = result.mask.pixels().filter(|p| p[0] == 255).count();
    let total = (w as usize) * (h as usize);
    tracing::info!(
        "Changed pixels: {} ({:.2}% of the frame)",
        changed,
        100.0 * changed as f64 / total as f64
    );

    if let Some(report_path) = &args.report {
        let report = RunReport {
            reference: args.reference.display().to_string(),
            moving: args.moving.display().to_string(),
            image_size: [w, h],
            ecc: result.ecc,
            threshold: args.threshold,
            kernel_size: args.kernel_size,
            changed_pixels: changed,
            changed_fraction: changed as f64 / total as f64,
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(report_path, &json)?;
        tracing::info!("Report written to {}", report_path.display());
    }

    Ok(())
}

/// Reference image with changed pixels painted red.
fn paint_overlay(reference: &RgbImage, mask: &image::GrayImage) -> RgbImage {
    let mut overlay = reference.clone();
    for (x, y, px) in mask.enumerate_pixels() {
        if px[0] > 0 {
            overlay.put_pixel(x, y, Rgb([255, 0, 0]));
        }
    }
    overlay
}

// ── align ──────────────────────────────────────────────────────────────

fn run_align(args: &CliAlignArgs) -> CliResult<()> {
    let reference = load_rgb(&args.reference)?;
    let moving = load_rgb(&args.moving)?;

    let ref_gray = terradiff::color::rgb_to_gray(&reference);
    let mov_gray = terradiff::color::rgb_to_gray(&moving);

    let result = align_ecc(&ref_gray, &mov_gray, &args.ecc.to_config()).map_err(
        |e| -> CliError { format!("alignment failed: {e}").into() },
    )?;

    println!(
        "correlation: {:.6} ({} iterations)",
        result.correlation, result.iterations
    );
    println!("homography (reference → moving):");
    for row in &result.homography {
        println!("  [{:>12.6} {:>12.6} {:>12.6}]", row[0], row[1], row[2]);
    }

    if let Some(out) = &args.out {
        let (w, h) = reference.dimensions();
        let aligned = terradiff::warp::warp_rgb(&moving, &result.matrix(), w, h);
        aligned.save(out)?;
        tracing::info!("Wrote {}", out.display());
    }

    Ok(())
}
