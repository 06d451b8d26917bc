//! Pure pipeline orchestration: align → normalize → detect.
//!
//! Strictly sequential; each stage consumes the previous stage's output.
//! A failed alignment aborts the pair — later stages never run on
//! unaligned data. No I/O happens here; persistence and visualization
//! belong to the driver.

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::align::{align_ecc, AlignError, EccConfig, EccResult};
use crate::color::rgb_to_gray;
use crate::detect::{detect_changes, ChangeConfig};
use crate::histmatch::match_histograms;
use crate::warp::warp_rgb;
use crate::ShapeMismatch;

/// Configuration for a full pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub ecc: EccConfig,
    pub change: ChangeConfig,
}

/// All products of a pipeline run, each on the reference pixel grid.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Moving image resampled onto the reference grid.
    pub aligned: RgbImage,
    /// Aligned image after histogram matching against the reference.
    pub normalized: RgbImage,
    /// Binary change mask (0 or 255).
    pub mask: GrayImage,
    /// Alignment estimate and statistics.
    pub ecc: EccResult,
}

/// Pipeline failure.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Alignment did not produce a usable transform.
    Alignment(AlignError),
    /// Stage inputs disagreed in shape (usage error).
    Shape(ShapeMismatch),
}

impl From<AlignError> for PipelineError {
    fn from(e: AlignError) -> Self {
        Self::Alignment(e)
    }
}

impl From<ShapeMismatch> for PipelineError {
    fn from(e: ShapeMismatch) -> Self {
        Self::Shape(e)
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alignment(e) => write!(f, "alignment failed: {e}"),
            Self::Shape(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Alignment(e) => Some(e),
            Self::Shape(e) => Some(e),
        }
    }
}

/// Run the full change-detection pipeline on one image pair.
///
/// `moving` may differ from `reference` in size; every product is
/// resampled onto the reference grid.
pub fn run_pipeline(
    reference: &RgbImage,
    moving: &RgbImage,
    config: &PipelineConfig,
) -> Result<PipelineResult, PipelineError> {
    let ref_gray = rgb_to_gray(reference);
    let mov_gray = rgb_to_gray(moving);

    let ecc = align_ecc(&ref_gray, &mov_gray, &config.ecc)?;

    let (w, h) = reference.dimensions();
    let aligned = warp_rgb(moving, &ecc.matrix(), w, h);
    let normalized = match_histograms(&aligned, reference)?;
    let mask = detect_changes(reference, &normalized, &config.change)?;

    Ok(PipelineResult {
        aligned,
        normalized,
        mask,
        ecc,
    })
}
