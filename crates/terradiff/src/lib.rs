//! terradiff — change detection between two images of the same scene.
//!
//! Compares a "moving" image (e.g. a later drone overflight) against a
//! "reference" image, compensating for viewpoint shift and lighting
//! differences before differencing pixels. The pipeline stages are:
//!
//! 1. **Align** – ECC (enhanced correlation coefficient) estimation of a
//!    global projective transform, Gauss-Newton over 8 homography
//!    parameters, robust to affine brightness/contrast differences.
//! 2. **Warp** – bilinear resampling of the moving image onto the
//!    reference pixel grid.
//! 3. **Normalize** – per-channel histogram specification so the aligned
//!    image's intensity distribution matches the reference.
//! 4. **Detect** – absolute differencing, luma reduction, binary
//!    thresholding, morphological opening into a clean change mask.
//!
//! The crate is pure computation: no file I/O, no logging. Persistence
//! and visualization belong to the driver (see `terradiff-cli`).

pub mod align;
pub mod color;
pub mod detect;
pub mod histmatch;
pub mod morph;
pub mod pipeline;
pub mod warp;

#[cfg(test)]
pub(crate) mod test_utils;

pub use align::{align_ecc, AlignError, EccConfig, EccResult};
pub use detect::{detect_changes, ChangeConfig};
pub use histmatch::match_histograms;
pub use morph::{KernelShape, StructuringElement};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineError, PipelineResult};

/// Dimension/channel disagreement between two images that a stage
/// requires to share a shape.
///
/// This is a usage error: stages downstream of alignment only accept
/// images already resampled onto the reference grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMismatch {
    /// Expected [width, height].
    pub expected: [u32; 2],
    /// Actual [width, height].
    pub got: [u32; 2],
}

impl std::fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "shape mismatch: expected {}x{}, got {}x{}",
            self.expected[0], self.expected[1], self.got[0], self.got[1]
        )
    }
}

impl std::error::Error for ShapeMismatch {}

pub(crate) fn check_same_shape(
    a: (u32, u32),
    b: (u32, u32),
) -> Result<(), ShapeMismatch> {
    if a != b {
        return Err(ShapeMismatch {
            expected: [a.0, a.1],
            got: [b.0, b.1],
        });
    }
    Ok(())
}
