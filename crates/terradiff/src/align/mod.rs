//! ECC homography alignment.
//!
//! Estimates a global projective transform that registers a "moving"
//! grayscale image onto a "reference" grayscale image by maximizing the
//! enhanced correlation coefficient (Evangelidis & Psarakis): the
//! normalized cross-correlation of the zero-mean images, which is
//! invariant to affine brightness/contrast differences between the two
//! captures.
//!
//! Forward-additive Gauss-Newton over the 8 free homography parameters
//! (element [2][2] fixed at 1). Each iteration warps the moving image
//! onto the reference grid, builds steepest-descent images from the warp
//! Jacobian and the warped-image gradient, and solves an 8×8 system for
//! an additive parameter update. Statistics are accumulated over the
//! valid-overlap mask only, so out-of-bounds fill never biases the
//! objective. The loop keeps the best-correlated iterate and stops once
//! an update fails to improve on it, so the estimate never drifts past
//! its optimum.

mod config;
mod estimator;
mod objective;
mod result;

pub use config::EccConfig;
pub use estimator::align_ecc;
pub use result::EccResult;

#[cfg(test)]
mod tests;

/// Alignment failure. The caller must abort processing of the image
/// pair; a degenerate transform is never returned.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignError {
    /// The 8×8 Gauss-Newton system was singular (typically a textureless
    /// or constant moving image).
    SingularSystem,
    /// The ECC update denominator was non-positive: the images appear
    /// uncorrelated or non-overlapping.
    Diverged,
    /// The optimizer produced a transform with a near-zero determinant.
    DegenerateTransform { det: f64 },
    /// The optimizer converged, but the final correlation is below the
    /// usability threshold.
    LowCorrelation { rho: f64, min_rho: f64 },
    /// The valid-overlap region fell below the configured fraction of
    /// the reference image.
    EmptyOverlap { valid_frac: f64 },
}

impl std::fmt::Display for AlignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingularSystem => write!(f, "singular normal equations in ECC update"),
            Self::Diverged => {
                write!(f, "ECC diverged: images may be uncorrelated or non-overlapping")
            }
            Self::DegenerateTransform { det } => {
                write!(f, "degenerate transform: |det| = {:.3e}", det.abs())
            }
            Self::LowCorrelation { rho, min_rho } => {
                write!(f, "correlation {rho:.4} below usability threshold {min_rho:.4}")
            }
            Self::EmptyOverlap { valid_frac } => {
                write!(f, "valid overlap fraction {valid_frac:.3} too small")
            }
        }
    }
}

impl std::error::Error for AlignError {}
