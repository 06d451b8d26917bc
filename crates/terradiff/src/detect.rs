//! Change detection between two registered, normalized images.
//!
//! Per-pixel absolute difference across channels, reduced to a single
//! luma-weighted scalar, thresholded into a binary mask, then cleaned by
//! morphological opening to drop isolated noise pixels.

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::color::luma;
use crate::morph::{open, KernelShape, StructuringElement};
use crate::{check_same_shape, ShapeMismatch};

/// Configuration for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeConfig {
    /// Binary threshold on the luma difference (strict: a pixel is
    /// flagged when its difference exceeds this value).
    pub threshold: u8,
    /// Structuring-element shape for the opening pass.
    pub kernel_shape: KernelShape,
    /// Structuring-element side length in pixels.
    pub kernel_size: u32,
}

impl Default for ChangeConfig {
    fn default() -> Self {
        Self {
            threshold: 65,
            kernel_shape: KernelShape::Ellipse,
            kernel_size: 3,
        }
    }
}

/// Luma of the per-channel absolute difference of two pixels.
fn diff_luma(a: Rgb<u8>, b: Rgb<u8>) -> u8 {
    let d = Rgb([
        a[0].abs_diff(b[0]),
        a[1].abs_diff(b[1]),
        a[2].abs_diff(b[2]),
    ]);
    luma(d)
}

/// Compare `reference` against a registered, normalized `candidate` and
/// return the binary change mask (0 or 255, reference-sized).
pub fn detect_changes(
    reference: &RgbImage,
    candidate: &RgbImage,
    config: &ChangeConfig,
) -> Result<GrayImage, ShapeMismatch> {
    check_same_shape(reference.dimensions(), candidate.dimensions())?;

    let (w, h) = reference.dimensions();
    let mut binary = GrayImage::new(w, h);
    for (x, y, px) in reference.enumerate_pixels() {
        let d = diff_luma(*px, *candidate.get_pixel(x, y));
        let v = if d > config.threshold { 255 } else { 0 };
        binary.put_pixel(x, y, Luma([v]));
    }

    let se = StructuringElement::square(config.kernel_shape, config.kernel_size);
    Ok(open(&binary, &se))
}
