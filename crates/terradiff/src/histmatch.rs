//! Histogram specification: remap a source image's per-channel intensity
//! distribution to match a reference distribution, preserving spatial
//! structure.
//!
//! Matching is nearest-CDF: each source level maps to the reference level
//! whose cumulative probability is closest. Ties break toward the
//! smallest reference level (a chosen convention, documented rather than
//! inferred), and the lookup is forced monotone non-decreasing so flat
//! histogram regions never produce tone inversions.

use image::RgbImage;

use crate::{check_same_shape, ShapeMismatch};

/// Cumulative distribution of one channel: level → cumulative probability.
///
/// Monotone non-decreasing with `cdf[255] == 1.0` (within float
/// tolerance) for any non-empty image.
pub fn channel_cdf(img: &RgbImage, channel: usize) -> [f64; 256] {
    let mut hist = [0u64; 256];
    for px in img.pixels() {
        hist[px[channel] as usize] += 1;
    }
    let total = (img.width() as u64 * img.height() as u64) as f64;

    let mut cdf = [0.0; 256];
    let mut cum = 0u64;
    for (level, &count) in hist.iter().enumerate() {
        cum += count;
        cdf[level] = cum as f64 / total;
    }
    cdf
}

/// Build the per-level lookup mapping source levels to reference levels
/// by nearest CDF value.
pub fn matching_lut(src_cdf: &[f64; 256], ref_cdf: &[f64; 256]) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for s in 0..256 {
        let target = src_cdf[s];
        let mut best = 0usize;
        let mut best_dist = f64::INFINITY;
        for (r, &c) in ref_cdf.iter().enumerate() {
            let dist = (c - target).abs();
            // Strict '<' keeps the smallest reference level on ties.
            if dist < best_dist {
                best_dist = dist;
                best = r;
            }
        }
        lut[s] = best as u8;
        // Carry forward through flat regions: never map a higher source
        // level below a lower one.
        if s > 0 && lut[s] < lut[s - 1] {
            lut[s] = lut[s - 1];
        }
    }
    lut
}

/// Remap `source` so each channel's intensity distribution matches
/// `reference`. Both images must share dimensions.
pub fn match_histograms(
    source: &RgbImage,
    reference: &RgbImage,
) -> Result<RgbImage, ShapeMismatch> {
    check_same_shape(reference.dimensions(), source.dimensions())?;

    let luts: [[u8; 256]; 3] = std::array::from_fn(|c| {
        matching_lut(&channel_cdf(source, c), &channel_cdf(reference, c))
    });

    let mut out = source.clone();
    for px in out.pixels_mut() {
        for c in 0..3 {
            px[c] = luts[c][px[c] as usize];
        }
    }
    Ok(out)
}
