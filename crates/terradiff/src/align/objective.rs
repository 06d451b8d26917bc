//! Per-iteration ingredients of the ECC objective: the valid-overlap
//! accumulation set, masked means, and warped-image gradients.

use crate::warp::WarpedPlane;

/// Pixels the current iteration accumulates over: interior pixels whose
/// full 4-neighborhood mapped inside the moving image, so central
/// differences are well defined and fill values never leak in.
pub(super) struct Overlap {
    pub indices: Vec<usize>,
}

pub(super) fn overlap_region(warped: &WarpedPlane, w: u32, h: u32) -> Overlap {
    let (w, h) = (w as usize, h as usize);
    if w < 3 || h < 3 {
        return Overlap { indices: Vec::new() };
    }
    let mut indices = Vec::with_capacity(warped.n_valid);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            if warped.valid[i]
                && warped.valid[i - 1]
                && warped.valid[i + 1]
                && warped.valid[i - w]
                && warped.valid[i + w]
            {
                indices.push(i);
            }
        }
    }
    Overlap { indices }
}

pub(super) fn masked_mean(plane: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| plane[i]).sum::<f64>() / indices.len() as f64
}

/// Central-difference gradient at index `i` of a row-major plane.
/// Caller guarantees `i` is an interior pixel.
#[inline]
pub(super) fn gradient_at(values: &[f64], w: usize, i: usize) -> (f64, f64) {
    (
        (values[i + 1] - values[i - 1]) * 0.5,
        (values[i + w] - values[i - w]) * 0.5,
    )
}
