//! Forward-additive ECC Gauss-Newton loop.

use image::GrayImage;
use nalgebra::{Matrix3, SMatrix, SVector};

use super::config::EccConfig;
use super::objective::{gradient_at, masked_mean, overlap_region};
use super::result::EccResult;
use super::AlignError;
use crate::color::gray_to_plane;
use crate::warp::warp_plane;

type Vec8 = SVector<f64, 8>;
type Mat8 = SMatrix<f64, 8, 8>;

/// Estimate the homography aligning `moving` onto `reference`.
///
/// Starts from the identity transform and iterates until the
/// correlation-coefficient improvement drops below `config.eps`, an
/// update worsens the correlation, or `config.max_iters` is reached.
/// The best iterate seen is what is returned, so a late overshoot never
/// degrades the estimate. The returned transform maps reference-grid
/// coordinates to moving-image coordinates, ready for direct use by the
/// resampler.
///
/// Both inputs must be single-channel; they may differ in size, and the
/// estimate is always expressed on the reference grid.
pub fn align_ecc(
    reference: &GrayImage,
    moving: &GrayImage,
    config: &EccConfig,
) -> Result<EccResult, AlignError> {
    let (w, h) = reference.dimensions();
    let (mw, mh) = moving.dimensions();
    if w < 3 || h < 3 || mw < 3 || mh < 3 {
        return Err(AlignError::EmptyOverlap { valid_frac: 0.0 });
    }

    let ref_plane = gray_to_plane(reference);
    let mov_plane = gray_to_plane(moving);
    let total = w as usize * h as usize;

    let mut hmat = Matrix3::<f64>::identity();
    let mut last_rho = -2.0;
    let mut best_rho = -2.0;
    let mut best_h = hmat;
    let mut iterations = 0usize;

    for _ in 0..config.max_iters {
        iterations += 1;

        let warped = warp_plane(&mov_plane, mw, mh, &hmat, w, h);
        let overlap = overlap_region(&warped, w, h);
        let valid_frac = overlap.indices.len() as f64 / total as f64;
        if valid_frac < config.min_overlap_frac {
            return Err(AlignError::EmptyOverlap { valid_frac });
        }

        let mean_r = masked_mean(&ref_plane, &overlap.indices);
        let mean_w = masked_mean(&warped.values, &overlap.indices);

        let mut hess = Mat8::zeros();
        let mut gt = Vec8::zeros();
        let mut gw = Vec8::zeros();
        let mut dot_rt = 0.0;
        let mut norm_r2 = 0.0;
        let mut norm_w2 = 0.0;

        for &i in &overlap.indices {
            let x = (i % w as usize) as f64;
            let y = (i / w as usize) as f64;
            let ir = ref_plane[i] - mean_r;
            let iw = warped.values[i] - mean_w;
            dot_rt += ir * iw;
            norm_r2 += ir * ir;
            norm_w2 += iw * iw;

            let (gx, gy) = gradient_at(&warped.values, w as usize, i);

            // Warp Jacobian at (x, y): with den = h20 x + h21 y + 1 and
            // (u, v) the mapped point, d(u,v)/dp combines with the image
            // gradient into one steepest-descent row per parameter.
            let den = hmat[(2, 0)] * x + hmat[(2, 1)] * y + hmat[(2, 2)];
            let u = (hmat[(0, 0)] * x + hmat[(0, 1)] * y + hmat[(0, 2)]) / den;
            let v = (hmat[(1, 0)] * x + hmat[(1, 1)] * y + hmat[(1, 2)]) / den;
            let gp = -(gx * u + gy * v);
            let g = Vec8::from_column_slice(&[
                gx * x / den,
                gx * y / den,
                gx / den,
                gy * x / den,
                gy * y / den,
                gy / den,
                gp * x / den,
                gp * y / den,
            ]);

            hess += g * g.transpose();
            gt += g * ir;
            gw += g * iw;
        }

        if norm_r2 <= f64::EPSILON || norm_w2 <= f64::EPSILON {
            return Err(AlignError::SingularSystem);
        }
        let rho = dot_rt / (norm_r2.sqrt() * norm_w2.sqrt());
        if rho > best_rho {
            best_rho = rho;
            best_h = hmat;
        }
        if (rho - last_rho).abs() < config.eps {
            break;
        }
        // The correlation fell below the best iterate: the local model is
        // no longer trusted, keep the best transform seen.
        if rho + config.eps < best_rho {
            break;
        }
        last_rho = rho;

        let lu = hess.lu();
        let hinv_gw = lu.solve(&gw).ok_or(AlignError::SingularSystem)?;

        // ECC update: scale the error projection so the step maximizes
        // correlation rather than plain squared error.
        let num = norm_w2 - gw.dot(&hinv_gw);
        let den = dot_rt - gt.dot(&hinv_gw);
        if den <= 0.0 {
            return Err(AlignError::Diverged);
        }
        let lambda = num / den;
        let rhs = gt * lambda - gw;
        let dp = lu.solve(&rhs).ok_or(AlignError::SingularSystem)?;

        hmat[(0, 0)] += dp[0];
        hmat[(0, 1)] += dp[1];
        hmat[(0, 2)] += dp[2];
        hmat[(1, 0)] += dp[3];
        hmat[(1, 1)] += dp[4];
        hmat[(1, 2)] += dp[5];
        hmat[(2, 0)] += dp[6];
        hmat[(2, 1)] += dp[7];
    }

    let det = best_h.determinant();
    if det.abs() < config.min_determinant {
        return Err(AlignError::DegenerateTransform { det });
    }
    if !best_rho.is_finite() || best_rho < config.min_correlation {
        return Err(AlignError::LowCorrelation {
            rho: best_rho,
            min_rho: config.min_correlation,
        });
    }

    Ok(EccResult::from_matrix(&best_h, best_rho, iterations))
}
