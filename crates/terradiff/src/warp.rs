//! Projective transforms and bilinear resampling.
//!
//! Transforms follow one fixed direction crate-wide: a 3×3 homography `H`
//! maps *output* (reference-grid) coordinates to *input* (source-image)
//! coordinates. The resampler therefore applies `H` directly as an
//! inverse map; callers never need to invert it first.

use image::{GrayImage, Luma, Rgb, RgbImage};
use nalgebra::Matrix3;

/// Project a 2D point through a 3×3 homography: H * [x, y, 1]^T → [u, v].
pub fn project(h: &Matrix3<f64>, x: f64, y: f64) -> [f64; 2] {
    let den = h[(2, 0)] * x + h[(2, 1)] * y + h[(2, 2)];
    if den.abs() < 1e-15 {
        return [f64::NAN, f64::NAN];
    }
    [
        (h[(0, 0)] * x + h[(0, 1)] * y + h[(0, 2)]) / den,
        (h[(1, 0)] * x + h[(1, 1)] * y + h[(1, 2)]) / den,
    ]
}

/// Bilinear sample of a row-major f64 plane at fractional coordinates.
///
/// Returns `None` when `(x, y)` lies outside `[0, w-1] × [0, h-1]`.
/// Exact at integer coordinates: no interpolation residue under the
/// identity transform.
#[inline]
pub(crate) fn bilinear(plane: &[f64], w: u32, h: u32, x: f64, y: f64) -> Option<f64> {
    if w == 0 || h == 0 {
        return None;
    }
    if !(x >= 0.0 && y >= 0.0 && x <= f64::from(w - 1) && y <= f64::from(h - 1)) {
        return None;
    }
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - f64::from(x0);
    let fy = y - f64::from(y0);

    let idx = |xx: u32, yy: u32| (yy as usize) * (w as usize) + xx as usize;
    let v00 = plane[idx(x0, y0)];
    let v10 = plane[idx(x1, y0)];
    let v01 = plane[idx(x0, y1)];
    let v11 = plane[idx(x1, y1)];

    let top = v00 + fx * (v10 - v00);
    let bot = v01 + fx * (v11 - v01);
    Some(top + fy * (bot - top))
}

/// A warped grayscale plane with a per-pixel validity flag.
///
/// `valid[i]` is false where the inverse map fell outside the source
/// image; `values[i]` is zero there.
pub(crate) struct WarpedPlane {
    pub values: Vec<f64>,
    pub valid: Vec<bool>,
    pub n_valid: usize,
}

/// Warp an f64 plane onto an `out_w × out_h` grid through `h`
/// (output → input mapping), bilinear sampling, zero fill.
pub(crate) fn warp_plane(
    src: &[f64],
    src_w: u32,
    src_h: u32,
    h: &Matrix3<f64>,
    out_w: u32,
    out_h: u32,
) -> WarpedPlane {
    let n = out_w as usize * out_h as usize;
    let mut values = vec![0.0; n];
    let mut valid = vec![false; n];
    let mut n_valid = 0usize;

    for oy in 0..out_h {
        for ox in 0..out_w {
            let [sx, sy] = project(h, f64::from(ox), f64::from(oy));
            if let Some(v) = bilinear(src, src_w, src_h, sx, sy) {
                let i = oy as usize * out_w as usize + ox as usize;
                values[i] = v;
                valid[i] = true;
                n_valid += 1;
            }
        }
    }

    WarpedPlane {
        values,
        valid,
        n_valid,
    }
}

/// Resample an RGB image onto an `out_w × out_h` grid through `h`
/// (output → input mapping). Out-of-bounds pixels are black.
pub fn warp_rgb(src: &RgbImage, h: &Matrix3<f64>, out_w: u32, out_h: u32) -> RgbImage {
    let (sw, sh) = src.dimensions();
    let planes: [Vec<f64>; 3] = [
        src.pixels().map(|p| f64::from(p[0])).collect(),
        src.pixels().map(|p| f64::from(p[1])).collect(),
        src.pixels().map(|p| f64::from(p[2])).collect(),
    ];

    let mut out = RgbImage::new(out_w, out_h);
    for oy in 0..out_h {
        for ox in 0..out_w {
            let [sx, sy] = project(h, f64::from(ox), f64::from(oy));
            let mut px = [0u8; 3];
            for (c, plane) in planes.iter().enumerate() {
                if let Some(v) = bilinear(plane, sw, sh, sx, sy) {
                    px[c] = v.round().clamp(0.0, 255.0) as u8;
                }
            }
            out.put_pixel(ox, oy, Rgb(px));
        }
    }
    out
}

/// Resample a grayscale image onto an `out_w × out_h` grid through `h`
/// (output → input mapping). Out-of-bounds pixels are black.
pub fn warp_gray(src: &GrayImage, h: &Matrix3<f64>, out_w: u32, out_h: u32) -> GrayImage {
    let (sw, sh) = src.dimensions();
    let plane: Vec<f64> = src.as_raw().iter().map(|&v| f64::from(v)).collect();

    let mut out = GrayImage::new(out_w, out_h);
    for oy in 0..out_h {
        for ox in 0..out_w {
            let [sx, sy] = project(h, f64::from(ox), f64::from(oy));
            let v = bilinear(&plane, sw, sh, sx, sy).unwrap_or(0.0);
            out.put_pixel(ox, oy, Luma([v.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Translation homography in the crate's output → input convention:
/// warping by `translation(dx, dy)` shifts image content by `(-dx, -dy)`.
pub fn translation(dx: f64, dy: f64) -> Matrix3<f64> {
    Matrix3::new(1.0, 0.0, dx, 0.0, 1.0, dy, 0.0, 0.0, 1.0)
}
