//! Shared test utilities for image-based unit tests.
//!
//! Synthetic scenes are smooth by construction (Gaussian blobs) so the
//! ECC optimizer has usable gradients everywhere, and the background is
//! dark so border fill after warping stays close to scene content.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Render a deterministic scene of soft colored blobs on a dark background.
pub(crate) fn draw_blob_scene(w: u32, h: u32) -> RgbImage {
    // (center_frac_x, center_frac_y, sigma_frac, [r, g, b] amplitude)
    const BLOBS: [(f64, f64, f64, [f64; 3]); 4] = [
        (0.30, 0.35, 0.16, [180.0, 120.0, 60.0]),
        (0.70, 0.30, 0.12, [60.0, 170.0, 110.0]),
        (0.55, 0.70, 0.20, [110.0, 90.0, 190.0]),
        (0.20, 0.75, 0.10, [150.0, 150.0, 40.0]),
    ];
    const BG: f64 = 12.0;

    let mut img = RgbImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [BG, BG, BG];
            for &(cx, cy, sf, amp) in &BLOBS {
                let dx = f64::from(x) - cx * f64::from(w);
                let dy = f64::from(y) - cy * f64::from(h);
                let sigma = sf * f64::from(w.min(h));
                let g = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
                for c in 0..3 {
                    acc[c] += amp[c] * g;
                }
            }
            let px = [
                acc[0].round().clamp(0.0, 255.0) as u8,
                acc[1].round().clamp(0.0, 255.0) as u8,
                acc[2].round().clamp(0.0, 255.0) as u8,
            ];
            img.put_pixel(x, y, Rgb(px));
        }
    }
    img
}

/// Blob scene overlaid with a low-amplitude smooth plaid, so intensity
/// gradients exist everywhere and the alignment objective has a single
/// well-conditioned optimum even in flat background areas.
pub(crate) fn draw_textured_scene(w: u32, h: u32) -> RgbImage {
    let mut img = draw_blob_scene(w, h);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let fx = f64::from(x);
        let fy = f64::from(y);
        let t = [
            15.0 * (fx / 5.1).sin() * (fy / 7.3).cos(),
            12.0 * (fx / 6.7).cos() * (fy / 5.9).sin(),
            10.0 * ((fx / 4.9).sin() + (fy / 6.1).sin()) * 0.5,
        ];
        for c in 0..3 {
            px[c] = (f64::from(px[c]) + t[c]).round().clamp(0.0, 255.0) as u8;
        }
    }
    img
}

/// Grayscale rendition of [`draw_blob_scene`].
pub(crate) fn draw_blob_scene_gray(w: u32, h: u32) -> GrayImage {
    crate::color::rgb_to_gray(&draw_blob_scene(w, h))
}

/// Paint a filled rectangle with a constant additive intensity delta.
pub(crate) fn paint_rect(img: &mut RgbImage, x0: u32, y0: u32, rw: u32, rh: u32, delta: i16) {
    for y in y0..(y0 + rh).min(img.height()) {
        for x in x0..(x0 + rw).min(img.width()) {
            let mut px = *img.get_pixel(x, y);
            for c in 0..3 {
                px[c] = (i16::from(px[c]) + delta).clamp(0, 255) as u8;
            }
            img.put_pixel(x, y, px);
        }
    }
}

/// Gaussian-blur a `GrayImage` via `imageproc`.
pub(crate) fn blur_gray(img: &GrayImage, sigma: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut f = image::ImageBuffer::<Luma<f32>, Vec<f32>>::new(w, h);
    for y in 0..h {
        for x in 0..w {
            f.put_pixel(x, y, Luma([f32::from(img.get_pixel(x, y)[0]) / 255.0]));
        }
    }
    let blurred = imageproc::filter::gaussian_blur_f32(&f, sigma);
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = blurred.get_pixel(x, y)[0].clamp(0.0, 1.0);
            out.put_pixel(x, y, Luma([(v * 255.0).round() as u8]));
        }
    }
    out
}

/// Count pixels set to 255 in a binary mask.
pub(crate) fn count_set(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] == 255).count()
}
