//! Colorspace conversion: RGB → grayscale and u8 ↔ f64 plane bridges.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Rec.601 luma of an RGB pixel, rounded to the nearest level.
#[inline]
pub fn luma(px: Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y.round().clamp(0.0, 255.0) as u8
}

/// Convert an RGB image to 8-bit grayscale using Rec.601 weights.
pub fn rgb_to_gray(img: &RgbImage) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    for (x, y, px) in img.enumerate_pixels() {
        out.put_pixel(x, y, Luma([luma(*px)]));
    }
    out
}

/// Flatten a grayscale image into a row-major f64 plane in [0, 255].
pub(crate) fn gray_to_plane(img: &GrayImage) -> Vec<f64> {
    img.as_raw().iter().map(|&v| f64::from(v)).collect()
}
