//! Binary morphology: structuring elements, erosion, dilation, opening.
//!
//! Operates on binary masks (pixels 0 or 255). Border handling follows
//! the usual constant-padding convention: out-of-bounds neighbors count
//! as foreground for erosion and background for dilation, so the border
//! itself neither shrinks nor grows masks.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Structuring-element shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelShape {
    /// Full rectangle.
    Rect,
    /// Center row and center column.
    Cross,
    /// Per-row rasterized ellipse. A 3×3 ellipse equals the 3×3 cross.
    Ellipse,
}

/// A flat structuring element with an implicit center anchor.
#[derive(Debug, Clone)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    mask: Vec<bool>,
}

impl StructuringElement {
    /// Build a `width × height` element of the given shape. Zero sizes
    /// are clamped to 1.
    pub fn new(shape: KernelShape, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let (cx, cy) = ((width / 2) as i64, (height / 2) as i64);
        let mut mask = vec![false; (width * height) as usize];

        match shape {
            KernelShape::Rect => mask.fill(true),
            KernelShape::Cross => {
                for y in 0..height as i64 {
                    for x in 0..width as i64 {
                        if x == cx || y == cy {
                            mask[(y * width as i64 + x) as usize] = true;
                        }
                    }
                }
            }
            KernelShape::Ellipse => {
                // Row-wise rasterization: each row spans the horizontal
                // extent of the inscribed ellipse at that height.
                let ry = cy.max(1) as f64;
                for y in 0..height as i64 {
                    let dy = (y - cy) as f64;
                    if dy.abs() > ry {
                        continue;
                    }
                    let dx = if height <= 1 {
                        cx as f64
                    } else {
                        cx as f64 * (1.0 - (dy * dy) / (ry * ry)).max(0.0).sqrt()
                    };
                    let x0 = (cx as f64 - dx).round() as i64;
                    let x1 = (cx as f64 + dx).round() as i64;
                    for x in x0.max(0)..=x1.min(width as i64 - 1) {
                        mask[(y * width as i64 + x) as usize] = true;
                    }
                }
            }
        }

        Self {
            width,
            height,
            mask,
        }
    }

    /// Square element of the given shape and side length.
    pub fn square(shape: KernelShape, size: u32) -> Self {
        Self::new(shape, size, size)
    }

    fn offsets(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        let (cx, cy) = ((self.width / 2) as i64, (self.height / 2) as i64);
        self.mask.iter().enumerate().filter_map(move |(i, &on)| {
            on.then(|| {
                let x = (i as i64) % i64::from(self.width);
                let y = (i as i64) / i64::from(self.width);
                (x - cx, y - cy)
            })
        })
    }
}

fn apply<F>(img: &GrayImage, se: &StructuringElement, oob: u8, fold: F) -> GrayImage
where
    F: Fn(u8, u8) -> u8,
{
    let (w, h) = img.dimensions();
    let offsets: Vec<(i64, i64)> = se.offsets().collect();
    let mut out = GrayImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let mut acc = oob;
            for &(dx, dy) in &offsets {
                let sx = i64::from(x) + dx;
                let sy = i64::from(y) + dy;
                let v = if sx >= 0 && sy >= 0 && sx < i64::from(w) && sy < i64::from(h) {
                    img.get_pixel(sx as u32, sy as u32)[0]
                } else {
                    oob
                };
                acc = fold(acc, v);
            }
            out.put_pixel(x, y, Luma([acc]));
        }
    }
    out
}

/// Erode: minimum over the structuring element.
pub fn erode(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    apply(img, se, 255, u8::min)
}

/// Dilate: maximum over the structuring element.
pub fn dilate(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    apply(img, se, 0, u8::max)
}

/// Morphological opening: erosion followed by dilation. Removes
/// foreground regions smaller than the structuring element while
/// preserving larger shapes.
pub fn open(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    dilate(&erode(img, se), se)
}
