use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{GrayImage, Luma, Rgb, RgbImage};
use nalgebra::Matrix3;

use terradiff::warp::{translation, warp_gray, warp_rgb};
use terradiff::{align_ecc, detect_changes, match_histograms, ChangeConfig, EccConfig};

fn blob_scene_rgb(w: u32, h: u32) -> RgbImage {
    let mut img = RgbImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let dx = f64::from(x) - 0.4 * f64::from(w);
            let dy = f64::from(y) - 0.5 * f64::from(h);
            let sigma = 0.15 * f64::from(w.min(h));
            let g = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            // Same rounding as the library's test scenes, so bench inputs
            // stay comparable with the unit-test fixtures.
            img.put_pixel(
                x,
                y,
                Rgb([
                    (12.0 + 180.0 * g).round().clamp(0.0, 255.0) as u8,
                    (12.0 + 120.0 * g).round().clamp(0.0, 255.0) as u8,
                    (12.0 + 60.0 * g).round().clamp(0.0, 255.0) as u8,
                ]),
            );
        }
    }
    img
}

fn blob_scene_gray(w: u32, h: u32) -> GrayImage {
    let rgb = blob_scene_rgb(w, h);
    let mut out = GrayImage::new(w, h);
    for (x, y, p) in rgb.enumerate_pixels() {
        let v = 0.299 * f64::from(p[0]) + 0.587 * f64::from(p[1]) + 0.114 * f64::from(p[2]);
        out.put_pixel(x, y, Luma([v.round() as u8]));
    }
    out
}

fn bench_warp(c: &mut Criterion) {
    let img = blob_scene_rgb(320, 240);
    let h = Matrix3::new(1.0, 0.01, 2.5, -0.008, 1.0, -1.5, 1e-5, -1e-5, 1.0);
    c.bench_function("warp_rgb_320x240", |b| {
        b.iter(|| warp_rgb(black_box(&img), black_box(&h), 320, 240))
    });
}

fn bench_align(c: &mut Criterion) {
    let reference = blob_scene_gray(160, 120);
    let moving = warp_gray(&reference, &translation(2.0, 1.0), 160, 120);
    let config = EccConfig {
        max_iters: 50,
        ..EccConfig::default()
    };
    c.bench_function("align_ecc_160x120", |b| {
        b.iter(|| align_ecc(black_box(&reference), black_box(&moving), &config))
    });
}

fn bench_normalize_and_detect(c: &mut Criterion) {
    let reference = blob_scene_rgb(320, 240);
    let mut candidate = reference.clone();
    for px in candidate.pixels_mut() {
        px[0] = px[0].saturating_add(30);
    }
    c.bench_function("match_histograms_320x240", |b| {
        b.iter(|| match_histograms(black_box(&candidate), black_box(&reference)))
    });
    c.bench_function("detect_changes_320x240", |b| {
        b.iter(|| detect_changes(black_box(&reference), black_box(&candidate), &ChangeConfig::default()))
    });
}

criterion_group!(benches, bench_warp, bench_align, bench_normalize_and_detect);
criterion_main!(benches);
