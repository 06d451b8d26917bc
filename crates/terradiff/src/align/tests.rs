use image::{GrayImage, Luma};
use nalgebra::Matrix3;

use super::*;
use crate::test_utils::{blur_gray, draw_blob_scene_gray};
use crate::warp::{translation, warp_gray};

/// Blurred checkerboard: texture everywhere, smooth gradients.
fn textured_scene(w: u32, h: u32) -> GrayImage {
    let mut img = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = if (x / 8 + y / 8) % 2 == 0 { 40 } else { 200 };
            img.put_pixel(x, y, Luma([v]));
        }
    }
    blur_gray(&img, 2.0)
}

fn assert_close(h: &Matrix3<f64>, expected: &Matrix3<f64>, tol: f64) {
    for r in 0..3 {
        for c in 0..3 {
            assert!(
                (h[(r, c)] - expected[(r, c)]).abs() <= tol,
                "entry ({r},{c}): {} vs {}",
                h[(r, c)],
                expected[(r, c)]
            );
        }
    }
}

#[test]
fn identity_alignment_on_self() {
    let img = draw_blob_scene_gray(80, 60);
    let result = align_ecc(&img, &img, &EccConfig::default()).expect("alignment");
    assert_close(&result.matrix(), &Matrix3::identity(), 1e-6);
    assert!((result.correlation - 1.0).abs() < 1e-9);
}

#[test]
fn recovers_integer_translation() {
    let scene = textured_scene(96, 72);
    // Content shifted by (-2, -1): scene pixel (x, y) lands at (x-2, y-1).
    let moving = warp_gray(&scene, &translation(2.0, 1.0), 96, 72);
    let result = align_ecc(&scene, &moving, &EccConfig::default()).expect("alignment");
    assert_close(&result.matrix(), &translation(-2.0, -1.0), 0.15);
    assert!(result.correlation > 0.99);
}

#[test]
fn recovers_fractional_translation() {
    let scene = draw_blob_scene_gray(96, 72);
    let moving = warp_gray(&scene, &translation(1.5, -0.8), 96, 72);
    let result = align_ecc(&scene, &moving, &EccConfig::default()).expect("alignment");
    assert_close(&result.matrix(), &translation(-1.5, 0.8), 0.2);
}

#[test]
fn recovers_small_rotation() {
    let scene = textured_scene(96, 72);
    let (cx, cy) = (47.5, 35.5);
    let a = 1.5f64.to_radians();
    let (s, c) = a.sin_cos();
    // Rotation about the image center, output → input convention.
    let rot = Matrix3::new(
        c,
        -s,
        cx - c * cx + s * cy,
        s,
        c,
        cy - s * cx - c * cy,
        0.0,
        0.0,
        1.0,
    );
    let moving = warp_gray(
        &scene,
        &rot.try_inverse().expect("rotation invertible"),
        96,
        72,
    );
    let result = align_ecc(&scene, &moving, &EccConfig::default()).expect("alignment");
    assert_close(&result.matrix(), &rot, 0.1);
    assert!(result.correlation > 0.98);
}

#[test]
fn constant_moving_image_fails() {
    let scene = draw_blob_scene_gray(60, 40);
    let flat = GrayImage::from_pixel(60, 40, Luma([128]));
    let err = align_ecc(&scene, &flat, &EccConfig::default()).unwrap_err();
    assert_eq!(err, AlignError::SingularSystem);
}

#[test]
fn tiny_moving_image_reports_empty_overlap() {
    let scene = draw_blob_scene_gray(100, 80);
    let tiny = draw_blob_scene_gray(10, 10);
    let err = align_ecc(&scene, &tiny, &EccConfig::default()).unwrap_err();
    assert!(matches!(err, AlignError::EmptyOverlap { .. }));
}

#[test]
fn returns_best_iterate_not_last() {
    // A long run must never report a worse correlation than the
    // single-evaluation baseline at the identity start.
    let scene = textured_scene(96, 72);
    let moving = warp_gray(&scene, &translation(2.0, 1.0), 96, 72);

    let baseline_config = EccConfig {
        max_iters: 1,
        eps: 0.0,
        min_correlation: 0.0,
        ..EccConfig::default()
    };
    let baseline = align_ecc(&scene, &moving, &baseline_config).expect("baseline");
    let full = align_ecc(&scene, &moving, &EccConfig::default()).expect("alignment");

    assert!(
        full.correlation >= baseline.correlation,
        "full run correlation {} fell below identity baseline {}",
        full.correlation,
        baseline.correlation
    );
    assert!(full.iterations < 5000, "iteration cap reached without converging");
}

#[test]
fn iteration_cap_is_respected() {
    let scene = textured_scene(64, 48);
    let moving = warp_gray(&scene, &translation(2.0, 0.0), 64, 48);
    let config = EccConfig {
        max_iters: 3,
        eps: 0.0,
        min_correlation: 0.0,
        ..EccConfig::default()
    };
    let result = align_ecc(&scene, &moving, &config).expect("alignment");
    assert_eq!(result.iterations, 3);
}
