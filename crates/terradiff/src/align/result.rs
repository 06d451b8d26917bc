use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Result of a successful ECC alignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EccResult {
    /// Estimated homography (3×3, row-major), mapping reference-grid
    /// coordinates to moving-image coordinates.
    pub homography: [[f64; 3]; 3],
    /// Final enhanced correlation coefficient in [-1, 1].
    pub correlation: f64,
    /// Number of Gauss-Newton iterations executed.
    pub iterations: usize,
}

impl EccResult {
    pub(crate) fn from_matrix(h: &Matrix3<f64>, correlation: f64, iterations: usize) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = h[(r, c)];
            }
        }
        Self {
            homography: rows,
            correlation,
            iterations,
        }
    }

    /// The homography as an `nalgebra` matrix.
    pub fn matrix(&self) -> Matrix3<f64> {
        let m = &self.homography;
        Matrix3::new(
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        )
    }
}
