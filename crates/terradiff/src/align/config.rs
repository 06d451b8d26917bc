use serde::{Deserialize, Serialize};

/// Configuration for ECC homography alignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EccConfig {
    /// Maximum Gauss-Newton iterations.
    pub max_iters: usize,
    /// Convergence epsilon: stop when the correlation-coefficient change
    /// between iterations drops below this value.
    pub eps: f64,
    /// Minimum final correlation coefficient for a usable alignment.
    pub min_correlation: f64,
    /// Minimum |det H| for a non-degenerate transform.
    pub min_determinant: f64,
    /// Minimum fraction of reference pixels that must map inside the
    /// moving image.
    pub min_overlap_frac: f64,
}

impl Default for EccConfig {
    fn default() -> Self {
        Self {
            max_iters: 5000,
            eps: 1e-8,
            min_correlation: 0.5,
            min_determinant: 1e-6,
            min_overlap_frac: 0.1,
        }
    }
}
