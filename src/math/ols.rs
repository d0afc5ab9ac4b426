//! Weighted least squares.
//!
//! Besides the χ² sweep we solve the log-linear form of the same problem in
//! closed form:
//!
//! ```text
//! minimize Σ n_i (ln n_i - (a - c_i / τ))^2      over non-empty bins
//! ```
//!
//! The weights `n_i = (n_i / σ_i)^2` are the sweep's χ² weights. Unlike the
//! sweep, the intercept `a` is free, so this is a cross-check of the LS
//! estimate that does not depend on the event-count normalization.
//!
//! Implementation choices:
//! - We scale rows by `sqrt(w_i)` and solve an ordinary least squares problem.
//! - SVD handles the tall (bins × 2) design matrix robustly.

use nalgebra::{DMatrix, DVector};

use crate::fit::histogram::Histogram;

/// Closed-form log-linear fit of a decay histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLinearFit {
    pub tau: f64,
    /// Fitted `ln` of the expected count at `t = 0`.
    pub intercept: f64,
    pub bins_used: usize,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `ln n_i = a - c_i / τ` with weights `n_i`.
///
/// Returns `None` with fewer than two non-empty bins or a non-decaying slope.
pub fn fit_log_linear(hist: &Histogram) -> Option<LogLinearFit> {
    let rows: Vec<(f64, f64, f64)> = hist
        .counts()
        .iter()
        .zip(hist.centers())
        .filter(|&(&n, _)| n > 0)
        .map(|(&n, &c)| (c, (n as f64).ln(), n as f64))
        .collect();

    if rows.len() < 2 {
        return None;
    }

    let mut xw = DMatrix::<f64>::zeros(rows.len(), 2);
    let mut yw = DVector::<f64>::zeros(rows.len());
    for (i, &(c, ln_n, w)) in rows.iter().enumerate() {
        let sw = w.sqrt();
        xw[(i, 0)] = sw;
        xw[(i, 1)] = c * sw;
        yw[i] = ln_n * sw;
    }

    let beta = solve_least_squares(&xw, &yw)?;
    let slope = beta[1];
    if !(slope.is_finite() && slope < 0.0) {
        tracing::debug!(slope, "log-linear fit has no decaying slope");
        return None;
    }

    Some(LogLinearFit {
        tau: -1.0 / slope,
        intercept: beta[0],
        bins_used: rows.len(),
    })
}
