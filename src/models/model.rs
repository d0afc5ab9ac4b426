//! Exponential decay model.
//!
//! For a bin of width `w` centred at `c`, the expected number of decays out of
//! `S` events with mean lifetime `τ` is:
//!
//! ```text
//! expected(c) = (S * w / τ) * exp(-c / τ)
//! ```
//!
//! `S` and `w` come from a [`Normalization`] fixed when the histogram is built;
//! they are threaded through unchanged so `lnL`/`χ²` stay comparable across τ.

use crate::domain::ModelCurve;
use crate::error::AppError;
use crate::fit::histogram::Histogram;

/// Constants the model is normalised against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Event count (3000 for the lab runs).
    pub sample_size: f64,
    /// Histogram bin width in µs.
    pub bin_width: f64,
}

impl Normalization {
    pub fn new(sample_size: f64, bin_width: f64) -> Result<Self, AppError> {
        if !(sample_size.is_finite() && sample_size > 0.0) {
            return Err(AppError::config(format!("Invalid sample size: {sample_size} (must be > 0).")));
        }
        if !(bin_width.is_finite() && bin_width > 0.0) {
            return Err(AppError::config(format!("Invalid bin width: {bin_width} (must be > 0).")));
        }
        Ok(Self {
            sample_size,
            bin_width,
        })
    }

    /// Normalization for a histogram built with the given event count.
    pub fn for_histogram(hist: &Histogram, sample_size: f64) -> Result<Self, AppError> {
        Self::new(sample_size, hist.bin_width())
    }
}

/// Expected count at one bin center.
///
/// Unchecked: callers guarantee `tau > 0` (the tau grid never yields 0).
#[inline]
pub fn expected_count(center: f64, tau: f64, norm: &Normalization) -> f64 {
    (norm.sample_size * norm.bin_width / tau) * (-center / tau).exp()
}

/// Expected counts at every bin center.
pub fn expected_counts(centers: &[f64], tau: f64, norm: &Normalization) -> Result<Vec<f64>, AppError> {
    if !(tau.is_finite() && tau > 0.0) {
        return Err(AppError::degenerate_model(tau));
    }
    Ok(centers.iter().map(|&c| expected_count(c, tau, norm)).collect())
}

/// Model curve over a histogram's bin centers.
pub fn model_curve(hist: &Histogram, tau: f64, norm: &Normalization) -> Result<ModelCurve, AppError> {
    Ok(ModelCurve {
        tau,
        expected: expected_counts(hist.centers(), tau, norm)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn lab_norm() -> Normalization {
        Normalization::new(3000.0, 0.05).unwrap()
    }

    #[test]
    fn regression_fixture_at_tau_2_5() {
        let got = expected_counts(&[0.025, 0.075, 0.125], 2.5, &lab_norm()).unwrap();
        let want = [59.402990024950086, 58.22673201291049, 57.073765470042844];
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-9, "got {g}, want {w}");
        }
    }

    #[test]
    fn non_positive_tau_is_degenerate() {
        for tau in [0.0, -1.0, f64::NAN] {
            let err = expected_counts(&[0.1], tau, &lab_norm()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DegenerateModel);
        }
    }

    #[test]
    fn expected_counts_sum_to_sample_size() {
        // Fine bins over a range much longer than tau: midpoint sum ≈ integral.
        let width = 0.01;
        let centers: Vec<f64> = (0..4000).map(|i| (i as f64 + 0.5) * width).collect();
        let norm = Normalization::new(3000.0, width).unwrap();
        for tau in [0.5, 1.0, 2.2, 3.7] {
            let total: f64 = expected_counts(&centers, tau, &norm).unwrap().iter().sum();
            let tail = (-40.0_f64 / tau).exp();
            let want = 3000.0 * (1.0 - tail);
            assert!((total - want).abs() / want < 1e-3, "tau={tau}: {total} vs {want}");
        }
    }

    #[test]
    fn normalization_rejects_bad_constants() {
        assert!(Normalization::new(0.0, 0.05).is_err());
        assert!(Normalization::new(3000.0, 0.0).is_err());
        assert!(Normalization::new(f64::INFINITY, 0.05).is_err());
    }
}
