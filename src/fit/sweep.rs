//! Objective sweep over the tau grid.
//!
//! For every τ step we evaluate the decay model at each bin center and
//! accumulate:
//!
//! - the Poisson log-likelihood (factorial term dropped)
//!
//!   ```text
//!   lnL(τ) = Σ_i n_i ln(y_i) - y_i
//!   ```
//!
//! - the least-squares statistic on log-counts
//!
//!   ```text
//!   χ²(τ) = Σ_{n_i > 0} (ln n_i - ln y_i)² / (σ_i / n_i)²,   σ_i = sqrt(n_i)
//!   ```
//!
//! The sweep is computed once, eagerly, and is immutable afterwards so the
//! interactive session can answer every slider move with an array lookup.
//!
//! Numeric anomalies (a model value that underflowed to 0, a NaN term) are
//! absorbed: the offending term contributes 0 and is counted, so one
//! degenerate bin cannot poison the whole curve.

use rayon::prelude::*;

use crate::domain::{Objective, SweepData};
use crate::fit::histogram::Histogram;
use crate::fit::tau_grid::TauGrid;
use crate::models::{Normalization, expected_count};

/// Both objectives for one tau step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepValues {
    pub ln_l: f64,
    pub chi2: f64,
    pub anomalies: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveSweep {
    grid: TauGrid,
    ln_l: Vec<f64>,
    chi2: Vec<f64>,
    anomalies: usize,
}

impl ObjectiveSweep {
    /// Evaluate both objectives at every step of `grid`.
    pub fn compute(hist: &Histogram, norm: &Normalization, grid: TauGrid) -> Self {
        let counts = hist.counts();
        let centers = hist.centers();
        let errors = hist.errors();

        let ln_bins: Vec<f64> = counts
            .iter()
            .map(|&n| if n > 0 { (n as f64).ln() } else { 0.0 })
            .collect();

        // Steps are independent; collect() keeps grid order.
        let values: Vec<StepValues> = (grid.min_step()..=grid.max_step())
            .into_par_iter()
            .map(|step| {
                let tau = grid.tau_of(step);
                let v = evaluate_step(counts, centers, errors, &ln_bins, tau, norm);
                if v.anomalies > 0 {
                    tracing::debug!(step, tau, anomalies = v.anomalies, "numeric anomalies absorbed");
                }
                v
            })
            .collect();

        let anomalies = values.iter().map(|v| v.anomalies).sum();
        let ln_l = values.iter().map(|v| v.ln_l).collect();
        let chi2 = values.iter().map(|v| v.chi2).collect();

        tracing::info!(
            steps = grid.len(),
            bins = hist.len(),
            anomalies,
            "objective sweep complete"
        );

        Self {
            grid,
            ln_l,
            chi2,
            anomalies,
        }
    }

    pub fn grid(&self) -> TauGrid {
        self.grid
    }

    /// `lnL` per slot (slot = step - 1).
    pub fn ln_l(&self) -> &[f64] {
        &self.ln_l
    }

    /// `χ²` per slot (slot = step - 1).
    pub fn chi2(&self) -> &[f64] {
        &self.chi2
    }

    pub fn values(&self, objective: Objective) -> &[f64] {
        match objective {
            Objective::LnL => &self.ln_l,
            Objective::Chi2 => &self.chi2,
        }
    }

    /// Total absorbed anomalies across all steps.
    pub fn anomalies(&self) -> usize {
        self.anomalies
    }

    pub fn ln_l_at(&self, step: usize) -> Option<f64> {
        self.value(Objective::LnL, step)
    }

    pub fn chi2_at(&self, step: usize) -> Option<f64> {
        self.value(Objective::Chi2, step)
    }

    pub fn value(&self, objective: Objective, step: usize) -> Option<f64> {
        let slot = self.grid.slot(step)?;
        self.values(objective).get(slot).copied()
    }

    /// Lookup by slider value, `step = round(τ * 100)`.
    pub fn value_at_tau(&self, objective: Objective, tau: f64) -> Option<f64> {
        let step = usize::try_from(TauGrid::step_of(tau)).ok()?;
        self.value(objective, step)
    }

    pub fn to_data(&self) -> SweepData {
        SweepData {
            tau_grid: self.grid.taus(),
            ln_l: self.ln_l.clone(),
            chi2: self.chi2.clone(),
        }
    }
}

/// Evaluate both objectives at a single τ.
///
/// `ln_bins[i]` is `ln(counts[i])`, or 0 for empty bins.
pub fn evaluate_step(
    counts: &[u64],
    centers: &[f64],
    errors: &[f64],
    ln_bins: &[f64],
    tau: f64,
    norm: &Normalization,
) -> StepValues {
    let mut ln_l = 0.0;
    let mut chi2 = 0.0;
    let mut anomalies = 0usize;

    for i in 0..counts.len() {
        let n = counts[i] as f64;
        let y = expected_count(centers[i], tau, norm);

        // Likelihood term; ln(0) would be -inf.
        if y > 0.0 {
            let term = n * y.ln() - y;
            if term.is_finite() {
                ln_l += term;
            } else {
                anomalies += 1;
            }
        } else {
            anomalies += 1;
        }

        // LS term; empty bins carry no relative error and contribute nothing.
        if counts[i] != 0 {
            let y_ls = if y > 0.0 { y.ln() } else { 0.0 };
            let rel_err = errors[i] / n;
            let term = (ln_bins[i] - y_ls).powi(2) / (rel_err * rel_err);
            if term.is_finite() {
                chi2 += term;
            } else {
                anomalies += 1;
            }
        }
    }

    // Sentinel for a non-finite total.
    if !ln_l.is_finite() {
        ln_l = 0.0;
        anomalies += 1;
    }
    if !chi2.is_finite() {
        chi2 = 0.0;
        anomalies += 1;
    }

    StepValues { ln_l, chi2, anomalies }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::generate_seeded;
    use crate::domain::HistogramSpec;
    use crate::fit::peak::scan;

    fn lab_hist(times: &[f64]) -> Histogram {
        Histogram::build(times, &HistogramSpec::default()).unwrap()
    }

    fn lab_norm(hist: &Histogram) -> Normalization {
        Normalization::for_histogram(hist, 3000.0).unwrap()
    }

    #[test]
    fn sweep_has_one_value_per_step() {
        let hist = lab_hist(&generate_seeded(2.2, 3000, 1).unwrap());
        let sweep = ObjectiveSweep::compute(&hist, &lab_norm(&hist), TauGrid::default());
        assert_eq!(sweep.ln_l().len(), 500);
        assert_eq!(sweep.chi2().len(), 500);
        assert!(sweep.ln_l().iter().all(|v| v.is_finite()));
        assert!(sweep.chi2().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn chi2_is_zero_for_empty_histogram() {
        let hist = lab_hist(&[]);
        let sweep = ObjectiveSweep::compute(&hist, &lab_norm(&hist), TauGrid::default());
        assert!(sweep.chi2().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn lookups_use_rounded_step() {
        let hist = lab_hist(&generate_seeded(2.2, 500, 3).unwrap());
        let sweep = ObjectiveSweep::compute(&hist, &lab_norm(&hist), TauGrid::default());
        assert_eq!(sweep.value_at_tau(Objective::LnL, 2.5), sweep.ln_l_at(250));
        assert_eq!(sweep.ln_l_at(250), Some(sweep.ln_l()[249]));
        assert_eq!(sweep.value_at_tau(Objective::Chi2, 2.204), sweep.chi2_at(220));
        assert_eq!(sweep.ln_l_at(0), None);
        assert_eq!(sweep.chi2_at(501), None);
        assert_eq!(sweep.value_at_tau(Objective::LnL, -1.0), None);
    }

    #[test]
    fn step_values_match_hand_computation() {
        let hist = Histogram::from_counts(vec![4, 0, 1], vec![0.0, 1.0, 2.0, 3.0]);
        let norm = Normalization::new(10.0, 1.0).unwrap();
        let ln_bins = [4.0_f64.ln(), 0.0, 0.0];
        let v = evaluate_step(hist.counts(), hist.centers(), hist.errors(), &ln_bins, 2.0, &norm);

        let y: Vec<f64> = [0.5, 1.5, 2.5].iter().map(|c: &f64| 5.0 * (-c / 2.0).exp()).collect();
        let ln_l = 4.0 * y[0].ln() - y[0] - y[1] + (1.0 * y[2].ln() - y[2]);
        let chi2 = (4.0_f64.ln() - y[0].ln()).powi(2) * 4.0 + (0.0 - y[2].ln()).powi(2) * 1.0;

        assert!((v.ln_l - ln_l).abs() < 1e-12);
        assert!((v.chi2 - chi2).abs() < 1e-12);
        assert_eq!(v.anomalies, 0);
    }

    #[test]
    fn underflowed_model_terms_are_absorbed() {
        // Far-out bin at tiny tau: exp(-1000/0.01) underflows to 0.
        let hist = Histogram::from_counts(vec![3, 2], vec![0.0, 0.01, 1000.0]);
        let norm = Normalization::new(10.0, 0.01).unwrap();
        let ln_bins = [3.0_f64.ln(), 2.0_f64.ln()];
        let v = evaluate_step(hist.counts(), hist.centers(), hist.errors(), &ln_bins, 0.01, &norm);
        assert!(v.ln_l.is_finite());
        assert!(v.chi2.is_finite());
        assert!(v.anomalies >= 1);
    }

    #[test]
    fn mle_recovers_simulated_lifetime() {
        let tau0 = 2.2;
        for seed in 1..=5 {
            let hist = lab_hist(&generate_seeded(tau0, 3000, seed).unwrap());
            let sweep = ObjectiveSweep::compute(&hist, &lab_norm(&hist), TauGrid::default());
            let slot = scan(sweep.ln_l(), Objective::LnL).unwrap();
            let tau_hat = sweep.grid().tau_of(sweep.grid().step_at_slot(slot));
            assert!((tau_hat - tau0).abs() < 0.15, "seed {seed}: tau_hat={tau_hat}");
        }
    }

    #[test]
    fn ls_estimate_is_in_a_plausible_window() {
        let hist = lab_hist(&generate_seeded(2.2, 3000, 11).unwrap());
        let sweep = ObjectiveSweep::compute(&hist, &lab_norm(&hist), TauGrid::default());
        let slot = scan(sweep.chi2(), Objective::Chi2).unwrap();
        let tau_hat = sweep.grid().tau_of(sweep.grid().step_at_slot(slot));
        assert!(tau_hat > 1.0 && tau_hat < 4.0, "tau_hat={tau_hat}");
    }

    #[test]
    fn sweep_is_deterministic() {
        let hist = lab_hist(&generate_seeded(2.2, 1000, 5).unwrap());
        let norm = lab_norm(&hist);
        let a = ObjectiveSweep::compute(&hist, &norm, TauGrid::default());
        let b = ObjectiveSweep::compute(&hist, &norm, TauGrid::default());
        assert_eq!(a, b);
    }
}
