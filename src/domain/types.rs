//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the sweep and interactive exploration
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Raw measurement units per microsecond (raw values are thousandths of a µs).
pub const RAW_UNITS_PER_MICROSECOND: f64 = 1000.0;

/// Raw readings at or above this value are out-of-window noise (40 µs).
pub const DEFAULT_RAW_CUTOFF: i64 = 40_000;

/// Histogram bin count used for both experimental and simulated data.
pub const DEFAULT_BINS: usize = 400;

/// Upper edge of the histogram range (µs).
pub const DEFAULT_RANGE_HI: f64 = 20.0;

/// Event count the decay model is normalised to.
pub const DEFAULT_SAMPLE_SIZE: f64 = 3000.0;

/// Ground-truth lifetime used for the simulated dataset (µs).
pub const DEFAULT_SIM_TAU: f64 = 2.2;

/// Slider position on start-up (µs).
pub const DEFAULT_START_TAU: f64 = 2.5;

/// Which goodness-of-fit objective a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Poisson log-likelihood, maximised.
    LnL,
    /// Least-squares χ² on log-counts, minimised.
    Chi2,
}

impl Objective {
    /// `true` when `candidate` is strictly better than `incumbent`.
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Objective::LnL => candidate > incumbent,
            Objective::Chi2 => candidate < incumbent,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Objective::LnL => "ln(L)",
            Objective::Chi2 => "X^2",
        }
    }

    pub fn estimator_name(self) -> &'static str {
        match self {
            Objective::LnL => "MLE",
            Objective::Chi2 => "LS",
        }
    }
}

/// How the optimum of a sweep is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PeakMode {
    /// Linear scan of the full precomputed sweep (global optimum).
    Scan,
    /// Local search from the current tau (may stop at a local optimum).
    HillClimb,
}

/// Origin of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Experimental,
    Simulated,
}

impl DatasetKind {
    pub fn display_name(self) -> &'static str {
        match self {
            DatasetKind::Experimental => "Experimental",
            DatasetKind::Simulated => "Simulated",
        }
    }
}

/// Binning policy. Experimental and simulated histograms must share one spec.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    pub bins: usize,
    pub lo: f64,
    /// `None` means "maximum observed decay time".
    pub hi: Option<f64>,
}

impl Default for HistogramSpec {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            lo: 0.0,
            hi: Some(DEFAULT_RANGE_HI),
        }
    }
}

/// Options for the local hill-climb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HillClimbOptions {
    /// Neighbour distance in tau steps (1, or 2 for the coarse variant).
    pub stride: usize,
    /// Hard bound on moves before giving up.
    pub max_iters: usize,
}

impl Default for HillClimbOptions {
    fn default() -> Self {
        Self {
            stride: 1,
            max_iters: 1000,
        }
    }
}

/// Full configuration of one run (CLI or TUI).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Measurement file; `None` skips the experimental dataset.
    pub data_path: Option<PathBuf>,
    pub raw_cutoff: i64,
    pub histogram: HistogramSpec,
    /// Event count the model is normalised to.
    pub sample_size: f64,
    /// Number of tau steps (tau = step / 100, steps 1..=tau_steps).
    pub tau_steps: usize,

    pub simulate: bool,
    pub sim_tau: f64,
    pub sim_count: usize,
    pub sim_seed: u64,

    pub peak_mode: PeakMode,
    pub start_tau: f64,
    pub hill_climb: HillClimbOptions,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_sweep: Option<PathBuf>,
    pub export_histogram: Option<PathBuf>,
    pub export_report: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            raw_cutoff: DEFAULT_RAW_CUTOFF,
            histogram: HistogramSpec::default(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            tau_steps: crate::fit::tau_grid::DEFAULT_TAU_STEPS,
            simulate: true,
            sim_tau: DEFAULT_SIM_TAU,
            sim_count: DEFAULT_SAMPLE_SIZE as usize,
            sim_seed: 42,
            peak_mode: PeakMode::Scan,
            start_tau: DEFAULT_START_TAU,
            hill_climb: HillClimbOptions::default(),
            plot: true,
            plot_width: 100,
            plot_height: 25,
            export_sweep: None,
            export_histogram: None,
            export_report: None,
        }
    }
}

/// Located optimum of one objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerResult {
    pub objective: Objective,
    /// Tau step (`round(tau * 100)`).
    pub tau_index: usize,
    pub tau_value: f64,
    pub objective_value: f64,
}

/// Histogram as handed to external renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramData {
    pub counts: Vec<u64>,
    pub edges: Vec<f64>,
}

/// Expected counts per bin for one tau.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCurve {
    pub tau: f64,
    pub expected: Vec<f64>,
}

/// Objective sweep as handed to external renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepData {
    pub tau_grid: Vec<f64>,
    pub ln_l: Vec<f64>,
    pub chi2: Vec<f64>,
}

/// Per-dataset section of a report file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetReport {
    pub kind: DatasetKind,
    pub decay_count: usize,
    pub histogram: HistogramData,
    pub sweep: SweepData,
    pub mle: OptimizerResult,
    pub ls: OptimizerResult,
    pub mle_curve: ModelCurve,
    pub ls_curve: ModelCurve,
    pub log_linear_tau: Option<f64>,
    pub numeric_anomalies: usize,
}

/// The "portable" output of a run, consumed by external renderers and `muon plot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub sample_size: f64,
    pub bin_width: f64,
    pub datasets: Vec<DatasetReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_direction() {
        assert!(Objective::LnL.improves(-1.0, -2.0));
        assert!(!Objective::LnL.improves(-2.0, -2.0));
        assert!(Objective::Chi2.improves(1.0, 2.0));
        assert!(!Objective::Chi2.improves(2.0, 2.0));
    }

    #[test]
    fn default_histogram_spec_matches_lab_binning() {
        let spec = HistogramSpec::default();
        assert_eq!(spec.bins, 400);
        let width = (spec.hi.unwrap() - spec.lo) / spec.bins as f64;
        assert!((width - 0.05).abs() < 1e-12);
    }
}
