//! Command-line parsing for the muon lifetime estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{
    DEFAULT_BINS, DEFAULT_RANGE_HI, DEFAULT_RAW_CUTOFF, DEFAULT_SAMPLE_SIZE, DEFAULT_SIM_TAU, DEFAULT_START_TAU,
    PeakMode,
};
use crate::fit::tau_grid::DEFAULT_TAU_STEPS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "muon", version, about = "Muon lifetime estimator (MLE and least squares)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a measurement file (and a simulated set), print estimates, optionally plot/export.
    Analyze(AnalyzeArgs),
    /// Analyze simulated decays only (ignores --data and MUON_DATA_FILE).
    Simulate(AnalyzeArgs),
    /// Plot a previously exported report JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `muon analyze`, but lets you
    /// move tau by hand and jump to the optima in a terminal UI.
    Tui(AnalyzeArgs),
}

/// Common options for analysis, simulation and the TUI.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Measurement file (one raw decay time per line, in ns). Falls back to MUON_DATA_FILE.
    #[arg(short = 'd', long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Raw readings at or above this value are discarded.
    #[arg(long, default_value_t = DEFAULT_RAW_CUTOFF)]
    pub cutoff: i64,

    /// Histogram bin count.
    #[arg(long, default_value_t = DEFAULT_BINS)]
    pub bins: usize,

    /// Lower histogram edge (us).
    #[arg(long, default_value_t = 0.0)]
    pub range_lo: f64,

    /// Upper histogram edge (us).
    #[arg(long, default_value_t = DEFAULT_RANGE_HI)]
    pub range_hi: f64,

    /// Use the largest observed decay time as the upper edge.
    #[arg(long)]
    pub auto_range: bool,

    /// Event count the decay model is normalised to.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub events: f64,

    /// Number of tau steps (tau = step / 100).
    #[arg(long, default_value_t = DEFAULT_TAU_STEPS)]
    pub tau_steps: usize,

    /// Ground-truth lifetime of the simulated set (us).
    #[arg(long, default_value_t = DEFAULT_SIM_TAU)]
    pub sim_tau: f64,

    /// Number of simulated decays.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE as usize)]
    pub sim_count: usize,

    /// Random seed for the simulated set.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Skip the simulated dataset.
    #[arg(long)]
    pub no_sim: bool,

    /// How optima are located.
    #[arg(long, value_enum, default_value_t = PeakMode::Scan)]
    pub peak_mode: PeakMode,

    /// Starting tau (us) for the hill-climb and the TUI sliders.
    #[arg(long, default_value_t = DEFAULT_START_TAU)]
    pub start_tau: f64,

    /// Hill-climb neighbour distance in tau steps.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=2))]
    pub stride: u64,

    /// Hill-climb move limit.
    #[arg(long, default_value_t = 1000)]
    pub max_iters: usize,

    /// Skip the terminal plots (shown by default).
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the (tau, lnL, chi2) sweep to CSV.
    #[arg(long = "export-sweep", value_name = "CSV")]
    pub export_sweep: Option<PathBuf>,

    /// Export histogram counts and best-fit model values to CSV.
    #[arg(long = "export-histogram", value_name = "CSV")]
    pub export_histogram: Option<PathBuf>,

    /// Export the full report (histograms, sweeps, optima, model curves) to JSON.
    #[arg(long = "export-report", value_name = "JSON")]
    pub export_report: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence).
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Options for plotting a saved report.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Report JSON file produced by `muon analyze --export-report`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Also plot the lnL and chi2 sweeps.
    #[arg(long)]
    pub sweeps: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
