//! Shared analysis pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> histogram -> sweep -> optimum search (per dataset)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::Utc;

use crate::data::generate_seeded;
use crate::domain::{AnalysisConfig, DatasetKind, DatasetReport, Objective, OptimizerResult, PeakMode, ReportFile};
use crate::error::AppError;
use crate::fit::histogram::Histogram;
use crate::fit::peak::{HillClimbStatus, find_peak, hill_climb_sweep};
use crate::fit::sweep::ObjectiveSweep;
use crate::fit::tau_grid::TauGrid;
use crate::io::ingest::{LoadedDecays, LoaderOptions, load_decay_times};
use crate::math::{LogLinearFit, fit_log_linear};
use crate::models::{Normalization, model_curve};

/// Everything computed for one dataset.
#[derive(Debug, Clone)]
pub struct DatasetAnalysis {
    pub kind: DatasetKind,
    pub decay_count: usize,
    pub histogram: Histogram,
    pub normalization: Normalization,
    pub sweep: ObjectiveSweep,
    pub mle: OptimizerResult,
    pub ls: OptimizerResult,
    /// How each hill-climb ended; `None` when the optimum came from a full scan.
    pub mle_status: Option<HillClimbStatus>,
    pub ls_status: Option<HillClimbStatus>,
    pub log_linear: Option<LogLinearFit>,
}

impl DatasetAnalysis {
    pub fn result(&self, objective: Objective) -> &OptimizerResult {
        match objective {
            Objective::LnL => &self.mle,
            Objective::Chi2 => &self.ls,
        }
    }

    pub fn to_report(&self) -> Result<DatasetReport, AppError> {
        Ok(DatasetReport {
            kind: self.kind,
            decay_count: self.decay_count,
            histogram: self.histogram.to_data(),
            sweep: self.sweep.to_data(),
            mle: self.mle,
            ls: self.ls,
            mle_curve: model_curve(&self.histogram, self.mle.tau_value, &self.normalization)?,
            ls_curve: model_curve(&self.histogram, self.ls.tau_value, &self.normalization)?,
            log_linear_tau: self.log_linear.map(|f| f.tau),
            numeric_anomalies: self.sweep.anomalies(),
        })
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub loaded: Option<LoadedDecays>,
    pub experimental: Option<DatasetAnalysis>,
    pub simulated: Option<DatasetAnalysis>,
}

impl RunOutput {
    pub fn datasets(&self) -> impl Iterator<Item = &DatasetAnalysis> {
        self.experimental.iter().chain(self.simulated.iter())
    }

    pub fn to_report(&self, config: &AnalysisConfig) -> Result<ReportFile, AppError> {
        build_report(self.datasets(), config)
    }
}

/// Assemble the portable report for any set of analyzed datasets.
pub fn build_report<'a>(
    analyses: impl IntoIterator<Item = &'a DatasetAnalysis>,
    config: &AnalysisConfig,
) -> Result<ReportFile, AppError> {
    let analyses: Vec<&DatasetAnalysis> = analyses.into_iter().collect();
    let datasets = analyses
        .iter()
        .map(|a| a.to_report())
        .collect::<Result<Vec<_>, _>>()?;
    let bin_width = analyses
        .first()
        .map(|d| d.normalization.bin_width)
        .unwrap_or(0.0);
    Ok(ReportFile {
        tool: "muon".to_string(),
        generated: Utc::now(),
        sample_size: config.sample_size,
        bin_width,
        datasets,
    })
}

/// Execute the full pipeline: experimental file (if any) and simulated set (if enabled).
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    if config.data_path.is_none() && !config.simulate {
        return Err(AppError::config(
            "Nothing to analyze: pass --data (or set MUON_DATA_FILE) or enable simulation.",
        ));
    }

    let (loaded, experimental) = match &config.data_path {
        Some(path) => {
            let opts = LoaderOptions {
                raw_cutoff: config.raw_cutoff,
                ..LoaderOptions::default()
            };
            let loaded = load_decay_times(path, &opts)?;
            let analysis = analyze_dataset(DatasetKind::Experimental, &loaded.times, config)?;
            (Some(loaded), Some(analysis))
        }
        None => (None, None),
    };

    let simulated = if config.simulate {
        Some(simulate_dataset(config)?)
    } else {
        None
    };

    Ok(RunOutput {
        loaded,
        experimental,
        simulated,
    })
}

/// Simulate decays with the configured ground truth and analyze them.
pub fn simulate_dataset(config: &AnalysisConfig) -> Result<DatasetAnalysis, AppError> {
    let times = generate_seeded(config.sim_tau, config.sim_count, config.sim_seed)?;
    analyze_dataset(DatasetKind::Simulated, &times, config)
}

/// Histogram, sweep and optimum search for one set of decay times.
///
/// The histogram spec comes from `config`, so every dataset of a run is binned
/// identically.
pub fn analyze_dataset(kind: DatasetKind, times: &[f64], config: &AnalysisConfig) -> Result<DatasetAnalysis, AppError> {
    let histogram = Histogram::build(times, &config.histogram)?;
    let normalization = Normalization::for_histogram(&histogram, config.sample_size)?;
    let grid = TauGrid::new(config.tau_steps)?;
    let sweep = ObjectiveSweep::compute(&histogram, &normalization, grid);

    let (mle, mle_status) = locate(&sweep, Objective::LnL, config)?;
    let (ls, ls_status) = locate(&sweep, Objective::Chi2, config)?;
    let log_linear = fit_log_linear(&histogram);

    tracing::info!(
        dataset = kind.display_name(),
        decays = times.len(),
        mle_tau = mle.tau_value,
        ls_tau = ls.tau_value,
        "dataset analyzed"
    );

    Ok(DatasetAnalysis {
        kind,
        decay_count: times.len(),
        histogram,
        normalization,
        sweep,
        mle,
        ls,
        mle_status,
        ls_status,
        log_linear,
    })
}

fn locate(
    sweep: &ObjectiveSweep,
    objective: Objective,
    config: &AnalysisConfig,
) -> Result<(OptimizerResult, Option<HillClimbStatus>), AppError> {
    match config.peak_mode {
        PeakMode::Scan => find_peak(sweep, objective).map(|r| (r, None)).ok_or_else(|| {
            AppError::config(format!("No finite {} values in the sweep.", objective.display_name()))
        }),
        PeakMode::HillClimb => {
            let start = sweep.grid().clamped_step(config.start_tau);
            let outcome = hill_climb_sweep(sweep, start, objective, &config.hill_climb);
            Ok((outcome.result, Some(outcome.status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::HillClimbOptions;

    fn sim_only() -> AnalysisConfig {
        AnalysisConfig {
            sim_count: 3000,
            sim_seed: 8,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn simulated_run_recovers_tau() {
        let run = run_analysis(&sim_only()).unwrap();
        assert!(run.experimental.is_none());
        let sim = run.simulated.unwrap();
        assert_eq!(sim.decay_count, 3000);
        assert!((sim.mle.tau_value - 2.2).abs() < 0.15, "{}", sim.mle.tau_value);
        assert_eq!(sim.mle.tau_index, TauGrid::step_of(sim.mle.tau_value) as usize);
    }

    #[test]
    fn experimental_and_simulated_share_binning() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for t in generate_seeded(2.2, 800, 3).unwrap() {
            writeln!(file, "{} 0", (t * 1000.0).round() as i64).unwrap();
        }
        writeln!(file, "45000 0").unwrap();

        let config = AnalysisConfig {
            data_path: Some(file.path().to_path_buf()),
            ..sim_only()
        };
        let run = run_analysis(&config).unwrap();
        let exp = run.experimental.as_ref().unwrap();
        let sim = run.simulated.as_ref().unwrap();
        assert_eq!(exp.histogram.edges(), sim.histogram.edges());
        assert_eq!(exp.normalization, sim.normalization);
        assert_eq!(run.loaded.as_ref().unwrap().rejected_over_cutoff, 1);

        let report = run.to_report(&config).unwrap();
        assert_eq!(report.datasets.len(), 2);
        assert_eq!(report.datasets[0].sweep.ln_l.len(), 500);
        assert!((report.bin_width - 0.05).abs() < 1e-12);
    }

    #[test]
    fn nothing_to_do_is_a_config_error() {
        let config = AnalysisConfig {
            simulate: false,
            ..AnalysisConfig::default()
        };
        assert!(run_analysis(&config).is_err());
    }

    #[test]
    fn hill_climb_mode_is_local() {
        let config = AnalysisConfig {
            peak_mode: PeakMode::HillClimb,
            ..sim_only()
        };
        let sim = simulate_dataset(&config).unwrap();
        let scan = find_peak(&sim.sweep, Objective::LnL).unwrap();
        // lnL is unimodal near the truth, so the local search agrees with the scan.
        assert_eq!(sim.mle.tau_index, scan.tau_index);
        assert_eq!(sim.mle_status, Some(HillClimbStatus::Converged));
        assert_eq!(sim.ls_status, Some(HillClimbStatus::Converged));
    }

    #[test]
    fn truncated_hill_climb_keeps_its_status() {
        let config = AnalysisConfig {
            peak_mode: PeakMode::HillClimb,
            start_tau: 4.5,
            hill_climb: HillClimbOptions { stride: 1, max_iters: 1 },
            ..sim_only()
        };
        let sim = simulate_dataset(&config).unwrap();
        assert_eq!(sim.mle_status, Some(HillClimbStatus::IterationLimit));
        assert_eq!(sim.ls_status, Some(HillClimbStatus::IterationLimit));

        let scanned = simulate_dataset(&sim_only()).unwrap();
        assert_eq!(scanned.mle_status, None);
    }
}
