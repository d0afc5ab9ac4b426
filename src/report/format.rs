//! Formatted run summaries.

use crate::app::pipeline::{DatasetAnalysis, RunOutput};
use crate::domain::{AnalysisConfig, Objective, OptimizerResult, PeakMode};
use crate::fit::peak::HillClimbStatus;

/// Format the full run summary (input stats + per-dataset estimates).
pub fn format_run_summary(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== muon - Muon Lifetime Estimator ===\n");
    if let (Some(path), Some(loaded)) = (&config.data_path, &run.loaded) {
        out.push_str(&format!("Data: {}\n", path.display()));
        out.push_str(&format!(
            "Lines: {} | accepted: {} | over cutoff ({} raw): {}\n",
            loaded.lines_read,
            loaded.times.len(),
            config.raw_cutoff,
            loaded.rejected_over_cutoff,
        ));
    }
    if config.simulate {
        out.push_str(&format!(
            "Simulation: tau0={:.3} us | n={} | seed={}\n",
            config.sim_tau, config.sim_count, config.sim_seed
        ));
    }
    out.push_str(&format!(
        "Binning: {} bins over [{:.2}, {}] us | normalised to {} events\n",
        config.histogram.bins,
        config.histogram.lo,
        config
            .histogram
            .hi
            .map(|h| format!("{h:.2}"))
            .unwrap_or_else(|| "max".to_string()),
        config.sample_size,
    ));
    out.push_str(&format!(
        "Search: {}\n",
        match config.peak_mode {
            PeakMode::Scan => "full scan".to_string(),
            PeakMode::HillClimb => format!(
                "hill-climb from tau={:.2} (stride {}, max {} moves)",
                config.start_tau, config.hill_climb.stride, config.hill_climb.max_iters
            ),
        }
    ));

    for analysis in run.datasets() {
        out.push('\n');
        out.push_str(&format_dataset(analysis, config));
    }

    out
}

/// Format one dataset block.
pub fn format_dataset(a: &DatasetAnalysis, config: &AnalysisConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("--- {} ---\n", a.kind.display_name()));
    out.push_str(&format!(
        "Decays: {} | binned: {} | bin width: {:.4} us\n",
        a.decay_count,
        a.histogram.total(),
        a.normalization.bin_width,
    ));
    out.push_str(&format_result("MLE", &a.mle, a.mle_status));
    out.push_str(&format_result("LS ", &a.ls, a.ls_status));
    match &a.log_linear {
        Some(fit) => out.push_str(&format!(
            "Log-linear LS (free normalisation): tau = {:.4} us over {} bins\n",
            fit.tau, fit.bins_used
        )),
        None => out.push_str("Log-linear LS: not available\n"),
    }
    if a.sweep.anomalies() > 0 {
        out.push_str(&format!(
            "Numeric anomalies absorbed in sweep: {}\n",
            a.sweep.anomalies()
        ));
    }
    if a.kind == crate::domain::DatasetKind::Simulated {
        let d_mle = a.mle.tau_value - config.sim_tau;
        let d_ls = a.ls.tau_value - config.sim_tau;
        out.push_str(&format!("Bias vs tau0: MLE {d_mle:+.3} | LS {d_ls:+.3}\n"));
    }
    out
}

fn format_result(label: &str, r: &OptimizerResult, status: Option<HillClimbStatus>) -> String {
    let verb = match r.objective {
        Objective::LnL => "max",
        Objective::Chi2 => "min",
    };
    let note = match status {
        Some(HillClimbStatus::IterationLimit) => " (iteration limit)",
        Some(HillClimbStatus::Converged) | None => "",
    };
    format!(
        "{label}: tau = {:.2} us (step {}) | {verb} {} = {:.2}{note}\n",
        r.tau_value,
        r.tau_index,
        r.objective.display_name(),
        r.objective_value,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_analysis;
    use crate::domain::HillClimbOptions;

    #[test]
    fn summary_mentions_both_estimators() {
        let config = AnalysisConfig::default();
        let run = run_analysis(&config).unwrap();
        let text = format_run_summary(&run, &config);
        assert!(text.contains("--- Simulated ---"));
        assert!(text.contains("MLE: tau = "));
        assert!(text.contains("LS : tau = "));
        assert!(text.contains("max ln(L)"));
        assert!(text.contains("min X^2"));
        assert!(text.contains("Bias vs tau0"));
        assert!(!text.contains("(iteration limit)"));
    }

    #[test]
    fn truncated_search_is_flagged() {
        let config = AnalysisConfig {
            peak_mode: PeakMode::HillClimb,
            start_tau: 4.5,
            hill_climb: HillClimbOptions { stride: 1, max_iters: 1 },
            ..AnalysisConfig::default()
        };
        let run = run_analysis(&config).unwrap();
        let text = format_run_summary(&run, &config);
        let mle_line = text.lines().find(|l| l.starts_with("MLE: tau = ")).unwrap();
        assert!(mle_line.ends_with("(iteration limit)"));
    }
}
