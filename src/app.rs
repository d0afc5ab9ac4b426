//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the measurement file and simulates a comparison set
//! - runs the tau sweep + optimum search
//! - prints reports/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{AnalyzeArgs, Command, PlotArgs};
use crate::domain::{AnalysisConfig, HillClimbOptions, HistogramSpec, Objective};
use crate::error::AppError;
use crate::logging::{self, LogTarget};

pub mod pipeline;

/// Environment variable naming the default measurement file.
pub const DATA_FILE_ENV: &str = "MUON_DATA_FILE";

/// Entry point for the `muon` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` is optional.
    dotenvy::dotenv().ok();

    // We want `muon` and `muon --data x.txt` to behave like `muon tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args, Source::Configured),
        Command::Simulate(args) => handle_analyze(args, Source::SimulatedOnly),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Configured,
    SimulatedOnly,
}

fn handle_analyze(args: AnalyzeArgs, source: Source) -> Result<(), AppError> {
    logging::init(&LogTarget::Stderr, args.verbose)?;

    let mut config = config_from_args(&args);
    if source == Source::SimulatedOnly {
        config.data_path = None;
        config.simulate = true;
    }
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    if config.plot {
        for analysis in run.datasets() {
            let report = analysis.to_report()?;
            println!(
                "{}",
                crate::plot::render_dataset_plot(&report, config.plot_width, config.plot_height)
            );
            for objective in [Objective::LnL, Objective::Chi2] {
                println!(
                    "{}",
                    crate::plot::render_objective_plot(
                        &report.sweep,
                        objective,
                        analysis.result(objective),
                        config.plot_width,
                        config.plot_height / 2,
                    )
                );
            }
        }
    }

    // Optional exports.
    let analyses: Vec<_> = run.datasets().collect();
    if let Some(path) = &config.export_sweep {
        crate::io::export::write_sweep_csv(path, &analyses)?;
    }
    if let Some(path) = &config.export_histogram {
        crate::io::export::write_histogram_csv(path, &analyses)?;
    }
    if let Some(path) = &config.export_report {
        crate::io::report::write_report_json(path, &run.to_report(&config)?)?;
    }

    Ok(())
}

fn handle_tui(args: AnalyzeArgs) -> Result<(), AppError> {
    logging::init(&LogTarget::tui_default(), args.verbose)?;
    crate::tui::run(config_from_args(&args))
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    logging::init(&LogTarget::Stderr, false)?;
    let report = crate::io::report::read_report_json(&args.report)?;
    if report.datasets.is_empty() {
        return Err(AppError::config(format!(
            "Report '{}' contains no datasets.",
            args.report.display()
        )));
    }

    for dataset in &report.datasets {
        println!(
            "{}",
            crate::plot::render_dataset_plot(dataset, args.width, args.height)
        );
        if args.sweeps {
            for (objective, optimum) in [(Objective::LnL, &dataset.mle), (Objective::Chi2, &dataset.ls)] {
                println!(
                    "{}",
                    crate::plot::render_objective_plot(&dataset.sweep, objective, optimum, args.width, args.height / 2)
                );
            }
        }
    }
    Ok(())
}

pub fn config_from_args(args: &AnalyzeArgs) -> AnalysisConfig {
    AnalysisConfig {
        data_path: resolve_data_path(args.data.clone()),
        raw_cutoff: args.cutoff,
        histogram: HistogramSpec {
            bins: args.bins,
            lo: args.range_lo,
            hi: (!args.auto_range).then_some(args.range_hi),
        },
        sample_size: args.events,
        tau_steps: args.tau_steps,
        simulate: !args.no_sim,
        sim_tau: args.sim_tau,
        sim_count: args.sim_count,
        sim_seed: args.seed,
        peak_mode: args.peak_mode,
        start_tau: args.start_tau,
        hill_climb: HillClimbOptions {
            stride: args.stride as usize,
            max_iters: args.max_iters,
        },
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_sweep: args.export_sweep.clone(),
        export_histogram: args.export_histogram.clone(),
        export_report: args.export_report.clone(),
    }
}

/// `--data` wins; otherwise `MUON_DATA_FILE` (possibly from `.env`).
fn resolve_data_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| {
        std::env::var_os(DATA_FILE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

/// Rewrite argv so `muon` defaults to `muon tui`.
///
/// Rules:
/// - `muon`                       -> `muon tui`
/// - `muon --data x.txt ...`      -> `muon tui --data x.txt ...`
/// - `muon --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "simulate" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_tui() {
        assert_eq!(rewrite_args(argv(&["muon"])), argv(&["muon", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["muon", "--seed", "7"])),
            argv(&["muon", "tui", "--seed", "7"])
        );
        assert_eq!(rewrite_args(argv(&["muon", "--help"])), argv(&["muon", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["muon", "analyze", "--no-sim"])),
            argv(&["muon", "analyze", "--no-sim"])
        );
    }

    #[test]
    fn args_map_onto_config() {
        let cli = crate::cli::Cli::parse_from([
            "muon",
            "analyze",
            "--data",
            "run.txt",
            "--auto-range",
            "--no-plot",
            "--max-iters",
            "50",
        ]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let config = config_from_args(&args);
        assert_eq!(config.data_path, Some(PathBuf::from("run.txt")));
        assert_eq!(config.histogram.hi, None);
        assert!(!config.plot);
        assert!(config.simulate);
        assert_eq!(config.hill_climb.max_iters, 50);
        assert_eq!(config.tau_steps, 500);
    }

    #[test]
    fn plots_are_on_unless_disabled() {
        let cli = crate::cli::Cli::parse_from(["muon", "analyze"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert!(config_from_args(&args).plot);

        assert!(crate::cli::Cli::try_parse_from(["muon", "analyze", "--plot", "false"]).is_err());
    }
}
