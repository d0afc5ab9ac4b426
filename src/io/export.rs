//! Export histogram and sweep tables to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! plotting scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::app::pipeline::DatasetAnalysis;
use crate::error::AppError;

/// Write per-bin counts, error bars and both best-fit model values.
pub fn write_histogram_csv(path: &Path, analyses: &[&DatasetAnalysis]) -> Result<(), AppError> {
    let mut out = create(path, "histogram")?;

    writeln!(out, "dataset,bin,lower_edge,upper_edge,center,count,error,count_lo,count_hi,mle_expected,ls_expected")
        .map_err(|e| AppError::io(format!("Failed to write histogram CSV header: {e}")))?;

    for a in analyses {
        let hist = &a.histogram;
        let mle = crate::models::expected_counts(hist.centers(), a.mle.tau_value, &a.normalization)?;
        let ls = crate::models::expected_counts(hist.centers(), a.ls.tau_value, &a.normalization)?;
        let bounds = hist.error_bounds();
        let dataset = a.kind.display_name().to_lowercase();

        for i in 0..hist.len() {
            writeln!(
                out,
                "{},{},{:.6},{:.6},{:.6},{},{:.6},{:.6},{:.6},{:.6},{:.6}",
                dataset,
                i,
                hist.edges()[i],
                hist.edges()[i + 1],
                hist.centers()[i],
                hist.counts()[i],
                hist.errors()[i],
                bounds[i].0,
                bounds[i].1,
                mle[i],
                ls[i],
            )
            .map_err(|e| AppError::io(format!("Failed to write histogram CSV row: {e}")))?;
        }
    }

    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush histogram CSV: {e}")))
}

/// Write the `(tau, lnL, chi2)` sweep of every dataset.
pub fn write_sweep_csv(path: &Path, analyses: &[&DatasetAnalysis]) -> Result<(), AppError> {
    let mut out = create(path, "sweep")?;

    writeln!(out, "dataset,tau_index,tau,ln_l,chi2")
        .map_err(|e| AppError::io(format!("Failed to write sweep CSV header: {e}")))?;

    for a in analyses {
        let grid = a.sweep.grid();
        let dataset = a.kind.display_name().to_lowercase();
        for (slot, (ln_l, chi2)) in a.sweep.ln_l().iter().zip(a.sweep.chi2()).enumerate() {
            let step = grid.step_at_slot(slot);
            writeln!(out, "{},{},{:.2},{:.10},{:.10}", dataset, step, grid.tau_of(step), ln_l, chi2)
                .map_err(|e| AppError::io(format!("Failed to write sweep CSV row: {e}")))?;
        }
    }

    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush sweep CSV: {e}")))
}

fn create(path: &Path, what: &str) -> Result<BufWriter<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create {what} CSV '{}': {e}", path.display())))?;
    Ok(BufWriter::new(file))
}
