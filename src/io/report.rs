//! Read/write report JSON files.
//!
//! The report is the "portable" representation of a run, for external
//! renderers and `muon plot`:
//! - histogram counts + edges per dataset
//! - the full lnL / χ² sweep over the tau grid
//! - MLE / LS optima and their model curves
//!
//! The schema is defined by `domain::ReportFile`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::ReportFile;
use crate::error::AppError;

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &ReportFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, report)
        .map_err(|e| AppError::io(format!("Failed to write report JSON: {e}")))?;
    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush report JSON: {e}")))?;

    tracing::info!(path = %path.display(), datasets = report.datasets.len(), "wrote report");
    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: ReportFile = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| AppError::config(format!("Invalid report JSON: {e}")))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_analysis;
    use crate::domain::{AnalysisConfig, DatasetKind};

    #[test]
    fn report_survives_a_write_read_cycle() {
        let config = AnalysisConfig::default();
        let run = run_analysis(&config).unwrap();
        let report = run.to_report(&config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(&path, &report).unwrap();
        let back = read_report_json(&path).unwrap();

        assert_eq!(back.datasets.len(), 1);
        let ds = &back.datasets[0];
        assert_eq!(ds.kind, DatasetKind::Simulated);
        assert_eq!(ds.histogram.counts, report.datasets[0].histogram.counts);
        assert_eq!(ds.mle.tau_index, report.datasets[0].mle.tau_index);
        assert_eq!(ds.mle_curve.expected.len(), 400);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_errors_surface_even_when_buffered() {
        let report = ReportFile {
            tool: "muon".to_string(),
            generated: chrono::Utc::now(),
            sample_size: 3000.0,
            bin_width: 0.05,
            datasets: Vec::new(),
        };
        let err = write_report_json(Path::new("/dev/full"), &report).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(read_report_json(&path).is_err());
    }
}
