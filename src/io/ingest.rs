//! Measurement file ingest.
//!
//! The detector software writes one record per line, whitespace-separated,
//! with the decay time as the first field in thousandths of a microsecond:
//!
//! ```text
//! 2314 1615488001
//! 40000 1615488012
//! ```
//!
//! Rules:
//! - **Strict** on the leading token: a non-integer aborts the load with a
//!   `DataFormat` error
//! - readings at or above the cutoff are out-of-window noise and are dropped
//! - blank lines (typically the trailing one) are ignored

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::domain::{DEFAULT_RAW_CUTOFF, RAW_UNITS_PER_MICROSECOND};
use crate::error::AppError;

/// Loader settings.
#[derive(Debug, Clone, Copy)]
pub struct LoaderOptions {
    /// Raw readings `>= raw_cutoff` are excluded.
    pub raw_cutoff: i64,
    /// Divisor converting raw readings to microseconds.
    pub raw_per_unit: f64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            raw_cutoff: DEFAULT_RAW_CUTOFF,
            raw_per_unit: RAW_UNITS_PER_MICROSECOND,
        }
    }
}

/// Ingest output: accepted decay times plus bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct LoadedDecays {
    /// Decay times in microseconds, in file order.
    pub times: Vec<f64>,
    /// Non-blank lines seen.
    pub lines_read: usize,
    /// Lines dropped by the cutoff.
    pub rejected_over_cutoff: usize,
}

/// Load decay times from a measurement file.
pub fn load_decay_times(path: &Path, opts: &LoaderOptions) -> Result<LoadedDecays, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open data file '{}': {e}", path.display())))?;
    let loaded = parse_decay_times(BufReader::new(file), opts)?;

    tracing::info!(
        path = %path.display(),
        accepted = loaded.times.len(),
        rejected = loaded.rejected_over_cutoff,
        "loaded decay times"
    );
    Ok(loaded)
}

/// Parse decay times from an in-memory string.
pub fn parse_decay_str(text: &str, opts: &LoaderOptions) -> Result<LoadedDecays, AppError> {
    parse_decay_times(text.as_bytes(), opts)
}

/// Parse decay times from any buffered reader.
pub fn parse_decay_times<R: BufRead>(reader: R, opts: &LoaderOptions) -> Result<LoadedDecays, AppError> {
    if !(opts.raw_per_unit.is_finite() && opts.raw_per_unit > 0.0) {
        return Err(AppError::config(format!(
            "Invalid raw unit divisor: {} (must be finite and > 0).",
            opts.raw_per_unit
        )));
    }

    let mut out = LoadedDecays::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| AppError::io(format!("Failed to read line {line_no}: {e}")))?;

        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        out.lines_read += 1;

        let raw: i64 = token
            .parse()
            .map_err(|_| AppError::data_format(line_no, format!("expected an integer decay time, got '{token}'")))?;

        if raw >= opts.raw_cutoff {
            out.rejected_over_cutoff += 1;
            continue;
        }
        out.times.push(raw as f64 / opts.raw_per_unit);
    }

    Ok(out)
}
