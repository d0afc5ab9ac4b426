//! Fixed-width histogram of decay times.
//!
//! Bins are half-open `[edge_i, edge_{i+1})` except the last, which is closed
//! on the right (numpy convention). Values outside `[lo, hi]` are not counted.

use crate::domain::{HistogramData, HistogramSpec};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<u64>,
    edges: Vec<f64>,
    centers: Vec<f64>,
    errors: Vec<f64>,
    bin_width: f64,
}

impl Histogram {
    /// Bin `times` according to `spec`.
    pub fn build(times: &[f64], spec: &HistogramSpec) -> Result<Self, AppError> {
        if spec.bins == 0 {
            return Err(AppError::config("Histogram bin count must be > 0."));
        }
        let (lo, hi) = resolve_range(times, spec)?;

        let n = spec.bins;
        let width = (hi - lo) / n as f64;
        let edges: Vec<f64> = (0..=n)
            .map(|i| if i == n { hi } else { lo + width * i as f64 })
            .collect();

        let mut counts = vec![0u64; n];
        let mut outside = 0usize;
        for &t in times {
            match bin_index(t, &edges) {
                Some(i) => counts[i] += 1,
                None => outside += 1,
            }
        }
        if outside > 0 {
            tracing::debug!(outside, lo, hi, "decay times outside histogram range");
        }

        Ok(Self::from_counts(counts, edges))
    }

    /// Assemble a histogram from precomputed counts and edges.
    ///
    /// # Panics
    /// Panics if `edges.len() != counts.len() + 1`.
    pub fn from_counts(counts: Vec<u64>, edges: Vec<f64>) -> Self {
        assert_eq!(edges.len(), counts.len() + 1, "edges must have one more entry than counts");
        let centers = edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
        let errors = counts.iter().map(|&c| (c as f64).sqrt()).collect();
        let bin_width = if counts.is_empty() {
            0.0
        } else {
            (edges[edges.len() - 1] - edges[0]) / counts.len() as f64
        };
        Self {
            counts,
            edges,
            centers,
            errors,
            bin_width,
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Poisson errors, `sqrt(count)`.
    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(count - err, count + err)` per bin, for error bars.
    pub fn error_bounds(&self) -> Vec<(f64, f64)> {
        self.counts
            .iter()
            .zip(&self.errors)
            .map(|(&c, &e)| (c as f64 - e, c as f64 + e))
            .collect()
    }

    pub fn to_data(&self) -> HistogramData {
        HistogramData {
            counts: self.counts.clone(),
            edges: self.edges.clone(),
        }
    }
}

fn resolve_range(times: &[f64], spec: &HistogramSpec) -> Result<(f64, f64), AppError> {
    let lo = spec.lo;
    let hi = match spec.hi {
        Some(hi) => hi,
        None => times
            .iter()
            .copied()
            .filter(|t| t.is_finite())
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |m| m.max(t))))
            .ok_or_else(|| AppError::config("Cannot infer histogram range from an empty dataset."))?,
    };

    if !(lo.is_finite() && hi.is_finite()) {
        return Err(AppError::config(format!("Invalid histogram range: [{lo}, {hi}].")));
    }
    if hi == lo && spec.hi.is_none() {
        // Degenerate range from data: widen it so there is something to bin.
        return Ok((lo - 0.5, hi + 0.5));
    }
    if hi <= lo {
        return Err(AppError::config(format!(
            "Invalid histogram range: [{lo}, {hi}] (hi must be > lo)."
        )));
    }
    Ok((lo, hi))
}

fn bin_index(t: f64, edges: &[f64]) -> Option<usize> {
    let n = edges.len() - 1;
    let (lo, hi) = (edges[0], edges[n]);
    if !t.is_finite() || t < lo || t > hi {
        return None;
    }
    if t == hi {
        return Some(n - 1);
    }

    let width = (hi - lo) / n as f64;
    let mut i = (((t - lo) / width) as usize).min(n - 1);
    // Rounding in the division can land one bin off; settle against the edges.
    if t < edges[i] {
        i = i.saturating_sub(1);
    } else if i + 1 < n && t >= edges[i + 1] {
        i += 1;
    }
    Some(i)
}
