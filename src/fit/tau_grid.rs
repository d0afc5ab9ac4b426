//! Tau grid.
//!
//! The sweep evaluates both objectives on a uniform grid of τ values:
//! step `k` (1-based) is `τ = k / 100`, so the default 500 steps cover
//! `0.01..=5.00` µs. A slider value maps back to its step with
//! `round(τ * 100)`; the optimizer and the UI both rely on that mapping.
//!
//! Steps are stored in slot `k - 1` of the sweep vectors.

use crate::error::AppError;

/// Grid points per microsecond.
pub const TAU_STEPS_PER_UNIT: f64 = 100.0;

/// Default number of steps (τ up to 5.00 µs).
pub const DEFAULT_TAU_STEPS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TauGrid {
    steps: usize,
}

impl Default for TauGrid {
    fn default() -> Self {
        Self {
            steps: DEFAULT_TAU_STEPS,
        }
    }
}

impl TauGrid {
    pub fn new(steps: usize) -> Result<Self, AppError> {
        if steps < 2 {
            return Err(AppError::config("Tau steps must be >= 2."));
        }
        Ok(Self { steps })
    }

    /// Number of steps (also the highest step).
    pub fn len(&self) -> usize {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    pub fn min_step(&self) -> usize {
        1
    }

    pub fn max_step(&self) -> usize {
        self.steps
    }

    pub fn tau_min(&self) -> f64 {
        self.tau_of(self.min_step())
    }

    pub fn tau_max(&self) -> f64 {
        self.tau_of(self.max_step())
    }

    /// τ for a step.
    pub fn tau_of(&self, step: usize) -> f64 {
        step as f64 / TAU_STEPS_PER_UNIT
    }

    /// Step for a τ: `round(τ * 100)`, without clamping.
    pub fn step_of(tau: f64) -> i64 {
        (tau * TAU_STEPS_PER_UNIT).round() as i64
    }

    /// Step for a τ, clamped into the grid.
    pub fn clamped_step(&self, tau: f64) -> usize {
        if !tau.is_finite() {
            return self.min_step();
        }
        Self::step_of(tau).clamp(self.min_step() as i64, self.max_step() as i64) as usize
    }

    /// `true` when `step` lies on the grid.
    pub fn contains(&self, step: usize) -> bool {
        (self.min_step()..=self.max_step()).contains(&step)
    }

    /// Storage slot of a step.
    pub fn slot(&self, step: usize) -> Option<usize> {
        self.contains(step).then(|| step - 1)
    }

    /// Step stored in a slot.
    pub fn step_at_slot(&self, slot: usize) -> usize {
        slot + 1
    }

    /// All τ values in step order.
    pub fn taus(&self) -> Vec<f64> {
        (self.min_step()..=self.max_step()).map(|s| self.tau_of(s)).collect()
    }

    /// Move `delta` steps from `step`, staying on the grid.
    pub fn offset(&self, step: usize, delta: i64) -> usize {
        (step as i64 + delta).clamp(self.min_step() as i64, self.max_step() as i64) as usize
    }
}
