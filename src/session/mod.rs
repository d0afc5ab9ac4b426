//! Interactive exploration state.
//!
//! The UI never touches the sweep directly. Every interaction (slider moved,
//! optimize pressed) is an event fed to [`apply`], a pure function
//! `(state, event) -> state` over an immutable [`ObjectiveSweep`]. This keeps
//! the interaction logic testable without a terminal.
//!
//! Like a slider dragged across the range, moving to an optimum walks through
//! every intermediate step, and each step visited is recorded once.

use crate::domain::{HillClimbOptions, ModelCurve, Objective, OptimizerResult, PeakMode};
use crate::error::AppError;
use crate::fit::histogram::Histogram;
use crate::fit::peak::{HillClimbStatus, find_peak, hill_climb_sweep};
use crate::fit::sweep::ObjectiveSweep;
use crate::models::{Normalization, model_curve};

/// A `(τ, objective)` point the user has looked at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisitedPoint {
    pub step: usize,
    pub tau: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// Slider set to an absolute τ (clamped to the grid).
    SetTau(f64),
    /// Slider moved by a number of steps.
    Nudge(i64),
    /// Jump to the optimum of the session's objective.
    Optimize(PeakMode),
}

/// Result of the last optimize action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeOutcome {
    pub mode: PeakMode,
    pub result: OptimizerResult,
    /// Only set for hill-climbs.
    pub status: Option<HillClimbStatus>,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub objective: Objective,
    pub step: usize,
    pub visited: Vec<VisitedPoint>,
    /// Index into `visited` of the best value seen so far.
    pub best: Option<usize>,
    pub last_optimize: Option<OptimizeOutcome>,
    pub hill_climb: HillClimbOptions,
}

impl SessionState {
    /// Fresh session with the slider at `tau`; the starting point counts as visited.
    pub fn new(objective: Objective, tau: f64, sweep: &ObjectiveSweep, hill_climb: HillClimbOptions) -> Self {
        let mut state = Self {
            objective,
            step: sweep.grid().clamped_step(tau),
            visited: Vec::new(),
            best: None,
            last_optimize: None,
            hill_climb,
        };
        state.visit(sweep, state.step);
        state
    }

    pub fn tau(&self, sweep: &ObjectiveSweep) -> f64 {
        sweep.grid().tau_of(self.step)
    }

    pub fn current_value(&self, sweep: &ObjectiveSweep) -> Option<f64> {
        sweep.value(self.objective, self.step)
    }

    pub fn best_point(&self) -> Option<VisitedPoint> {
        self.best.and_then(|i| self.visited.get(i).copied())
    }

    /// Model curve at the current slider position.
    pub fn model_curve(
        &self,
        sweep: &ObjectiveSweep,
        hist: &Histogram,
        norm: &Normalization,
    ) -> Result<ModelCurve, AppError> {
        model_curve(hist, self.tau(sweep), norm)
    }

    fn visit(&mut self, sweep: &ObjectiveSweep, step: usize) {
        self.step = step;
        let Some(value) = sweep.value(self.objective, step) else {
            return;
        };
        if !value.is_finite() || self.visited.iter().any(|p| p.step == step) {
            return;
        }

        self.visited.push(VisitedPoint {
            step,
            tau: sweep.grid().tau_of(step),
            value,
        });
        let idx = self.visited.len() - 1;
        let improves = match self.best_point() {
            Some(best) => self.objective.improves(value, best.value),
            None => true,
        };
        if improves {
            self.best = Some(idx);
        }
    }

    /// Move the slider to `target` one step at a time.
    fn walk_to(&mut self, sweep: &ObjectiveSweep, target: usize) {
        let grid = sweep.grid();
        let target = grid.offset(target, 0);
        while self.step != target {
            let next = if self.step < target { self.step + 1 } else { self.step - 1 };
            self.visit(sweep, next);
        }
        self.visit(sweep, target);
    }
}

/// Apply one UI event.
pub fn apply(state: &SessionState, sweep: &ObjectiveSweep, event: SessionEvent) -> SessionState {
    let mut next = state.clone();
    let grid = sweep.grid();

    match event {
        SessionEvent::SetTau(tau) => {
            let step = grid.clamped_step(tau);
            next.visit(sweep, step);
        }
        SessionEvent::Nudge(delta) => {
            let step = grid.offset(state.step, delta);
            next.visit(sweep, step);
        }
        SessionEvent::Optimize(PeakMode::Scan) => {
            if let Some(result) = find_peak(sweep, state.objective) {
                next.walk_to(sweep, result.tau_index);
                next.last_optimize = Some(OptimizeOutcome {
                    mode: PeakMode::Scan,
                    result,
                    status: None,
                    iterations: 0,
                });
                tracing::info!(
                    estimator = state.objective.estimator_name(),
                    tau = result.tau_value,
                    value = result.objective_value,
                    "moved to global optimum"
                );
            }
        }
        SessionEvent::Optimize(PeakMode::HillClimb) => {
            let outcome = hill_climb_sweep(sweep, state.step, state.objective, &state.hill_climb);
            next.walk_to(sweep, outcome.result.tau_index);
            next.last_optimize = Some(OptimizeOutcome {
                mode: PeakMode::HillClimb,
                result: outcome.result,
                status: Some(outcome.status),
                iterations: outcome.iterations,
            });
            tracing::info!(
                estimator = state.objective.estimator_name(),
                tau = outcome.result.tau_value,
                iterations = outcome.iterations,
                status = ?outcome.status,
                "hill-climb finished"
            );
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::generate_seeded;
    use crate::domain::HistogramSpec;
    use crate::fit::tau_grid::TauGrid;

    fn fixture() -> (Histogram, Normalization, ObjectiveSweep) {
        let hist = Histogram::build(&generate_seeded(2.2, 3000, 21).unwrap(), &HistogramSpec::default()).unwrap();
        let norm = Normalization::for_histogram(&hist, 3000.0).unwrap();
        let sweep = ObjectiveSweep::compute(&hist, &norm, TauGrid::default());
        (hist, norm, sweep)
    }

    #[test]
    fn new_session_visits_start() {
        let (_, _, sweep) = fixture();
        let s = SessionState::new(Objective::LnL, 2.5, &sweep, HillClimbOptions::default());
        assert_eq!(s.step, 250);
        assert_eq!(s.visited.len(), 1);
        assert_eq!(s.best, Some(0));
        assert_eq!(s.current_value(&sweep), sweep.ln_l_at(250));
    }

    #[test]
    fn slider_is_clamped_and_revisits_are_not_duplicated() {
        let (_, _, sweep) = fixture();
        let s = SessionState::new(Objective::Chi2, 2.5, &sweep, HillClimbOptions::default());
        let s = apply(&s, &sweep, SessionEvent::SetTau(0.0));
        assert_eq!(s.step, 1);
        let s = apply(&s, &sweep, SessionEvent::SetTau(9.0));
        assert_eq!(s.step, 500);
        let s = apply(&s, &sweep, SessionEvent::SetTau(2.5));
        assert_eq!(s.visited.len(), 3);
        let s = apply(&s, &sweep, SessionEvent::Nudge(-1));
        assert_eq!(s.step, 249);
        assert_eq!(s.visited.len(), 4);
    }

    #[test]
    fn best_tracks_the_objective_direction() {
        let (_, _, sweep) = fixture();
        let mut s = SessionState::new(Objective::LnL, 1.0, &sweep, HillClimbOptions::default());
        for tau in [4.0, 2.2, 3.0] {
            s = apply(&s, &sweep, SessionEvent::SetTau(tau));
        }
        let best = s.best_point().unwrap();
        let max = s.visited.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(best.value, max);
    }

    #[test]
    fn optimize_scan_walks_to_global_optimum() {
        let (_, _, sweep) = fixture();
        let s = SessionState::new(Objective::LnL, 4.0, &sweep, HillClimbOptions::default());
        let s = apply(&s, &sweep, SessionEvent::Optimize(PeakMode::Scan));

        let peak = find_peak(&sweep, Objective::LnL).unwrap();
        assert_eq!(s.step, peak.tau_index);
        assert_eq!(s.best_point().unwrap().step, peak.tau_index);
        // Every intermediate step was visited once.
        assert_eq!(s.visited.len(), 400 - peak.tau_index + 1);
        assert_eq!(s.last_optimize.unwrap().result, peak);
    }

    #[test]
    fn optimize_hill_climb_reports_status() {
        let (_, _, sweep) = fixture();
        let s = SessionState::new(Objective::Chi2, 3.0, &sweep, HillClimbOptions::default());
        let s = apply(&s, &sweep, SessionEvent::Optimize(PeakMode::HillClimb));
        let outcome = s.last_optimize.unwrap();
        assert_eq!(outcome.mode, PeakMode::HillClimb);
        assert!(outcome.status.is_some());
        assert_eq!(s.step, outcome.result.tau_index);
    }

    #[test]
    fn model_curve_follows_slider() {
        let (hist, norm, sweep) = fixture();
        let s = SessionState::new(Objective::LnL, 2.5, &sweep, HillClimbOptions::default());
        let s = apply(&s, &sweep, SessionEvent::Nudge(3));
        let curve = s.model_curve(&sweep, &hist, &norm).unwrap();
        assert!((curve.tau - 2.53).abs() < 1e-12);
        assert_eq!(curve.expected.len(), hist.len());
    }
}
