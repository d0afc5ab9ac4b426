//! Locating the optimum of an objective curve.
//!
//! Two strategies:
//!
//! - [`scan`]: linear pass over the whole precomputed sweep. Always returns the
//!   global optimum; ties go to the first occurrence. This is what the
//!   "Maximize ln(L)" / "Minimize X^2" actions use by default.
//! - [`hill_climb`]: local search from the current step, probing
//!   `step ± stride` and moving while a neighbour is strictly better. It stops
//!   at the first local optimum, so on a non-unimodal curve it can miss the
//!   global one. The number of moves is bounded by `max_iters`.

use crate::domain::{HillClimbOptions, Objective, OptimizerResult};
use crate::fit::sweep::ObjectiveSweep;
use crate::fit::tau_grid::TauGrid;

/// Index of the best value in `values` (argmax for lnL, argmin for χ²).
///
/// Non-finite entries are skipped. Returns `None` if nothing finite remains.
pub fn scan(values: &[f64], objective: Objective) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if !objective.improves(v, b) => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Global optimum of one objective of a sweep.
pub fn find_peak(sweep: &ObjectiveSweep, objective: Objective) -> Option<OptimizerResult> {
    let grid = sweep.grid();
    let values = sweep.values(objective);
    let slot = scan(values, objective)?;
    let step = grid.step_at_slot(slot);
    Some(OptimizerResult {
        objective,
        tau_index: step,
        tau_value: grid.tau_of(step),
        objective_value: values[slot],
    })
}

/// Probe window of the hill-climb: the last three objective values seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationState {
    pub step: usize,
    /// Values at `[step - stride, step, step + stride]` (clamped to the grid).
    pub window: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HillClimbStatus {
    /// Current step is at least as good as both neighbours.
    Converged,
    /// `max_iters` moves were made without settling.
    IterationLimit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HillClimbOutcome {
    pub result: OptimizerResult,
    pub iterations: usize,
    pub status: HillClimbStatus,
    pub state: OptimizationState,
}

/// Local search from `start_step`.
///
/// `eval` returns the objective at a grid step; pass a sweep lookup or a
/// function that recomputes the objective. Non-finite values never win a move.
pub fn hill_climb<F>(
    eval: F,
    grid: TauGrid,
    start_step: usize,
    objective: Objective,
    opts: &HillClimbOptions,
) -> HillClimbOutcome
where
    F: Fn(usize) -> f64,
{
    let stride = opts.stride.max(1) as i64;
    let mut step = grid.offset(start_step, 0);
    let mut iterations = 0usize;

    let state_at = |step: usize| -> OptimizationState {
        let left = grid.offset(step, -stride);
        let right = grid.offset(step, stride);
        OptimizationState {
            step,
            window: [eval(left), eval(step), eval(right)],
        }
    };

    let mut state = state_at(step);
    let status = loop {
        let [left_v, here_v, right_v] = state.window;
        let better = |v: f64| v.is_finite() && (!here_v.is_finite() || objective.improves(v, here_v));

        let next = match (better(left_v), better(right_v)) {
            (true, true) => {
                if objective.improves(right_v, left_v) {
                    grid.offset(step, stride)
                } else {
                    grid.offset(step, -stride)
                }
            }
            (true, false) => grid.offset(step, -stride),
            (false, true) => grid.offset(step, stride),
            (false, false) => break HillClimbStatus::Converged,
        };

        if next == step {
            break HillClimbStatus::Converged;
        }
        if iterations >= opts.max_iters {
            break HillClimbStatus::IterationLimit;
        }

        iterations += 1;
        step = next;
        state = state_at(step);
    };

    if status == HillClimbStatus::IterationLimit {
        tracing::warn!(
            objective = objective.display_name(),
            start_step,
            step,
            iterations,
            "hill-climb stopped at iteration limit"
        );
    }

    HillClimbOutcome {
        result: OptimizerResult {
            objective,
            tau_index: step,
            tau_value: grid.tau_of(step),
            objective_value: state.window[1],
        },
        iterations,
        status,
        state,
    }
}

/// Hill-climb over a precomputed sweep.
pub fn hill_climb_sweep(
    sweep: &ObjectiveSweep,
    start_step: usize,
    objective: Objective,
    opts: &HillClimbOptions,
) -> HillClimbOutcome {
    hill_climb(
        |step| sweep.value(objective, step).unwrap_or(f64::NAN),
        sweep.grid(),
        start_step,
        objective,
        opts,
    )
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand::rngs::StdRng;

    use super::*;

    fn brute_force(values: &[f64], objective: Objective) -> Option<usize> {
        let finite: Vec<(usize, f64)> = values.iter().copied().enumerate().filter(|(_, v)| v.is_finite()).collect();
        let target = match objective {
            Objective::LnL => finite.iter().map(|&(_, v)| v).fold(f64::NEG_INFINITY, f64::max),
            Objective::Chi2 => finite.iter().map(|&(_, v)| v).fold(f64::INFINITY, f64::min),
        };
        finite.iter().find(|&&(_, v)| v == target).map(|&(i, _)| i)
    }

    #[test]
    fn scan_matches_brute_force_on_random_curves() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let len = rng.gen_range(1..60);
            // Small integer values force plenty of ties and local optima.
            let values: Vec<f64> = (0..len).map(|_| rng.gen_range(-5..5) as f64).collect();
            for objective in [Objective::LnL, Objective::Chi2] {
                assert_eq!(scan(&values, objective), brute_force(&values, objective));
            }
        }
    }

    #[test]
    fn scan_breaks_ties_by_first_occurrence() {
        let values = [1.0, 3.0, 2.0, 3.0, 0.5, 0.5];
        assert_eq!(scan(&values, Objective::LnL), Some(1));
        assert_eq!(scan(&values, Objective::Chi2), Some(4));
    }

    #[test]
    fn scan_skips_non_finite_and_handles_empty() {
        assert_eq!(scan(&[f64::NAN, 2.0, f64::INFINITY], Objective::LnL), Some(1));
        assert_eq!(scan(&[], Objective::LnL), None);
        assert_eq!(scan(&[f64::NAN], Objective::Chi2), None);
    }

    fn curve_grid(values: &[f64]) -> (TauGrid, impl Fn(usize) -> f64 + '_) {
        let grid = TauGrid::new(values.len()).unwrap();
        (grid, move |step: usize| values[step - 1])
    }

    #[test]
    fn hill_climb_reaches_peak_of_unimodal_curve() {
        let values: Vec<f64> = (1..=100).map(|s| -((s as f64 - 42.0).powi(2))).collect();
        let (grid, eval) = curve_grid(&values);
        for start in [1, 30, 42, 77, 100] {
            let out = hill_climb(&eval, grid, start, Objective::LnL, &HillClimbOptions::default());
            assert_eq!(out.status, HillClimbStatus::Converged);
            assert_eq!(out.result.tau_index, 42);
        }
    }

    #[test]
    fn hill_climb_can_stop_at_local_optimum() {
        // Local max at step 10, global max at step 80.
        let values: Vec<f64> = (1..=100)
            .map(|s| {
                let s = s as f64;
                (-(s - 10.0).powi(2) / 20.0).exp() + 2.0 * (-(s - 80.0).powi(2) / 20.0).exp()
            })
            .collect();
        let (grid, eval) = curve_grid(&values);

        let local = hill_climb(&eval, grid, 5, Objective::LnL, &HillClimbOptions::default());
        assert_eq!(local.status, HillClimbStatus::Converged);
        assert_eq!(local.result.tau_index, 10);

        let global = scan(&values, Objective::LnL).map(|slot| slot + 1);
        assert_eq!(global, Some(80));
    }

    #[test]
    fn hill_climb_minimises_chi2() {
        let values: Vec<f64> = (1..=50).map(|s| (s as f64 - 20.0).abs() + 3.0).collect();
        let (grid, eval) = curve_grid(&values);
        let out = hill_climb(&eval, grid, 45, Objective::Chi2, &HillClimbOptions::default());
        assert_eq!(out.result.tau_index, 20);
        assert_eq!(out.result.objective_value, 3.0);
        assert_eq!(out.iterations, 25);
    }

    #[test]
    fn hill_climb_terminates_on_flat_curve() {
        let values = vec![1.0; 30];
        let (grid, eval) = curve_grid(&values);
        let out = hill_climb(&eval, grid, 15, Objective::LnL, &HillClimbOptions::default());
        assert_eq!(out.status, HillClimbStatus::Converged);
        assert_eq!(out.result.tau_index, 15);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn hill_climb_reports_iteration_limit() {
        let values: Vec<f64> = (1..=100).map(|s| s as f64).collect();
        let (grid, eval) = curve_grid(&values);
        let opts = HillClimbOptions { stride: 1, max_iters: 10 };
        let out = hill_climb(&eval, grid, 1, Objective::LnL, &opts);
        assert_eq!(out.status, HillClimbStatus::IterationLimit);
        assert_eq!(out.iterations, 10);
        assert_eq!(out.result.tau_index, 11);
    }

    #[test]
    fn coarse_stride_stays_on_grid() {
        let values: Vec<f64> = (1..=21).map(|s| -((s as f64 - 21.0).powi(2))).collect();
        let (grid, eval) = curve_grid(&values);
        let opts = HillClimbOptions { stride: 2, max_iters: 100 };
        let out = hill_climb(&eval, grid, 2, Objective::LnL, &opts);
        assert_eq!(out.status, HillClimbStatus::Converged);
        assert_eq!(out.result.tau_index, 21);
        assert_eq!(out.state.window[1], 0.0);
    }
}
