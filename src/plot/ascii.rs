//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - histogram counts: `o`
//! - MLE model curve: `-` line, LS model curve: `~` line
//! - objective sweep: `*`, optimum `X`

use crate::domain::{DatasetReport, Objective, OptimizerResult, SweepData};

/// Histogram counts with both best-fit model curves.
pub fn render_dataset_plot(report: &DatasetReport, width: usize, height: usize) -> String {
    let centers: Vec<f64> = report
        .histogram
        .edges
        .windows(2)
        .map(|w| (w[0] + w[1]) / 2.0)
        .collect();
    let points: Vec<(f64, f64)> = centers
        .iter()
        .zip(&report.histogram.counts)
        .map(|(&c, &n)| (c, n as f64))
        .collect();
    let mle = pair_up(&centers, &report.mle_curve.expected);
    let ls = pair_up(&centers, &report.ls_curve.expected);

    let (t_min, t_max) = x_range(&points).unwrap_or((0.0, 20.0));
    let title = format!(
        "{}: t=[{t_min:.2}, {t_max:.2}] us | MLE tau={:.2} (-) | LS tau={:.2} (~)",
        report.kind.display_name(),
        report.mle.tau_value,
        report.ls.tau_value
    );
    render_plot(
        &title,
        &points,
        'o',
        &[(&mle, '-'), (&ls, '~')],
        None,
        width,
        height,
    )
}

/// Objective sweep with the optimum highlighted.
pub fn render_objective_plot(
    sweep: &SweepData,
    objective: Objective,
    optimum: &OptimizerResult,
    width: usize,
    height: usize,
) -> String {
    let values = match objective {
        Objective::LnL => &sweep.ln_l,
        Objective::Chi2 => &sweep.chi2,
    };
    let points: Vec<(f64, f64)> = sweep
        .tau_grid
        .iter()
        .copied()
        .zip(values.iter().copied())
        .filter(|(_, v)| v.is_finite())
        .collect();

    let (t_min, t_max) = x_range(&points).unwrap_or((0.0, 5.0));
    let (y_min, y_max) = pad_range_or_default(&points, &[]);
    let title = format!(
        "Plot: tau=[{t_min:.2}, {t_max:.2}] us | {}=[{y_min:.2}, {y_max:.2}]",
        objective.display_name()
    );
    render_plot(
        &title,
        &points,
        '*',
        &[],
        Some((optimum.tau_value, optimum.objective_value, 'X')),
        width,
        height,
    )
}

fn pair_up(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    xs.iter().copied().zip(ys.iter().copied()).collect()
}

fn render_plot(
    title: &str,
    points: &[(f64, f64)],
    point_ch: char,
    curves: &[(&[(f64, f64)], char)],
    highlight: Option<(f64, f64, char)>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (t_min, t_max) = x_range(points).unwrap_or((0.0, 1.0));
    let curve_points: Vec<(f64, f64)> = curves
        .iter()
        .flat_map(|(c, _)| c.iter().copied())
        .collect();
    let (y_min, y_max) = pad_range_or_default(points, &curve_points);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for (curve, ch) in curves {
        draw_curve(&mut grid, curve, (t_min, t_max), (y_min, y_max), *ch);
    }

    for &(t, y) in points {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = point_ch;
    }

    if let Some((t, y, ch)) = highlight {
        if t.is_finite() && y.is_finite() {
            let x = map_x(t, t_min, t_max, width);
            let yy = map_y(y, y_min, y_max, height);
            grid[yy][x] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for &(t, _) in points {
        min_t = min_t.min(t);
        max_t = max_t.max(t);
    }
    if min_t.is_finite() && max_t.is_finite() && max_t > min_t {
        Some((min_t, max_t))
    } else {
        None
    }
}

fn pad_range_or_default(points: &[(f64, f64)], curve: &[(f64, f64)]) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points.iter().chain(curve) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        pad_range(min_y, max_y, 0.05)
    } else {
        (0.0, 1.0)
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x: (f64, f64), y: (f64, f64), ch: char) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, v) in curve {
        if !v.is_finite() {
            prev = None;
            continue;
        }
        let xx = map_x(t, x.0, x.1, width);
        let yy = map_y(v, y.0, y.1, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, ch);
        } else if grid[yy][xx] == ' ' {
            grid[yy][xx] = ch;
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
