//! Ratatui-based terminal UI.
//!
//! One tab per dataset (experimental / simulated). Each tab has two tau
//! sliders, one for the MLE (lnL) and one for the LS (χ²) estimator. Moving a
//! slider looks the objective up in the precomputed sweep, records the visited
//! point and redraws the model curve over the histogram. All slider movement
//! goes through [`crate::session::apply`].

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
};

use crate::app::pipeline::{DatasetAnalysis, build_report, run_analysis, simulate_dataset};
use crate::domain::{AnalysisConfig, DatasetKind, Objective, PeakMode};
use crate::error::AppError;
use crate::fit::peak::HillClimbStatus;
use crate::session::{SessionEvent, SessionState, apply};

mod plotters_chart;

use plotters_chart::{DecayPlottersChart, Series};

/// Report file written by the export key when `--export-report` is not given.
pub const DEFAULT_REPORT_FILE: &str = "muon-report.json";

/// Slider order in the panel.
const SLIDERS: [Objective; 2] = [Objective::LnL, Objective::Chi2];

const BIG_STEP: i64 = 10;

/// Start the TUI.
pub fn run(config: AnalysisConfig) -> Result<(), AppError> {
    // Sweeps are computed before the terminal is taken over.
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// One dataset tab: the analysis plus one session per slider.
struct DatasetView {
    analysis: DatasetAnalysis,
    sessions: [SessionState; 2],
}

impl DatasetView {
    fn new(analysis: DatasetAnalysis, config: &AnalysisConfig) -> Self {
        let sessions = SLIDERS
            .map(|objective| SessionState::new(objective, config.start_tau, &analysis.sweep, config.hill_climb));
        Self { analysis, sessions }
    }
}

struct App {
    config: AnalysisConfig,
    datasets: Vec<DatasetView>,
    tab: usize,
    slider: usize,
    status: String,
}

impl App {
    fn new(config: AnalysisConfig) -> Result<Self, AppError> {
        let run = run_analysis(&config)?;
        let datasets: Vec<DatasetView> = run
            .experimental
            .into_iter()
            .chain(run.simulated)
            .map(|analysis| DatasetView::new(analysis, &config))
            .collect();

        let status = match &run.loaded {
            Some(loaded) => format!(
                "Loaded {} decays ({} over cutoff).",
                loaded.times.len(),
                loaded.rejected_over_cutoff
            ),
            None => "Simulated data only.".to_string(),
        };

        Ok(Self {
            config,
            datasets,
            tab: 0,
            slider: 0,
            status,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab => {
                if !self.datasets.is_empty() {
                    self.tab = (self.tab + 1) % self.datasets.len();
                }
            }
            KeyCode::BackTab => {
                if !self.datasets.is_empty() {
                    self.tab = (self.tab + self.datasets.len() - 1) % self.datasets.len();
                }
            }
            KeyCode::Up => {
                if self.slider > 0 {
                    self.slider -= 1;
                }
            }
            KeyCode::Down => {
                if self.slider < SLIDERS.len() - 1 {
                    self.slider += 1;
                }
            }
            KeyCode::Left => self.dispatch(self.slider, SessionEvent::Nudge(-1)),
            KeyCode::Right => self.dispatch(self.slider, SessionEvent::Nudge(1)),
            KeyCode::PageDown => self.dispatch(self.slider, SessionEvent::Nudge(-BIG_STEP)),
            KeyCode::PageUp => self.dispatch(self.slider, SessionEvent::Nudge(BIG_STEP)),
            KeyCode::Home | KeyCode::End => {
                if let Some(view) = self.datasets.get(self.tab) {
                    let grid = view.analysis.sweep.grid();
                    let tau = if code == KeyCode::Home { grid.tau_min() } else { grid.tau_max() };
                    self.dispatch(self.slider, SessionEvent::SetTau(tau));
                }
            }
            KeyCode::Char('m') => {
                self.slider = 0;
                self.optimize(PeakMode::Scan);
            }
            KeyCode::Char('n') => {
                self.slider = 1;
                self.optimize(PeakMode::Scan);
            }
            KeyCode::Char('h') => self.optimize(PeakMode::HillClimb),
            KeyCode::Char('r') => self.resimulate()?,
            KeyCode::Char('e') => self.export(),
            _ => {}
        }

        Ok(false)
    }

    fn dispatch(&mut self, slider: usize, event: SessionEvent) {
        let Some(view) = self.datasets.get_mut(self.tab) else {
            return;
        };
        view.sessions[slider] = apply(&view.sessions[slider], &view.analysis.sweep, event);
    }

    fn optimize(&mut self, mode: PeakMode) {
        self.dispatch(self.slider, SessionEvent::Optimize(mode));

        let Some(view) = self.datasets.get(self.tab) else {
            return;
        };
        let session = &view.sessions[self.slider];
        let objective = session.objective;
        self.status = match session.last_optimize {
            Some(outcome) => {
                let mut msg = format!(
                    "{}: tau = {:.2} us, {} = {:.2}",
                    objective.estimator_name(),
                    outcome.result.tau_value,
                    objective.display_name(),
                    outcome.result.objective_value,
                );
                match outcome.status {
                    Some(HillClimbStatus::Converged) => {
                        msg.push_str(&format!(" (local, {} moves)", outcome.iterations));
                    }
                    Some(HillClimbStatus::IterationLimit) => {
                        msg.push_str(&format!(" (stopped after {} moves)", outcome.iterations));
                    }
                    None => {}
                }
                msg
            }
            None => format!("No finite {} values.", objective.display_name()),
        };
    }

    fn resimulate(&mut self) -> Result<(), AppError> {
        if !self.config.simulate {
            self.status = "Simulation is disabled (--no-sim).".to_string();
            return Ok(());
        }

        self.config.sim_seed = self.config.sim_seed.wrapping_add(1);
        let analysis = simulate_dataset(&self.config)?;
        self.status = format!(
            "Resimulated (seed {}): MLE tau = {:.2} | LS tau = {:.2}",
            self.config.sim_seed, analysis.mle.tau_value, analysis.ls.tau_value
        );

        let view = DatasetView::new(analysis, &self.config);
        match self
            .datasets
            .iter()
            .position(|v| v.analysis.kind == DatasetKind::Simulated)
        {
            Some(idx) => self.datasets[idx] = view,
            None => self.datasets.push(view),
        }
        Ok(())
    }

    fn export(&mut self) {
        let path = self
            .config
            .export_report
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE));

        let result = build_report(self.datasets.iter().map(|v| &v.analysis), &self.config)
            .and_then(|report| crate::io::report::write_report_json(&path, &report));
        self.status = match result {
            Ok(()) => format!("Wrote report: {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(4),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_tabs(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_sliders(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<String> = self
            .datasets
            .iter()
            .map(|v| format!("{} (n={})", v.analysis.kind.display_name(), v.analysis.decay_count))
            .collect();
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(" muon lifetime ", Style::default().fg(Color::Cyan))),
            )
            .select(self.tab)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        let Some(view) = self.datasets.get(self.tab) else {
            let msg = Paragraph::new("No dataset.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, area);
            return;
        };

        self.draw_histogram(frame, columns[0], view);
        self.draw_objective(frame, right[0], view, 0);
        self.draw_objective(frame, right[1], view, 1);
    }

    fn draw_histogram(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DatasetView) {
        let a = &view.analysis;
        let block = Block::default()
            .title(format!(
                "{} decays | MLE (cyan) tau={:.2} | LS (magenta) tau={:.2}",
                a.kind.display_name(),
                view.sessions[0].tau(&a.sweep),
                view.sessions[1].tau(&a.sweep),
            ))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let counts = histogram_points(a);
        let bars = error_bar_points(a);
        let curves: Vec<Vec<(f64, f64)>> = view
            .sessions
            .iter()
            .map(|s| {
                s.model_curve(&a.sweep, &a.histogram, &a.normalization)
                    .map(|c| {
                        a.histogram
                            .centers()
                            .iter()
                            .copied()
                            .zip(c.expected)
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            })
            .collect();

        let edges = a.histogram.edges();
        let x_bounds = [edges[0], edges[edges.len() - 1]];
        let y_bounds = padded_bounds(&[bars.as_slice(), curves[0].as_slice(), curves[1].as_slice()]);

        let series = [
            Series::error_bars(&bars, RGBColor(128, 128, 128)),
            Series::dots(&counts, RGBColor(255, 255, 255)),
            Series::line(&curves[0], RGBColor(0, 255, 255)),
            Series::line(&curves[1], RGBColor(255, 0, 255)),
        ];
        self.render_chart(frame, inner, &series, x_bounds, y_bounds, ("t (us)", "counts"));
    }

    fn draw_objective(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DatasetView, slider: usize) {
        let a = &view.analysis;
        let session = &view.sessions[slider];
        let objective = session.objective;

        let mut title = format!(
            "{} visited: {}",
            objective.display_name(),
            session.visited.len()
        );
        if let Some(best) = session.best_point() {
            title.push_str(&format!(" | best tau={:.2} ({:.2})", best.tau, best.value));
        }
        let border = if slider == self.slider { Color::Cyan } else { Color::Gray };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let visited: Vec<(f64, f64)> = session.visited.iter().map(|p| (p.tau, p.value)).collect();
        let best: Vec<(f64, f64)> = session.best_point().map(|p| (p.tau, p.value)).into_iter().collect();
        let current: Vec<(f64, f64)> = session
            .current_value(&a.sweep)
            .map(|v| (session.tau(&a.sweep), v))
            .into_iter()
            .collect();

        let grid = a.sweep.grid();
        let x_bounds = [grid.tau_min(), grid.tau_max()];
        let y_bounds = padded_bounds(&[visited.as_slice(), current.as_slice()]);

        let series = [
            Series::dots(&visited, RGBColor(255, 255, 255)),
            Series::dots(&current, RGBColor(255, 255, 0)),
            Series::dots(&best, RGBColor(255, 0, 0)),
        ];
        self.render_chart(
            frame,
            inner,
            &series,
            x_bounds,
            y_bounds,
            ("tau (us)", objective.display_name()),
        );
    }

    fn render_chart(
        &self,
        frame: &mut ratatui::Frame<'_>,
        inner: Rect,
        series: &[Series<'_>],
        x_bounds: [f64; 2],
        y_bounds: [f64; 2],
        labels: (&str, &str),
    ) {
        let (chart_rect, insets) = chart_layout(inner);
        let widget = DecayPlottersChart {
            series,
            x_bounds,
            y_bounds,
            x_label: labels.0,
            y_label: labels.1,
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, labels);
        }
    }

    fn draw_sliders(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(view) = self.datasets.get(self.tab) else {
            return;
        };
        let sweep = &view.analysis.sweep;
        let bar_width = (area.width as usize).saturating_sub(60).clamp(10, 60);

        let items: Vec<ListItem> = view
            .sessions
            .iter()
            .map(|s| {
                let value = s
                    .current_value(sweep)
                    .map(|v| format!("{v:>12.2}"))
                    .unwrap_or_else(|| format!("{:>12}", "-"));
                ListItem::new(format!(
                    "{:<3} tau = {:.2} us  {:<5} = {value}  {}",
                    s.objective.estimator_name(),
                    s.tau(sweep),
                    s.objective.display_name(),
                    slider_bar(s.step, sweep.grid().min_step(), sweep.grid().max_step(), bar_width),
                ))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Sliders").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.slider));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab dataset  ↑/↓ slider  ←/→ ±1  PgUp/PgDn ±10  m max ln(L)  n min X^2  h climb  r resim  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn histogram_points(a: &DatasetAnalysis) -> Vec<(f64, f64)> {
    a.histogram
        .centers()
        .iter()
        .zip(a.histogram.counts())
        .map(|(&c, &n)| (c, n as f64))
        .collect()
}

/// Bottom and top of each bin's ±√n bar, flattened pairwise.
fn error_bar_points(a: &DatasetAnalysis) -> Vec<(f64, f64)> {
    a.histogram
        .centers()
        .iter()
        .zip(a.histogram.error_bounds())
        .flat_map(|(&c, (lo, hi))| [(c, lo), (c, hi)])
        .collect()
}

/// Y bounds over several series with 5% padding; a single value gets ±1.
fn padded_bounds(series: &[&[(f64, f64)]]) -> [f64; 2] {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in series.iter().flat_map(|s| s.iter()) {
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        return [0.0, 1.0];
    }
    if y_max <= y_min {
        return [y_min - 1.0, y_max + 1.0];
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
}

/// Text slider, e.g. `[-----|--------]`.
fn slider_bar(step: usize, min_step: usize, max_step: usize, width: usize) -> String {
    let width = width.max(3);
    let span = max_step.saturating_sub(min_step).max(1);
    let u = step.saturating_sub(min_step) as f64 / span as f64;
    let pos = (u.clamp(0.0, 1.0) * (width as f64 - 1.0)).round() as usize;

    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for i in 0..width {
        bar.push(if i == pos { '|' } else { '-' });
    }
    bar.push(']');
    bar
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.0}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    labels: (&str, &str),
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_x(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_y(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(labels.0)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(labels.1).style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::fit::peak::find_peak;

    fn app() -> App {
        App::new(AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn maximize_key_jumps_to_the_scan_optimum() {
        let mut app = app();
        app.handle_key(KeyCode::Char('m')).unwrap();

        let view = &app.datasets[0];
        let peak = find_peak(&view.analysis.sweep, Objective::LnL).unwrap();
        let mle = &view.sessions[0];
        assert_eq!(mle.step, peak.tau_index);
        assert_eq!(mle.best_point().unwrap().step, peak.tau_index);
        assert!(app.status.starts_with("MLE: tau = "));
        // The LS slider is untouched.
        assert_eq!(view.sessions[1].visited.len(), 1);
    }

    #[test]
    fn minimize_key_selects_the_ls_slider() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert_eq!(app.slider, 1);
        let view = &app.datasets[0];
        let peak = find_peak(&view.analysis.sweep, Objective::Chi2).unwrap();
        assert_eq!(view.sessions[1].step, peak.tau_index);
    }

    #[test]
    fn arrows_move_the_selected_slider() {
        let mut app = app();
        let start = app.datasets[0].sessions[1].step;
        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Right).unwrap();
        app.handle_key(KeyCode::PageUp).unwrap();
        assert_eq!(app.datasets[0].sessions[1].step, start + 11);
        assert_eq!(app.datasets[0].sessions[0].step, start);

        app.handle_key(KeyCode::Home).unwrap();
        assert_eq!(app.datasets[0].sessions[1].step, 1);
        app.handle_key(KeyCode::End).unwrap();
        assert_eq!(app.datasets[0].sessions[1].step, 500);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn tabs_cycle_through_datasets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for t in crate::data::generate_seeded(2.2, 500, 11).unwrap() {
            writeln!(file, "{}", (t * 1000.0).round() as i64).unwrap();
        }
        let config = AnalysisConfig {
            data_path: Some(file.path().to_path_buf()),
            ..AnalysisConfig::default()
        };
        let mut app = App::new(config).unwrap();
        assert_eq!(app.datasets.len(), 2);
        assert_eq!(app.datasets[0].analysis.kind, DatasetKind::Experimental);

        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.tab, 1);
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.tab, 0);
        app.handle_key(KeyCode::BackTab).unwrap();
        assert_eq!(app.tab, 1);
    }

    #[test]
    fn resimulate_bumps_the_seed_and_resets_sessions() {
        let mut app = app();
        app.handle_key(KeyCode::Char('m')).unwrap();
        app.handle_key(KeyCode::Char('r')).unwrap();
        assert_eq!(app.config.sim_seed, 43);
        assert_eq!(app.datasets.len(), 1);
        assert_eq!(app.datasets[0].sessions[0].visited.len(), 1);
        assert!(app.status.starts_with("Resimulated (seed 43)"));
    }

    #[test]
    fn export_writes_a_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tui.json");
        let config = AnalysisConfig {
            export_report: Some(path.clone()),
            ..AnalysisConfig::default()
        };
        let mut app = App::new(config).unwrap();
        app.handle_key(KeyCode::Char('e')).unwrap();

        let report = crate::io::report::read_report_json(&path).unwrap();
        assert_eq!(report.datasets.len(), 1);
        assert!(app.status.starts_with("Wrote report"));
    }

    #[test]
    fn bounds_and_slider_helpers() {
        assert_eq!(padded_bounds(&[&[(1.0, 5.0)]]), [4.0, 6.0]);
        assert_eq!(padded_bounds(&[&[]]), [0.0, 1.0]);
        let b = padded_bounds(&[&[(0.0, 0.0), (1.0, 10.0)]]);
        assert!((b[0] + 0.5).abs() < 1e-12 && (b[1] - 10.5).abs() < 1e-12);

        assert_eq!(slider_bar(1, 1, 500, 5), "[|----]");
        assert_eq!(slider_bar(500, 1, 500, 5), "[----|]");
    }

    #[test]
    fn error_bars_bracket_every_count() {
        let app = app();
        let a = &app.datasets[0].analysis;
        let counts = histogram_points(a);
        let bars = error_bar_points(a);

        assert_eq!(bars.len(), 2 * counts.len());
        for (&(x, n), bar) in counts.iter().zip(bars.chunks_exact(2)) {
            assert_eq!(bar[0].0, x);
            assert_eq!(bar[1].0, x);
            assert!((bar[0].1 - (n - n.sqrt())).abs() < 1e-9);
            assert!((bar[1].1 - (n + n.sqrt())).abs() < 1e-9);
        }
    }
}
