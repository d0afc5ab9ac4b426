//! Plotters-powered chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Dots,
    /// Consecutive point pairs are the two ends of one vertical bar.
    ErrorBars,
}

/// One data series of a chart.
pub struct Series<'a> {
    pub data: &'a [(f64, f64)],
    pub color: RGBColor,
    pub kind: SeriesKind,
}

impl<'a> Series<'a> {
    pub fn line(data: &'a [(f64, f64)], color: RGBColor) -> Self {
        Self {
            data,
            color,
            kind: SeriesKind::Line,
        }
    }

    pub fn dots(data: &'a [(f64, f64)], color: RGBColor) -> Self {
        Self {
            data,
            color,
            kind: SeriesKind::Dots,
        }
    }

    pub fn error_bars(data: &'a [(f64, f64)], color: RGBColor) -> Self {
        Self {
            data,
            color,
            kind: SeriesKind::ErrorBars,
        }
    }
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call; series are
/// drawn in order, so later ones overlay earlier ones.
pub struct DecayPlottersChart<'a> {
    pub series: &'a [Series<'a>],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for DecayPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for series in self.series {
                match series.kind {
                    SeriesKind::Line => {
                        chart.draw_series(LineSeries::new(series.data.iter().copied(), &series.color))?;
                    }
                    // `Circle` radii come out huge through the ratatui backend; a
                    // colored `Pixel` is a clean dot.
                    SeriesKind::Dots => {
                        let color = series.color;
                        chart.draw_series(series.data.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
                    }
                    SeriesKind::ErrorBars => {
                        for bar in series.data.chunks_exact(2) {
                            chart.draw_series(LineSeries::new(bar.iter().copied(), &series.color))?;
                        }
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
