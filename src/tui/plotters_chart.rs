//! Plotters-powered growth trend widget for Ratatui.
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

use crate::growth::{GROWTH_MAX, GROWTH_MIN};

/// Render-only description of the recent growth series.
///
/// All series data is computed outside the render call.
pub struct GrowthTrendChart<'a> {
    /// `(reading number, growth index)` pairs, oldest first.
    pub points: &'a [(f64, f64)],
}

impl Widget for GrowthTrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Trend area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }
        if self.points.len() < 2 {
            buf.set_string(
                area.x,
                area.y,
                "Waiting for readings...",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.points[0].0;
        let x1 = self.points[self.points.len() - 1].0;
        if !(x0.is_finite() && x1.is_finite()) || x1 <= x0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 5)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, GROWTH_MIN..GROWTH_MAX)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(4)
                .y_labels(3)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 0);
            chart.draw_series(LineSeries::new(self.points.iter().copied(), &line_color))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
