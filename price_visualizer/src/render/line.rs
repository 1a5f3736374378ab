//! Open vs. Close line chart shown in a native window.

use chrono::{Datelike, NaiveDate, Weekday};
use eframe::egui::{self, Color32};
use egui_plot::{GridInput, GridMark, Legend, Line, Plot, PlotBounds, PlotPoints};
use tracing::{debug, info};

use crate::{
    models::{
        date_range::DateRange,
        price_series::{CLOSE, OPEN, PriceSeries},
    },
    render::{RenderError, RenderOutcome, Renderer},
};

/// Weekly ticks land on this weekday.
pub const TICK_WEEKDAY: Weekday = Weekday::Tue;

/// Plot x coordinate of a date (days since 0001-01-01).
pub fn date_to_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Everything the window needs, computed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePlot {
    pub title: String,
    pub open_label: String,
    pub close_label: String,
    /// Open shifted up by the padding.
    pub open: Vec<[f64; 2]>,
    pub close: Vec<[f64; 2]>,
    /// `(min, max)` of the price axis; `None` when no rows fall in the range.
    pub y_bounds: Option<(f64, f64)>,
    /// `(first, last)` x coordinates of the plotted rows.
    pub x_bounds: Option<(f64, f64)>,
    /// One x coordinate per week.
    pub ticks: Vec<f64>,
}

impl LinePlot {
    /// Keeps the rows whose date falls in `range` (both ends inclusive) and
    /// lays them out for drawing.
    ///
    /// The price axis spans `[max(0, low - padding), high + padding]`, where
    /// `low` and `high` are taken over the unshifted Open and Close values.
    pub fn build(series: &PriceSeries, range: &DateRange, padding: f64) -> Self {
        let symbol = series.symbol.as_str();
        let mut plot = LinePlot {
            title: format!("{symbol} Open vs. {symbol} Close Prices"),
            open_label: "Open".to_string(),
            close_label: "Close".to_string(),
            open: Vec::new(),
            close: Vec::new(),
            y_bounds: None,
            x_bounds: None,
            ticks: Vec::new(),
        };

        let mut low = f64::INFINITY;
        let mut high = f64::NEG_INFINITY;
        let mut first: Option<NaiveDate> = None;
        let mut last: Option<NaiveDate> = None;

        for (row, date) in series.dates.iter().copied().enumerate() {
            if !range.contains(date) {
                continue;
            }
            let open = series.value(OPEN, row);
            let close = series.value(CLOSE, row);
            let x = date_to_x(date);
            plot.open.push([x, open + padding]);
            plot.close.push([x, close]);

            low = low.min(open).min(close);
            high = high.max(open).max(close);
            first = Some(first.map_or(date, |d| d.min(date)));
            last = Some(last.map_or(date, |d| d.max(date)));
        }

        if let (Some(first), Some(last)) = (first, last) {
            plot.y_bounds = Some(((low - padding).max(0.0), high + padding));
            plot.x_bounds = Some((date_to_x(first), date_to_x(last)));
            plot.ticks = weekly_ticks(first, last);
        }
        debug!(rows = plot.close.len(), "line plot prepared");
        plot
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

/// Every [`TICK_WEEKDAY`] from `first` through `last`.
pub fn weekly_ticks(first: NaiveDate, last: NaiveDate) -> Vec<f64> {
    let offset = (7 + TICK_WEEKDAY.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let mut ticks = Vec::new();
    let mut day = first + chrono::Days::new(u64::from(offset));
    while day <= last {
        ticks.push(date_to_x(day));
        match day.checked_add_days(chrono::Days::new(7)) {
            Some(next) => day = next,
            None => break,
        }
    }
    ticks
}

/// Displays the chart and blocks until the window is closed.
pub struct LineRenderer {
    padding: f64,
    size: [f32; 2],
}

impl LineRenderer {
    pub fn new(padding: f64) -> Self {
        Self {
            padding,
            size: [1600.0, 1000.0],
        }
    }
}

impl Renderer for LineRenderer {
    fn render(&self, series: &PriceSeries, range: &DateRange) -> Result<RenderOutcome, RenderError> {
        let plot = LinePlot::build(series, range, self.padding);
        info!(symbol = %series.symbol, rows = plot.close.len(), "opening chart window");

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(self.size)
                .with_title(plot.title.clone()),
            ..Default::default()
        };
        let title = plot.title.clone();
        let app = LineChartApp {
            plot,
            bounds_applied: false,
        };

        eframe::run_native(&title, options, Box::new(|_cc| Box::new(app)))
            .map_err(|e| RenderError::Window(e.to_string()))?;
        Ok(RenderOutcome::Displayed)
    }
}

struct LineChartApp {
    plot: LinePlot,
    bounds_applied: bool,
}

impl eframe::App for LineChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(&self.plot.title);
            });

            let ticks = self.plot.ticks.clone();
            let open = Line::new(PlotPoints::from(self.plot.open.clone()))
                .name(&self.plot.open_label)
                .color(Color32::GREEN);
            let close = Line::new(PlotPoints::from(self.plot.close.clone()))
                .name(&self.plot.close_label)
                .color(Color32::GOLD);
            let bounds = match (self.plot.x_bounds, self.plot.y_bounds) {
                (Some((x0, x1)), Some((y0, y1))) if !self.bounds_applied => {
                    Some(PlotBounds::from_min_max([x0 - 1.0, y0], [x1 + 1.0, y1]))
                }
                _ => None,
            };

            Plot::new("open_close")
                .legend(Legend::default())
                .x_axis_label("Date")
                .y_axis_label("Price")
                .x_axis_formatter(|mark: GridMark, _max_chars, _range| {
                    x_to_date(mark.value)
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                })
                .x_grid_spacer(move |input: GridInput| {
                    ticks
                        .iter()
                        .filter(|x| **x >= input.bounds.0 && **x <= input.bounds.1)
                        .map(|x| GridMark {
                            value: *x,
                            step_size: 7.0,
                        })
                        .collect()
                })
                .show(ui, |plot_ui| {
                    if let Some(bounds) = bounds {
                        plot_ui.set_plot_bounds(bounds);
                    }
                    plot_ui.line(open);
                    plot_ui.line(close);
                });
            self.bounds_applied = true;
        });
    }
}
