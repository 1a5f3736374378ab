//! Candlestick chart with a volume panel, saved as a PNG.
//!
//! Candles are placed by row position rather than by date, so weekends and
//! holidays leave no gaps. The price panel takes the upper 70% of the image
//! and the volume panel the rest.

use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use plotters::{
    coord::Shift,
    prelude::*,
    style::{FontStyle, register_font},
};
use tracing::{debug, info};

use crate::{
    models::{
        date_range::DateRange,
        price_series::{Candle, PriceSeries},
    },
    render::{RenderError, RenderOutcome, Renderer},
};

pub const DEFAULT_FILE_NAME: &str = "candlestick_plot.png";

const UP: RGBColor = GREEN;
const DOWN: RGBColor = RED;
const EDGE: RGBColor = BLACK;
const BODY_HALF_WIDTH: f64 = 0.3;
const PRICE_PANEL_SHARE: f64 = 0.7;
const MARGIN: u32 = 10;
const PRICE_LABEL_AREA: u32 = 80;
const DATE_LABEL_AREA: u32 = 30;
const LABEL_SIZE: u32 = 14;
const TICK_FORMAT: &str = "%b %d";

/// Family every label is drawn with; the bundled face is registered under it.
const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/DejaVuSans.ttf"));

pub struct CandlestickRenderer {
    output_dir: PathBuf,
    file_name: String,
    size: (u32, u32),
}

impl CandlestickRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, file_name: impl Into<String>, size: (u32, u32)) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_name: file_name.into(),
            size,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}

/// Up candles are green, down candles red. A flat candle counts as up.
pub fn candle_color(candle: &Candle) -> RGBColor {
    if candle.is_up() { UP } else { DOWN }
}

/// Price axis range covering every open, high, low and close.
///
/// An empty series gets `0..1`; a flat one is padded by one unit each way.
pub fn price_range(candles: &[Candle]) -> Range<f64> {
    let (low, high) = candles.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        let lo = lo.min(c.low).min(c.open).min(c.close);
        let hi = hi.max(c.high).max(c.open).max(c.close);
        (lo, hi)
    });
    if !low.is_finite() || !high.is_finite() {
        return 0.0..1.0;
    }
    if low == high {
        return (low - 1.0)..(high + 1.0);
    }
    let margin = (high - low) * 0.05;
    (low - margin)..(high + margin)
}

/// Upper bound of the volume axis.
pub fn volume_ceiling(candles: &[Candle]) -> f64 {
    let max = candles.iter().map(|c| c.volume).fold(0.0, f64::max);
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

/// Row positions `-0.5..n-0.5`, at least one slot wide.
pub fn slot_range(rows: usize) -> Range<f64> {
    -0.5..(rows.max(1) as f64 - 0.5)
}

/// Date label for a row position on the x axis.
///
/// Fractional positions and positions outside the series get no label.
pub fn tick_label(candles: &[Candle], x: f64) -> String {
    let row = x.round();
    if (x - row).abs() > 1e-6 || row < 0.0 {
        return String::new();
    }
    candles
        .get(row as usize)
        .map(|c| c.date.format(TICK_FORMAT).to_string())
        .unwrap_or_default()
}

/// Volume tick label with a K/M/B suffix.
pub fn volume_label(volume: f64) -> String {
    let magnitude = volume.abs();
    if magnitude >= 1e9 {
        format!("{:.1}B", volume / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.1}M", volume / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.1}K", volume / 1e3)
    } else {
        format!("{volume:.0}")
    }
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Makes the bundled DejaVu Sans face available to the text renderer.
///
/// Registration happens once per process; later calls report the first result.
pub fn register_bundled_font() -> Result<(), RenderError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let loaded = *REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());
    if loaded {
        Ok(())
    } else {
        Err(RenderError::Draw("bundled font could not be loaded".to_string()))
    }
}

fn draw(path: &Path, size: (u32, u32), candles: &[Candle]) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    draw_panels(&root, candles)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

/// Price panel on top, volume panel below, sharing the row axis.
fn draw_panels<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, candles: &[Candle]) -> Result<(), RenderError> {
    register_bundled_font()?;
    root.fill(&WHITE).map_err(draw_err)?;
    let (_, height) = root.dim_in_pixel();
    let split = (f64::from(height) * PRICE_PANEL_SHARE) as u32;
    let (upper, lower) = root.split_vertically(split);

    let slots = slot_range(candles.len());
    let label_style = (FONT_FAMILY, LABEL_SIZE).into_font();

    let mut prices = ChartBuilder::on(&upper)
        .margin(MARGIN)
        .y_label_area_size(PRICE_LABEL_AREA)
        .build_cartesian_2d(slots.clone(), price_range(candles))
        .map_err(draw_err)?;
    prices
        .configure_mesh()
        .disable_x_mesh()
        .disable_x_axis()
        .y_desc("Price")
        .y_label_formatter(&|v: &f64| format!("{v:.2}"))
        .label_style(label_style.clone())
        .axis_desc_style(label_style.clone())
        .draw()
        .map_err(draw_err)?;

    prices
        .draw_series(candles.iter().enumerate().map(|(row, c)| {
            let x = row as f64;
            PathElement::new(vec![(x, c.low), (x, c.high)], candle_color(c))
        }))
        .map_err(draw_err)?;
    prices
        .draw_series(candles.iter().enumerate().map(|(row, c)| {
            let x = row as f64;
            Rectangle::new(
                [
                    (x - BODY_HALF_WIDTH, c.open.min(c.close)),
                    (x + BODY_HALF_WIDTH, c.open.max(c.close)),
                ],
                candle_color(c).filled(),
            )
        }))
        .map_err(draw_err)?;
    prices
        .draw_series(candles.iter().enumerate().map(|(row, c)| {
            let x = row as f64;
            Rectangle::new(
                [
                    (x - BODY_HALF_WIDTH, c.open.min(c.close)),
                    (x + BODY_HALF_WIDTH, c.open.max(c.close)),
                ],
                EDGE.stroke_width(1),
            )
        }))
        .map_err(draw_err)?;

    let dates = |x: &f64| tick_label(candles, *x);
    let mut volume = ChartBuilder::on(&lower)
        .margin(MARGIN)
        .y_label_area_size(PRICE_LABEL_AREA)
        .x_label_area_size(DATE_LABEL_AREA)
        .build_cartesian_2d(slots, 0.0..volume_ceiling(candles))
        .map_err(draw_err)?;
    volume
        .configure_mesh()
        .disable_x_mesh()
        .y_labels(3)
        .y_desc("Volume")
        .x_label_formatter(&dates)
        .y_label_formatter(&|v: &f64| volume_label(*v))
        .label_style(label_style.clone())
        .axis_desc_style(label_style)
        .draw()
        .map_err(draw_err)?;
    volume
        .draw_series(candles.iter().enumerate().map(|(row, c)| {
            let x = row as f64;
            Rectangle::new(
                [(x - BODY_HALF_WIDTH, 0.0), (x + BODY_HALF_WIDTH, c.volume)],
                candle_color(c).filled(),
            )
        }))
        .map_err(draw_err)?;
    Ok(())
}

impl Renderer for CandlestickRenderer {
    fn render(&self, series: &PriceSeries, _range: &DateRange) -> Result<RenderOutcome, RenderError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;
        let path = self.path();
        let candles: Vec<Candle> = series.candles().collect();
        debug!(rows = candles.len(), path = %path.display(), "drawing candlesticks");

        draw(&path, self.size, &candles)?;
        info!(symbol = %series.symbol, path = %path.display(), "candlestick chart saved");
        Ok(RenderOutcome::Saved(path))
    }
}
