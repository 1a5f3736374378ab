//! Renderers turn a cleaned [`PriceSeries`] into a chart.
//!
//! Each program picks one renderer at startup; there is no runtime switch.

pub mod candlestick;
pub mod line;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{date_range::DateRange, price_series::PriceSeries};

pub use candlestick::CandlestickRenderer;
pub use line::{LinePlot, LineRenderer};

/// Where a chart ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Shown in a window that has since been closed.
    Displayed,
    /// Written to an image file.
    Saved(PathBuf),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to open chart window: {0}")]
    Window(String),

    #[error("Failed to draw chart: {0}")]
    Draw(String),

    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub trait Renderer {
    /// Renders `series`. `range` is the range the user asked for, which
    /// may be wider or narrower than the rows actually present.
    fn render(&self, series: &PriceSeries, range: &DateRange) -> Result<RenderOutcome, RenderError>;
}
