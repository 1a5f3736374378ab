//! Canonical in-memory representation of a cleaned daily price table.
//!
//! Produced by [`normalize`](crate::normalize::normalize) and consumed by the
//! sink and the renderers. Every cell is a finite number rounded to two
//! decimals and every row is keyed by a calendar date.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::models::symbol::Symbol;

pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const ADJ_CLOSE: &str = "Adj Close";
pub const VOLUME: &str = "Volume";

/// A date-keyed numeric table for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    /// The symbol this data represents (e.g., "AAPL").
    pub symbol: Symbol,
    /// Row keys, in the order received from the provider.
    pub dates: Vec<NaiveDate>,
    /// Named numeric columns, each `dates.len()` long.
    pub columns: IndexMap<String, Vec<f64>>,
}

/// Borrowed OHLCV view of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

impl PriceSeries {
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            dates: Vec::new(),
            columns: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Value of `name` at `row`, or 0.0 when the provider never sent that column.
    ///
    /// Zero matches the fill value used for gaps during normalization.
    pub fn value(&self, name: &str, row: usize) -> f64 {
        self.columns
            .get(name)
            .and_then(|values| values.get(row))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn candle(&self, row: usize) -> Option<Candle> {
        let date = *self.dates.get(row)?;
        Some(Candle {
            date,
            open: self.value(OPEN, row),
            high: self.value(HIGH, row),
            low: self.value(LOW, row),
            close: self.value(CLOSE, row),
            volume: self.value(VOLUME, row),
        })
    }

    pub fn candles(&self) -> impl Iterator<Item = Candle> + '_ {
        (0..self.len()).filter_map(|row| self.candle(row))
    }
}
