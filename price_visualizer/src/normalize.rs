//! Cleaning rules that turn a provider [`RawTable`] into a [`PriceSeries`].
//!
//! The rules run in a fixed order because later rules rely on what the
//! earlier ones guarantee:
//!
//! 1. Promote a separate `Date` column to the index (when enabled).
//! 2. Coerce every column to numeric; anything unparseable becomes missing.
//! 3. Round to two decimals.
//! 4. Fill missing values with zero.
//! 5. Reduce timestamps to calendar dates.
//!
//! Zero-fill is kept for compatibility with files produced by earlier
//! tooling. Zero is not a neutral price, so charts show gaps as drops to
//! the axis; treat it as a known defect rather than a feature.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::models::{
    price_series::PriceSeries,
    raw_table::{DATE_COLUMN, RawTable, RawValue, parse_timestamp_text},
    symbol::Symbol,
};

/// Per-variant switches for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Move a separate `Date` column into the index and drop it. When off,
    /// such a column stays and is coerced like any other column.
    pub promote_date_column: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            promote_date_column: true,
        }
    }
}

/// Number of missing cells before any cleaning.
pub fn count_missing(table: &RawTable) -> usize {
    table
        .columns
        .values()
        .flat_map(|values| values.iter())
        .filter(|value| value.is_missing())
        .count()
}

/// Applies the cleaning rules and keys the result by calendar date.
///
/// Rows whose timestamp cannot be resolved are dropped, since they have no
/// date to be keyed by.
pub fn normalize(symbol: Symbol, mut table: RawTable, options: &NormalizeOptions) -> PriceSeries {
    if options.promote_date_column {
        if let Some(dates) = table.columns.shift_remove(DATE_COLUMN) {
            debug!(symbol = %symbol, "promoting Date column to index");
            let mut index: Vec<Option<NaiveDateTime>> = dates.iter().map(parse_timestamp).collect();
            index.resize(table.index.len().max(index.len()), None);
            table.index = index;
        }
    }

    let rows = table.index.len();
    let columns: IndexMap<String, Vec<f64>> = table
        .columns
        .into_iter()
        .map(|(name, values)| {
            let mut cleaned: Vec<f64> = values
                .iter()
                .map(coerce_numeric)
                .map(|value| value.map(round2))
                .map(|value| value.unwrap_or(0.0))
                .collect();
            cleaned.resize(rows, 0.0);
            (name, cleaned)
        })
        .collect();

    let keep: Vec<(usize, NaiveDate)> = table
        .index
        .iter()
        .enumerate()
        .filter_map(|(row, ts)| ts.map(|ts| (row, ts.date())))
        .collect();

    if keep.len() < rows {
        warn!(
            symbol = %symbol,
            dropped = rows - keep.len(),
            "dropping rows without a resolvable date"
        );
    }

    let dates = keep.iter().map(|(_, date)| *date).collect();
    let columns = columns
        .into_iter()
        .map(|(name, values)| {
            let kept = keep.iter().map(|(row, _)| values[*row]).collect();
            (name, kept)
        })
        .collect();

    PriceSeries {
        symbol,
        dates,
        columns,
    }
}

/// Parses a cell to a finite number. Non-finite numbers count as missing.
fn coerce_numeric(value: &RawValue) -> Option<f64> {
    let number = match value {
        RawValue::Number(v) => *v,
        RawValue::Text(text) => text.trim().parse::<f64>().ok()?,
        RawValue::Missing => return None,
    };
    number.is_finite().then_some(number)
}

/// Rounds half away from zero at two decimal places.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Scaling overflows near f64::MAX; such values have no fractional part anyway.
    if !rounded.is_finite() {
        return value;
    }
    // Avoid writing "-0.00".
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn parse_timestamp(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::Text(text) => parse_timestamp_text(text),
        _ => None,
    }
}

impl From<PriceSeries> for RawTable {
    fn from(series: PriceSeries) -> Self {
        RawTable {
            index: series
                .dates
                .iter()
                .map(|date| date.and_hms_opt(0, 0, 0))
                .collect(),
            columns: series
                .columns
                .into_iter()
                .map(|(name, values)| (name, values.into_iter().map(RawValue::Number).collect()))
                .collect(),
        }
    }
}
