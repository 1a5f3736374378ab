//! Provider-shaped table before any cleaning.
//!
//! Providers hand back whatever they received: numbers, stray text, gaps
//! and an index that may or may not carry a resolvable timestamp. The
//! [`normalize`](crate::normalize) stage turns this into a [`PriceSeries`].
//!
//! [`PriceSeries`]: crate::models::price_series::PriceSeries

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

/// Column that, when present separately from the index, holds row dates.
pub const DATE_COLUMN: &str = "Date";

/// Parses the timestamp spellings seen in provider payloads and saved files:
/// RFC 3339, `YYYY-MM-DD HH:MM:SS[+HH:MM]` and a bare `YYYY-MM-DD`.
/// Offsets are dropped, keeping the wall-clock time.
pub fn parse_timestamp_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// One uncleaned cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
}

impl RawValue {
    /// True for explicit gaps and NaN numbers. Unparseable text does not count.
    pub fn is_missing(&self) -> bool {
        match self {
            RawValue::Missing => true,
            RawValue::Number(v) => v.is_nan(),
            RawValue::Text(_) => false,
        }
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawValue::Missing, RawValue::Number)
    }
}

/// Row-indexed table with ordered named columns.
///
/// Every column holds exactly `index.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Row timestamps (exchange local). `None` marks a row whose time is unknown.
    pub index: Vec<Option<NaiveDateTime>>,
    pub columns: IndexMap<String, Vec<RawValue>>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Adds or replaces a column. Short columns are padded with
    /// [`RawValue::Missing`], long ones truncated, to keep the table rectangular.
    pub fn insert_column(&mut self, name: impl Into<String>, mut values: Vec<RawValue>) {
        values.resize(self.index.len(), RawValue::Missing);
        self.columns.insert(name.into(), values);
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(v) if v.is_nan() => f.write_str("NaN"),
            RawValue::Number(v) => write!(f, "{v}"),
            RawValue::Text(text) => f.write_str(text),
            RawValue::Missing => f.write_str("NaN"),
        }
    }
}

/// Rows shown at each end of a long table.
const PREVIEW_EDGE_ROWS: usize = 5;

/// Console preview: header, the first and last few rows, and a shape line.
impl fmt::Display for RawTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.columns.keys().map(String::as_str).collect();
        if self.is_empty() {
            writeln!(f, "Empty table")?;
            return write!(f, "Columns: [{}]", names.join(", "));
        }

        let index_cell = |row: usize| match self.index.get(row).copied().flatten() {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "NaT".to_string(),
        };
        let rows: Vec<usize> = if self.len() > PREVIEW_EDGE_ROWS * 2 {
            (0..PREVIEW_EDGE_ROWS)
                .chain(self.len() - PREVIEW_EDGE_ROWS..self.len())
                .collect()
        } else {
            (0..self.len()).collect()
        };

        let index_width = 19;
        write!(f, "{:index_width$}", "")?;
        for name in &names {
            write!(f, " {name:>12}")?;
        }
        writeln!(f)?;
        for (pos, row) in rows.iter().copied().enumerate() {
            if pos == PREVIEW_EDGE_ROWS && rows.len() < self.len() {
                writeln!(f, "...")?;
            }
            write!(f, "{:index_width$}", index_cell(row))?;
            for values in self.columns.values() {
                let cell = values.get(row).map(ToString::to_string).unwrap_or_default();
                write!(f, " {cell:>12}")?;
            }
            writeln!(f)?;
        }
        write!(f, "\n[{} rows x {} columns]", self.len(), names.len())
    }
}
