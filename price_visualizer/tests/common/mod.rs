#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::HashMap,
    io::Cursor,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use price_visualizer::{
    models::{
        date_range::DateRange,
        price_series::PriceSeries,
        raw_table::{RawTable, RawValue},
        symbol::Symbol,
    },
    prompt::Console,
    providers::{ApiSnafu, DataProvider, ProviderError},
    render::{RenderError, RenderOutcome, Renderer},
};

pub type TestConsole = Console<Cursor<String>, Vec<u8>>;

pub fn console(input: &str) -> TestConsole {
    Console::new(Cursor::new(input.to_string()), Vec::new())
}

pub fn transcript(console: TestConsole) -> String {
    String::from_utf8(console.into_output()).expect("utf8 transcript")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Three trading days of AAPL with the second Close missing.
pub fn aapl_history() -> RawTable {
    let mut table = RawTable::new();
    table.index = [11, 12, 13]
        .iter()
        .map(|d| date(2024, 3, *d).and_hms_opt(9, 30, 0))
        .collect();
    let col = |values: [Option<f64>; 3]| values.into_iter().map(RawValue::from).collect();
    table.insert_column("Open", col([Some(172.94), Some(173.15), Some(172.77)]));
    table.insert_column("High", col([Some(174.38), Some(174.03), Some(173.19)]));
    table.insert_column("Low", col([Some(172.05), Some(171.01), Some(170.76)]));
    table.insert_column("Close", col([Some(172.746), None, Some(171.13)]));
    table.insert_column("Volume", col([Some(60_139_500.0), Some(59_825_400.0), Some(52_488_700.0)]));
    table
}

/// In-memory provider. Known symbols pass the existence check; history is
/// either a fixed table or an API error.
pub struct FakeProvider {
    known: HashMap<String, RawTable>,
    history: Option<RawTable>,
}

impl FakeProvider {
    pub fn with_history(history: RawTable) -> Self {
        let mut known = HashMap::new();
        let mut last_day = history.clone();
        let rows = last_day.len();
        if rows > 1 {
            last_day.index.drain(..rows - 1);
            for values in last_day.columns.values_mut() {
                values.drain(..rows - 1);
            }
        }
        known.insert("AAPL".to_string(), last_day);
        Self {
            known,
            history: Some(history),
        }
    }

    pub fn failing_history() -> Self {
        let mut provider = Self::with_history(aapl_history());
        provider.history = None;
        provider
    }
}

#[async_trait]
impl DataProvider for FakeProvider {
    async fn lookup_recent(&self, symbol: &Symbol) -> Result<RawTable, ProviderError> {
        Ok(self.known.get(symbol.as_str()).cloned().unwrap_or_default())
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<RawTable, ProviderError> {
        if !self.known.contains_key(symbol.as_str()) {
            return Ok(RawTable::new());
        }
        if range.is_inverted() {
            return Err(ApiSnafu {
                status: 400u16,
                message: "Invalid input - start date cannot be after end date",
            }
            .build());
        }
        match &self.history {
            Some(table) => Ok(table.clone()),
            None => Err(ApiSnafu {
                status: 500u16,
                message: "upstream unavailable",
            }
            .build()),
        }
    }
}

/// Records what it was asked to draw. Optionally fails every call.
#[derive(Default)]
pub struct RecordingRenderer {
    pub fail: bool,
    pub saved_as: Option<std::path::PathBuf>,
    pub calls: RefCell<Vec<(PriceSeries, DateRange)>>,
}

impl RecordingRenderer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn saving(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            saved_as: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, series: &PriceSeries, range: &DateRange) -> Result<RenderOutcome, RenderError> {
        self.calls.borrow_mut().push((series.clone(), *range));
        if self.fail {
            return Err(RenderError::Draw("canvas exploded".to_string()));
        }
        Ok(match &self.saved_as {
            Some(path) => RenderOutcome::Saved(path.clone()),
            None => RenderOutcome::Displayed,
        })
    }
}
