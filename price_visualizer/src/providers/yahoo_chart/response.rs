use chrono::{DateTime, FixedOffset, NaiveDateTime};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::models::{
    price_series::{ADJ_CLOSE, CLOSE, HIGH, LOW, OPEN, VOLUME},
    raw_table::{RawTable, RawValue},
};

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl ChartError {
    /// Yahoo's way of saying "unknown or delisted symbol".
    pub fn is_not_found(&self) -> bool {
        self.code.eq_ignore_ascii_case("Not Found")
    }
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
pub struct ChartMeta {
    #[serde(rename = "exchangeTimezoneName", default)]
    pub exchange_timezone_name: Option<String>,
    #[serde(default)]
    pub gmtoffset: i32,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
    #[serde(default)]
    pub adjclose: Option<Vec<AdjCloseBlock>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct QuoteBlock {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug)]
pub struct AdjCloseBlock {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartMeta {
    /// Converts an epoch second to the exchange's wall-clock time.
    ///
    /// The IANA zone name is preferred so DST is handled; the fixed
    /// `gmtoffset` is the fallback.
    fn local_time(&self, epoch: i64) -> Option<NaiveDateTime> {
        let utc = DateTime::from_timestamp(epoch, 0)?;
        if let Some(tz) = self
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
        {
            return Some(utc.with_timezone(&tz).naive_local());
        }
        let offset = FixedOffset::east_opt(self.gmtoffset)?;
        Some(utc.with_timezone(&offset).naive_local())
    }
}

impl ChartResult {
    pub fn into_raw_table(self) -> RawTable {
        let timestamps = self.timestamp.unwrap_or_default();
        let mut table = RawTable::new();
        table.index = timestamps
            .iter()
            .map(|&epoch| self.meta.local_time(epoch))
            .collect();

        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        table.insert_column(OPEN, to_raw(quote.open));
        table.insert_column(HIGH, to_raw(quote.high));
        table.insert_column(LOW, to_raw(quote.low));
        table.insert_column(CLOSE, to_raw(quote.close));
        if let Some(adj) = self.indicators.adjclose.and_then(|blocks| blocks.into_iter().next()) {
            table.insert_column(ADJ_CLOSE, to_raw(adj.adjclose));
        }
        table.insert_column(VOLUME, to_raw(quote.volume));
        table
    }
}

fn to_raw(values: Vec<Option<f64>>) -> Vec<RawValue> {
    values.into_iter().map(RawValue::from).collect()
}
