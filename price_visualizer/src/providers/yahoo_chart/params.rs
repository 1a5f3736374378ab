use chrono::NaiveDate;
use serde::Serialize;

use crate::models::date_range::DateRange;

/// Bar interval requested from the chart endpoint.
#[derive(Clone, Debug, Serialize, Default, PartialEq, Eq)]
pub enum Interval {
    #[default]
    #[serde(rename = "1d")]
    OneDay,
}

/// Query string for `GET {base}/{symbol}`.
///
/// Either `range` or the `period1`/`period2` pair is sent, never both.
#[derive(Clone, Debug, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period1: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period2: Option<i64>,
    pub interval: Interval,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_adjusted_close: Option<bool>,
}

impl ChartQuery {
    /// Latest trading day only.
    pub fn single_day() -> Self {
        Self {
            range: Some("1d".to_string()),
            ..Default::default()
        }
    }

    /// Daily bars from midnight UTC of `range.start` up to, not including,
    /// midnight UTC of `range.end`.
    pub fn history(range: &DateRange) -> Self {
        Self {
            period1: Some(midnight_utc(range.start)),
            period2: Some(midnight_utc(range.end)),
            events: Some("history".to_string()),
            include_adjusted_close: Some(true),
            ..Default::default()
        }
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
