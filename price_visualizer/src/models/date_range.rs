//! Calendar date handling for the requested price window.

use chrono::{Datelike, Days, Months, NaiveDate};

/// Fixed input pattern for user supplied dates (`mm/dd/yy`).
pub const DATE_INPUT_FORMAT: &str = "%m/%d/%y";

/// Default for a blank start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDefault {
    OneYearBack,
    ThreeMonthsBack,
}

impl StartDefault {
    /// Calendar-month subtraction; a day past the end of the target month
    /// clamps to its last day (2024-02-29 minus one year is 2023-02-28).
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        let months = match self {
            StartDefault::OneYearBack => 12,
            StartDefault::ThreeMonthsBack => 3,
        };
        today.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN)
    }

    /// Human wording used in the start date prompt.
    pub fn describe(self) -> &'static str {
        match self {
            StartDefault::OneYearBack => "a year before today",
            StartDefault::ThreeMonthsBack => "three months before today",
        }
    }
}

/// Default for a blank end date: yesterday.
pub fn default_end(today: NaiveDate) -> NaiveDate {
    today.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN)
}

/// First two digit year read as 19xx.
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

/// Parses a `mm/dd/yy` string. Two digit years 00-68 map to 20xx and 69-99 to 19xx.
pub fn parse_input_date(input: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(input, DATE_INPUT_FORMAT).ok()?;
    // chrono puts the pivot at 70; move `69` back a century.
    if date.year() == 2000 + TWO_DIGIT_YEAR_PIVOT {
        return date.with_year(1900 + TWO_DIGIT_YEAR_PIVOT);
    }
    Some(date)
}

/// Requested window of calendar dates.
///
/// No ordering is enforced between `start` and `end`; an inverted range is
/// passed through and simply yields an empty series downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}
