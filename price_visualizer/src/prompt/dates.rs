//! Date Range Collector: optional start/end dates in `mm/dd/yy`.

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;

use crate::{
    models::date_range::{DateRange, StartDefault, default_end, parse_input_date},
    prompt::Console,
};

pub const INVALID_DATE_MESSAGE: &str = "Invalid date format. Please use mm/dd/yy.";

/// Asks for one date until it parses or is left blank.
///
/// Blank input (or closed input) returns `None` so the caller can apply its
/// default. Malformed input is reported and the same prompt repeats.
pub fn collect_date<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    prompt: &str,
) -> io::Result<Option<NaiveDate>> {
    loop {
        let Some(line) = console.ask(prompt)? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(None);
        }
        match parse_input_date(&line) {
            Some(date) => return Ok(Some(date)),
            None => console.say(INVALID_DATE_MESSAGE)?,
        }
    }
}

/// Collects both ends of the range, applying defaults for blanks.
///
/// The two dates are not checked against each other.
pub fn collect_range<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    start_default: StartDefault,
    today: NaiveDate,
) -> io::Result<DateRange> {
    let start_prompt = format!(
        "Please enter the start date using mm/dd/yy format (or press enter for {}): ",
        start_default.describe()
    );
    let start = collect_date(console, &start_prompt)?.unwrap_or_else(|| start_default.resolve(today));

    let end = collect_date(
        console,
        "Please enter the end date using mm/dd/yy format (or press enter for yesterday's date): ",
    )?
    .unwrap_or_else(|| default_end(today));

    Ok(DateRange::new(start, end))
}
