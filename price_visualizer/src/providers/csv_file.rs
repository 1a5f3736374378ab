//! Offline provider that replays series saved by [`CsvSink`].
//!
//! Useful for re-rendering an earlier run without network access. Files are
//! looked up as `{data_dir}/{SYMBOL}_stock_data_Indexed.csv`; the first
//! column is the row date and every other cell is handed to the normalizer
//! as raw text.
//!
//! [`CsvSink`]: crate::io::csv_sink::CsvSink

use std::{
    fs::File,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use csv::ReaderBuilder;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    io::csv_sink::series_file_name,
    models::{
        date_range::DateRange,
        raw_table::{RawTable, RawValue, parse_timestamp_text},
        symbol::Symbol,
    },
    providers::{CsvSnafu, DataProvider, ProviderError},
};

pub struct CsvFileProvider {
    data_dir: PathBuf,
}

impl CsvFileProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.data_dir.join(series_file_name(symbol))
    }

    /// Reads the whole file. A missing file is "no data", not an error.
    fn read_table(&self, symbol: &Symbol) -> Result<RawTable, ProviderError> {
        let path = self.path_for(symbol);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved series");
                return Ok(RawTable::new());
            }
            Err(e) => return Err(csv::Error::from(e)).context(CsvSnafu { path }),
        };
        let table = read_csv_table(file, &path)?;
        info!(symbol = %symbol, rows = table.len(), path = %path.display(), "loaded saved series");
        Ok(table)
    }
}

fn read_csv_table<R: std::io::Read>(reader: R, path: &Path) -> Result<RawTable, ProviderError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().context(CsvSnafu { path })?.clone();
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut index = Vec::new();
    let mut cells: Vec<Vec<RawValue>> = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record.context(CsvSnafu { path })?;
        index.push(record.get(0).and_then(parse_timestamp_text));
        for (col, values) in cells.iter_mut().enumerate() {
            let value = match record.get(col + 1) {
                Some(text) if !text.trim().is_empty() => RawValue::Text(text.to_string()),
                _ => RawValue::Missing,
            };
            values.push(value);
        }
    }

    let mut table = RawTable::new();
    table.index = index;
    for (name, values) in names.into_iter().zip(cells) {
        table.insert_column(name, values);
    }
    Ok(table)
}

/// Keeps rows in `[start, end)`. Rows without a date are kept for the
/// normalizer to report and drop.
fn retain_range(table: &mut RawTable, range: &DateRange) {
    let keep: Vec<bool> = table
        .index
        .iter()
        .map(|ts| match ts {
            Some(ts) => range.start <= ts.date() && ts.date() < range.end,
            None => true,
        })
        .collect();
    retain_rows(table, &keep);
}

fn retain_rows(table: &mut RawTable, keep: &[bool]) {
    let mut flags = keep.iter();
    table.index.retain(|_| *flags.next().unwrap_or(&false));
    for values in table.columns.values_mut() {
        let mut flags = keep.iter();
        values.retain(|_| *flags.next().unwrap_or(&false));
    }
}

#[async_trait]
impl DataProvider for CsvFileProvider {
    async fn lookup_recent(&self, symbol: &Symbol) -> Result<RawTable, ProviderError> {
        let mut table = self.read_table(symbol)?;
        let rows = table.len();
        let keep: Vec<bool> = (0..rows).map(|row| row + 1 == rows).collect();
        retain_rows(&mut table, &keep);
        Ok(table)
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<RawTable, ProviderError> {
        let mut table = self.read_table(symbol)?;
        retain_range(&mut table, range);
        Ok(table)
    }
}
