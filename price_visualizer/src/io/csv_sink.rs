//! Writes cleaned series to `{SYMBOL}_stock_data_Indexed.csv`.
//!
//! Layout: a `Date` header followed by the series' columns in order, dates as
//! `YYYY-MM-DD`, every value with exactly two decimals. An existing file of
//! the same name is overwritten without asking.

use std::{
    fs,
    path::{Path, PathBuf},
};

use csv::WriterBuilder;
use tracing::info;

use crate::{
    io::sink::{DataSink, SinkError},
    models::{price_series::PriceSeries, raw_table::DATE_COLUMN, symbol::Symbol},
};

pub fn series_file_name(symbol: &Symbol) -> String {
    format!("{symbol}_stock_data_Indexed.csv")
}

pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.output_dir.join(series_file_name(symbol))
    }
}

impl DataSink for CsvSink {
    type Output = PathBuf;

    fn write(&self, series: &PriceSeries) -> Result<PathBuf, SinkError> {
        if !self.output_dir.as_os_str().is_empty() && !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).map_err(|source| SinkError::CreateDir {
                path: self.output_dir.clone(),
                source,
            })?;
        }

        let path = self.path_for(&series.symbol);
        write_series(series, &path).map_err(|source| SinkError::Write {
            path: path.clone(),
            source,
        })?;

        info!(symbol = %series.symbol, rows = series.len(), path = %path.display(), "series saved");
        Ok(path)
    }
}

fn write_series(series: &PriceSeries, path: &Path) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().from_path(path)?;

    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(series.columns.keys().cloned());
    writer.write_record(&header)?;

    for (row, date) in series.dates.iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(date.format("%Y-%m-%d").to_string());
        record.extend(
            series
                .columns
                .values()
                .map(|values| format!("{:.2}", values[row])),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
