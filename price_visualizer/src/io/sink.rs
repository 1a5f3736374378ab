use std::path::PathBuf;

use thiserror::Error;

use crate::models::price_series::PriceSeries;

#[derive(Debug, Error)]
pub enum SinkError {
    /// The destination directory could not be created.
    #[error("Failed to create directory at {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An error occurred while writing the data (file I/O or encoding).
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: csv::Error },
}

pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink returns the path it wrote; other sinks may report
    /// something else, e.g. a row count.
    type Output;

    /// Writes a cleaned series to the destination.
    fn write(&self, series: &PriceSeries) -> Result<Self::Output, SinkError>;
}
