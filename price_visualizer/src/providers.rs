//! Provider abstraction for historical price sources.
//!
//! This module defines the [`DataProvider`] trait, the seam between the
//! interactive pipeline and whatever source answers "does this symbol have
//! data" and "give me its daily history".
//!
//! Concrete providers:
//! - [`yahoo_chart::YahooChartProvider`]: Yahoo Finance v8 chart endpoint over HTTPS.
//! - [`csv_file::CsvFileProvider`]: replays previously saved CSV files from disk.
//!
//! Providers return an uncleaned [`RawTable`]; cleaning is the job of
//! [`crate::normalize`]. An empty table is a valid answer and means "no data".
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use price_visualizer::models::{date_range::DateRange, raw_table::RawTable, symbol::Symbol};
//! use price_visualizer::providers::{DataProvider, ProviderError};
//!
//! struct NothingProvider;
//!
//! #[async_trait]
//! impl DataProvider for NothingProvider {
//!     async fn lookup_recent(&self, _symbol: &Symbol) -> Result<RawTable, ProviderError> {
//!         Ok(RawTable::new())
//!     }
//!
//!     async fn fetch_history(
//!         &self,
//!         _symbol: &Symbol,
//!         _range: &DateRange,
//!     ) -> Result<RawTable, ProviderError> {
//!         Ok(RawTable::new())
//!     }
//! }
//! ```

pub mod csv_file;
pub mod yahoo_chart;

use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::{
    config::{ProviderConfig, ProviderKind},
    models::{date_range::DateRange, raw_table::RawTable, symbol::Symbol},
};

/// Trait for fetching daily price history from a market data source.
///
/// The trait is designed for async usage and supports dynamic dispatch
/// (`dyn DataProvider`) for runtime selection of providers.
#[async_trait]
pub trait DataProvider {
    /// Fetches the most recent trading day for `symbol`.
    ///
    /// Used purely as an existence check: a non-empty table means the
    /// symbol is known to the source.
    async fn lookup_recent(&self, symbol: &Symbol) -> Result<RawTable, ProviderError>;

    /// Fetches daily rows for `symbol` from `range.start` (inclusive) to
    /// `range.end` (exclusive).
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<RawTable, ProviderError>;
}

/// Build and return a boxed data provider for the configured source.
pub fn build_provider(
    config: &ProviderConfig,
) -> Result<Box<dyn DataProvider + Send + Sync>, ProviderInitError> {
    match config.kind {
        ProviderKind::Yahoo => {
            let p = yahoo_chart::YahooChartProvider::new(config)?;
            Ok(Box::new(p))
        }
        ProviderKind::Csv => {
            let dir = config
                .data_dir
                .clone()
                .ok_or_else(|| MissingDataDirSnafu.build())?;
            Ok(Box::new(csv_file::CsvFileProvider::new(dir)))
        }
    }
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// User agent contains invalid characters.
    #[snafu(display("Invalid user agent: {source}"))]
    InvalidUserAgent {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// The CSV provider needs a directory to read from.
    #[snafu(display("The csv provider requires `provider.data_dir` to be set"))]
    MissingDataDir { backtrace: Backtrace },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with an error payload or status.
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The response body could not be decoded.
    #[snafu(display("Failed to decode provider response: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// A saved series file could not be read.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Csv {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },
}
