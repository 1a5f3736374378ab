//! Runtime configuration.
//!
//! Every field has a default, so running without a file behaves like the
//! plain interactive programs: Yahoo as the source, files written to the
//! working directory. Precedence, lowest to highest: defaults, TOML file,
//! environment (`PRICE_VISUALIZER_*`), command line.
//!
//! ```toml
//! output_dir = "out"
//!
//! [provider]
//! kind = "yahoo"            # or "csv"
//! timeout_secs = 30
//! # data_dir = "saved"      # required for kind = "csv"
//!
//! [line]
//! padding = 10.0
//!
//! [candlestick]
//! file_name = "candlestick_plot.png"
//! width = 1600
//! height = 1000
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared_utils::env::{EnvVarError, env_override};
use thiserror::Error;
use tracing::error;

use crate::{
    providers::yahoo_chart::provider::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT},
    render::candlestick::DEFAULT_FILE_NAME,
};

pub const OUTPUT_DIR_VAR: &str = "PRICE_VISUALIZER_OUTPUT_DIR";
pub const BASE_URL_VAR: &str = "PRICE_VISUALIZER_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Env(#[from] EnvVarError),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VisualizerConfig {
    /// Directory receiving the CSV and PNG artifacts.
    pub output_dir: PathBuf,
    pub provider: ProviderConfig,
    pub line: LineConfig,
    pub candlestick: CandlestickConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Where the csv provider looks for saved series.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LineConfig {
    /// Upward shift applied to the Open line and margin around the y range.
    pub padding: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CandlestickConfig {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            provider: ProviderConfig::default(),
            line: LineConfig::default(),
            candlestick: CandlestickConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            data_dir: None,
        }
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self { padding: 10.0 }
    }
}

impl Default for CandlestickConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            width: 1600,
            height: 1000,
        }
    }
}

impl VisualizerConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| {
            error!("Failed to read config file: {:?}", source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Defaults, then the optional file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => Self::default(),
        };
        config.apply_env_with(env_override)?;
        Ok(config)
    }

    /// Applies overrides using `lookup` to read variables.
    pub fn apply_env_with<F>(&mut self, mut lookup: F) -> Result<(), EnvVarError>
    where
        F: FnMut(&str) -> Result<Option<String>, EnvVarError>,
    {
        if let Some(dir) = lookup(OUTPUT_DIR_VAR)? {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(BASE_URL_VAR)? {
            self.provider.base_url = url;
        }
        Ok(())
    }
}
