use thiserror::Error;

use crate::{
    config::ConfigError,
    io::sink::SinkError,
    providers::{ProviderError, ProviderInitError},
    render::RenderError,
};

/// The unified error type for the `price_visualizer` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from a data provider (e.g., API error, unreadable file).
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The configured provider could not be constructed.
    #[error("Provider setup error: {0}")]
    ProviderInit(#[from] ProviderInitError),

    /// An error originating from a data sink (e.g., file I/O).
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Drawing or displaying a chart failed.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// An error related to configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A generic I/O error, usually from the console.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
