#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod render;
