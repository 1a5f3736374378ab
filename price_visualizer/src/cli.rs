use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, VisualizerConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to an optional TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the CSV (and PNG) output; overrides config and environment
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    /// Loads the config file and environment, then applies flags on top.
    pub fn load_config(&self) -> Result<VisualizerConfig, ConfigError> {
        let mut config = VisualizerConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::CommandFactory;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_flags_means_no_overrides() {
        let cli = Cli::try_parse_from(["stock-price-visualizer"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.output_dir.is_none());
    }

    #[test]
    fn output_dir_flag_beats_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("visualizer.toml");
        fs::write(&config_path, "output_dir = \"from-file\"\n[line]\npadding = 5.0\n").unwrap();

        let cli = Cli::try_parse_from([
            "stock-price-visualizer",
            "--config",
            config_path.to_str().unwrap(),
            "--output-dir",
            "from-flag",
        ])
        .unwrap();
        let config = cli.load_config().unwrap();
        assert_eq!(config.output_dir, PathBuf::from("from-flag"));
        assert_eq!(config.line.padding, 5.0);
    }
}
