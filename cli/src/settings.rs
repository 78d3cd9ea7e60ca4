//! # Configuration Arguments
//!
//! Flags shared by every subcommand. Values resolve in order: flag or
//! environment variable, then the YAML file given by `--config`, then the
//! built-in defaults.

use crate::error::CliResult;
use std::path::PathBuf;
use trellis_core::FrameworkConfig;

/// Options locating the features tree and shaping the routes.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML framework configuration file.
    #[clap(long, env = "TRELLIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory of the features tree.
    #[clap(long, env = "TRELLIS_FEATURES_DIR")]
    pub features_dir: Option<PathBuf>,

    /// Path segment prefixed to every route.
    #[clap(long, env = "TRELLIS_API_ROOT")]
    pub api_root: Option<String>,
}

impl ConfigArgs {
    /// Builds the validated framework configuration.
    pub fn resolve(&self) -> CliResult<FrameworkConfig> {
        let mut config = match &self.config {
            Some(path) => FrameworkConfig::from_file(path)?,
            None => FrameworkConfig::default(),
        };

        if let Some(dir) = &self.features_dir {
            config.features_dir = dir.clone();
        }
        if let Some(root) = &self.api_root {
            config.api_root = root.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
