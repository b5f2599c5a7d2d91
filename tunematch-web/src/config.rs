//! Configuration resolution for tunematch-web
//!
//! Priority: CLI → ENV → TOML → built-in defaults. Credentials are resolved
//! separately by `tunematch_common::config::resolve_credentials` and are
//! required before the server starts.

use clap::Parser;
use std::path::PathBuf;
use tunematch_common::config::{load_toml_config, resolve_config_path, TomlConfig};

/// Command-line arguments
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "tunematch-web", version, about = "Track lookup and taste-profile verdict service")]
pub struct Cli {
    /// Path to the TOML config file (also TUNEMATCH_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// HTTP port
    #[arg(long, env = "TUNEMATCH_PORT")]
    pub port: Option<u16>,

    /// Path to the classifier artifact
    #[arg(long, env = "TUNEMATCH_MODEL")]
    pub model: Option<PathBuf>,
}

impl Cli {
    /// Overlay command-line values onto the TOML config
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
    }
}

/// Load TOML (or defaults) and apply command-line overrides
pub fn load_config(cli: &Cli) -> tunematch_common::Result<TomlConfig> {
    let path = resolve_config_path(cli.config.as_deref());
    let mut config = load_toml_config(path.as_deref())?;
    cli.apply_overrides(&mut config);
    Ok(config)
}
