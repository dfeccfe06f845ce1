//! Command line arguments

use crate::error::{CliError, CliResult};
use bridge::BridgeConfig;
use clap::Parser;

/// Runs guest scripts with host bindings
#[derive(Debug, Parser)]
#[command(name = "corten-bridge", version, about)]
pub struct Cli {
    /// Script file to execute
    #[arg(short, long)]
    pub file: Option<String>,

    /// Inline script to evaluate
    #[arg(short, long)]
    pub eval: Option<String>,

    /// Start the interactive REPL
    #[arg(short, long)]
    pub repl: bool,

    /// Time budget of each evaluation in seconds
    #[arg(long)]
    pub time_limit: Option<u64>,

    /// Engine flag string, e.g. "--stack-limit=128 --expose-gc"
    #[arg(long, allow_hyphen_values = true)]
    pub flags: Option<String>,

    /// Convert guest objects carrying __hostPackage into host instances
    #[arg(long)]
    pub bless: bool,

    /// Prefix of synthesized host class names
    #[arg(long)]
    pub bless_prefix: Option<String>,

    /// JSON configuration file; command line options take precedence
    #[arg(long)]
    pub config: Option<String>,

    /// Log bridge diagnostics to stderr
    #[arg(long)]
    pub trace: bool,
}

impl Cli {
    /// Builds the bridge configuration from `--config` and the overriding
    /// command line options.
    pub fn bridge_config(&self) -> CliResult<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                BridgeConfig::from_json(&json).map_err(|e| CliError::Config(format!("{}: {}", path, e)))?
            }
            None => BridgeConfig::default(),
        };
        if let Some(seconds) = self.time_limit {
            config.time_limit = seconds;
        }
        if let Some(flags) = &self.flags {
            config.flags = flags.clone();
        }
        if self.bless {
            config.enable_blessing = true;
        }
        if let Some(prefix) = &self.bless_prefix {
            config.bless_prefix = prefix.clone();
        }
        Ok(config)
    }
}
