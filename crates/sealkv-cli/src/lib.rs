//! sealkv command-line interface.

pub mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use sealkv_core::{Config, ConfigError};

/// sealkv - encrypted key-value store
#[derive(Parser)]
#[command(name = "sealkv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "SEALKV_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the value stored at a key
    Get {
        key: String,
    },

    /// Store a value
    Set {
        key: String,
        value: String,
    },

    /// Remove one or more keys
    Remove {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// List stored keys
    Keys,

    /// Print several values as a JSON object
    MultiGet {
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Store several KEY=VALUE pairs in one batch
    MultiSet {
        #[arg(required = true, value_parser = commands::store::parse_pair)]
        pairs: Vec<(String, String)>,
    },

    /// Shallow-merge a JSON object into the value at a key
    Merge {
        key: String,
        value: String,
    },

    /// Merge several KEY=VALUE pairs in one batch
    MultiMerge {
        #[arg(required = true, value_parser = commands::store::parse_pair)]
        pairs: Vec<(String, String)>,
    },

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Load the config named on the command line, or the default one.
///
/// An explicit path must exist; the default path falls back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            let mut config = Config::load(path)?;
            config.apply_env();
            Ok(config)
        }
        None => Config::load_or_default(),
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Config(args) => commands::config::run(args, cli.config, config).await,
        Commands::Version => {
            println!("sealkv {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => commands::store::run(command, &config).await,
    }
}
