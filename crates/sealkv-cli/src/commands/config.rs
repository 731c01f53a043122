//! Configuration management commands.

use std::path::PathBuf;

use clap::Args;
use sealkv_core::{paths, Config};
use tracing::info;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Validate configuration
    Validate,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

/// Run the config command.
///
/// `path` is the file named on the command line, if any; `config` is the
/// configuration already loaded from it.
pub async fn run(args: ConfigArgs, path: Option<PathBuf>, config: Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_json5()?);
        }

        ConfigCommand::Validate => match config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => anyhow::bail!("Configuration error: {}", e),
        },

        ConfigCommand::Init { force } => {
            let path = resolve_path(path)?;
            init(&path, force)?;
            println!("Created config file: {}", path.display());
        }

        ConfigCommand::Path => {
            println!("{}", resolve_path(path)?.display());
        }
    }

    Ok(())
}

fn resolve_path(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Ok(paths::config_file()?),
    }
}

fn init(path: &std::path::Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }
    Config::default().save(path)?;
    info!(path = %path.display(), "wrote default config");
    Ok(())
}
