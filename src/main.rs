//! gh - GitHub on the command line.
//!
//! This binary exposes the `config` command: reading and setting values in
//! the per-user configuration file.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gh_config::{Config, ConfigLoader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gh", version, about = "GitHub on the command line")]
struct Cli {
    /// Path to the configuration file (defaults to ~/.config/gh/config.yml)
    #[arg(long, global = true, env = "GH_CONFIG_FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set and get gh settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the value of a setting
    Get {
        /// The setting to read, e.g. `editor` or `git_protocol`
        key: String,
    },
    /// Change the value of a setting
    Set {
        /// The setting to change
        key: String,
        /// The new value
        value: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(?cli, "parsed arguments");
    let loader = ConfigLoader::new();

    match cli.command {
        Command::Config(ConfigCommand::Get { key }) => {
            let config = match &cli.config {
                Some(path) => loader.load(path),
                None => loader.load_default(),
            }
            .context("failed to read config")?;

            if let Some(value) = config.get(&key)? {
                println!("{value}");
            }
        }
        Command::Config(ConfigCommand::Set { key, value }) => {
            let mut config = match &cli.config {
                Some(path) => loader.load_for_write(path),
                None => loader.load_default_for_write(),
            }
            .context("failed to prepare config for writing")?;

            config.set(&key, &value)?;
            // TODO: write the document back once comment-preserving output exists.
            println!("setting {key} to {value}");
        }
    }

    Ok(())
}
