//! Config command for managing CLI configuration

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Get a config value
    Get {
        /// Config key name
        key: String,
    },
    /// Set a config value (an empty value unsets it)
    Set {
        /// Config key name
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
    /// Write a default config file
    Init {
        /// Default graph document to record
        #[arg(long)]
        graph: Option<PathBuf>,
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(args: &ConfigArgs) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => {
            let config = Config::load();
            match config.get(key) {
                Some(value) => println!("{}", value),
                None => anyhow::bail!(
                    "Unknown config key: {} (available: {})",
                    key,
                    Config::keys().join(", ")
                ),
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load();
            config.set(key, value)?;
            config.save()?;
            tracing::info!("Updated {} in {}", key, config_file_path().display());
            println!("Set {} = {}", key, value);
        }
        ConfigCommands::List => {
            let config = Config::load();
            println!("# {}", config_file_path().display());
            for key in Config::keys() {
                match config.get(key).filter(|v| !v.is_empty()) {
                    Some(value) => println!("{} = {}", key, value),
                    None => println!("{} = (not set)", key),
                }
            }
        }
        ConfigCommands::Path => println!("{}", config_file_path().display()),
        ConfigCommands::Init { graph, force } => {
            let path = config_file_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }

            let config = Config {
                graph: graph.clone(),
                ..Config::default()
            };
            config.save()?;
            println!("Created config file at {}", path.display());
        }
    }
    Ok(())
}
