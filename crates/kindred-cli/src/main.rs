//! Kindred CLI - Command line interface for the relationship engine

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{batch, completions, graph, query};
use config::Config;
use kindred_query::{QueryService, ServiceConfig};
use kindred_store::{GraphStore, JsonFileSource};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "kindred")]
#[command(author, version, about = "Genealogical relationship engine")]
pub struct Cli {
    /// Graph document (JSON)
    #[arg(short, long, global = true, env = "KINDRED_GRAPH")]
    pub graph: Option<PathBuf>,

    /// Output format: table, json
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Output format from the flag, then the config file
    pub fn output_format(&self, config: &Config) -> OutputFormat {
        OutputFormat::from(self.format.as_deref().unwrap_or(&config.format))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Shortest connecting path between two individuals
    Path(query::PathArgs),
    /// Ancestors of one individual, nearest first
    Ancestors(query::AncestorsArgs),
    /// Nearest common ancestors of two individuals
    Common(query::PairArgs),
    /// How the first individual relates to the second
    Classify(query::PairArgs),
    /// Graph statistics
    Stats,
    /// Check a graph document without querying it
    Validate,
    /// Run JSON requests, one per line
    Batch(batch::BatchArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the loaded graph
pub struct AppContext {
    pub service: QueryService,
    pub format: OutputFormat,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let path = cli
            .graph
            .clone()
            .or_else(|| config.graph.clone())
            .context("No graph document given (use --graph, KINDRED_GRAPH or `kindred config set graph <path>`)")?;
        tracing::debug!("Using graph document at: {:?}", path);

        let store = GraphStore::new();
        store
            .load_from(&JsonFileSource::new(&path))
            .await
            .with_context(|| format!("Failed to load graph from {}", path.display()))?;

        let mut service_config = ServiceConfig::new();
        if let Some(concurrency) = config.concurrency {
            service_config = service_config.with_concurrency(concurrency);
        }
        if let Some(depth) = config.path_depth {
            service_config = service_config.with_path_depth(depth);
        }
        if let Some(depth) = config.ancestor_depth {
            service_config = service_config.with_ancestor_depth(depth);
        }
        service_config.timeout_ms = config.timeout_ms;

        Ok(Self {
            format: cli.output_format(&config),
            service: QueryService::with_config(Arc::new(store), service_config),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting kindred CLI");

    // Commands that need no graph
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args).await,
        Commands::Completions(args) => return completions::run(args),
        Commands::Validate => return graph::validate(&cli, &Config::load()).await,
        _ => {}
    }

    let ctx = AppContext::new(&cli, Config::load()).await?;

    match &cli.command {
        Commands::Path(args) => query::path(args, &ctx).await?,
        Commands::Ancestors(args) => query::ancestors(args, &ctx).await?,
        Commands::Common(args) => query::common(args, &ctx).await?,
        Commands::Classify(args) => query::classify(args, &ctx).await?,
        Commands::Stats => graph::stats(&ctx)?,
        Commands::Batch(args) => batch::run(args, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) | Commands::Validate => {}
    }

    Ok(())
}
