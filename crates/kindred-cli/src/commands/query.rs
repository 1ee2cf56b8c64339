//! Relationship query commands

use std::time::Duration;

use clap::Args;

use crate::output::{self, emit};
use crate::AppContext;
use kindred_core::{EdgeKinds, IndividualId};
use kindred_query::QueryOptions;

/// Search flags shared by every query
#[derive(Args)]
pub struct SearchFlags {
    /// Edge kinds to follow: all, parents, biological-only, or a comma list
    #[arg(short, long)]
    pub kinds: Option<EdgeKinds>,

    /// Maximum search depth
    #[arg(short = 'd', long)]
    pub max_depth: Option<u32>,

    /// Abort the query after this many milliseconds
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,
}

impl SearchFlags {
    fn options(&self) -> QueryOptions {
        let mut options = QueryOptions::new();
        if let Some(kinds) = self.kinds {
            options = options.with_kinds(kinds);
        }
        if let Some(depth) = self.max_depth {
            options = options.with_depth(depth);
        }
        if let Some(timeout) = self.timeout_ms {
            options = options.with_timeout(Duration::from_millis(timeout));
        }
        options
    }
}

#[derive(Args)]
pub struct PathArgs {
    /// Starting individual
    pub start: String,
    /// Target individual
    pub end: String,
    /// Show every shortest path instead of one
    #[arg(short, long)]
    pub all: bool,
    /// Maximum shortest paths to show with --all
    #[arg(long)]
    pub max_paths: Option<usize>,
    #[command(flatten)]
    pub search: SearchFlags,
}

#[derive(Args)]
pub struct AncestorsArgs {
    /// Individual whose ancestors to list
    pub id: String,
    #[command(flatten)]
    pub search: SearchFlags,
}

#[derive(Args)]
pub struct PairArgs {
    /// First individual
    pub a: String,
    /// Second individual
    pub b: String,
    #[command(flatten)]
    pub search: SearchFlags,
}

pub async fn path(args: &PathArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let mut options = args.search.options().with_all_paths(args.all);
    if let Some(max) = args.max_paths {
        options = options.with_max_paths(max);
    }

    tracing::info!("Finding path from {} to {}", args.start, args.end);
    let response = ctx
        .service
        .find_path(
            &IndividualId::from(&args.start),
            &IndividualId::from(&args.end),
            options,
        )
        .await?;
    emit(&response, ctx.format, output::path_table)
}

pub async fn ancestors(args: &AncestorsArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let ancestors = ctx
        .service
        .ancestors(&IndividualId::from(&args.id), args.search.options())
        .await?;
    tracing::info!("Found {} ancestors of {}", ancestors.len(), args.id);
    emit(&ancestors, ctx.format, output::ancestors_table)
}

pub async fn common(args: &PairArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let set = ctx
        .service
        .find_common_ancestors(
            &IndividualId::from(&args.a),
            &IndividualId::from(&args.b),
            args.search.options(),
        )
        .await?;
    emit(&set, ctx.format, output::common_ancestors_table)
}

pub async fn classify(args: &PairArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let classification = ctx
        .service
        .classify_relationship(
            &IndividualId::from(&args.a),
            &IndividualId::from(&args.b),
            args.search.options(),
        )
        .await?;
    emit(&classification, ctx.format, output::classification_table)
}
