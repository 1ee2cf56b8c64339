//! Graph inspection commands

use anyhow::Context;

use crate::config::Config;
use crate::output::{self, emit, GraphReport};
use crate::{AppContext, Cli};
use kindred_core::Snapshot;
use kindred_store::{GraphSource, JsonFileSource};

pub fn stats(ctx: &AppContext) -> anyhow::Result<()> {
    let report = GraphReport {
        snapshot: ctx.service.snapshot_info(),
        stats: ctx.service.store().snapshot().stats(),
    };
    emit(&report, ctx.format, output::stats_table)
}

/// Parse and index a graph document, reporting the first problem found
pub async fn validate(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let path = cli
        .graph
        .clone()
        .or_else(|| config.graph.clone())
        .context("No graph document given")?;

    let data = JsonFileSource::new(&path).load_graph().await?;
    let declared_edges = data.edges.len();
    let snapshot = Snapshot::build(data)
        .with_context(|| format!("{} is not a valid graph", path.display()))?;

    if declared_edges != snapshot.edge_count() {
        tracing::info!(
            "Collapsed {} duplicate edges",
            declared_edges - snapshot.edge_count()
        );
    }

    if !cli.quiet {
        println!(
            "{}: valid ({} individuals, {} edges)",
            path.display(),
            snapshot.len(),
            snapshot.edge_count()
        );
    }
    Ok(())
}
