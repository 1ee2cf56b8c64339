//! Batch mode: JSON requests in, JSON responses out

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::AppContext;
use kindred_query::QueryResponse;

#[derive(Args)]
pub struct BatchArgs {
    /// File with one JSON request per line (stdin if omitted)
    pub input: Option<PathBuf>,
}

pub async fn run(args: &BatchArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let lines = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            read_lines(BufReader::new(file)).await?
        }
        None => read_lines(BufReader::new(tokio::io::stdin())).await?,
    };

    // Lines that are not JSON get an error response in their slot
    let mut responses: Vec<Option<QueryResponse>> = Vec::with_capacity(lines.len());
    let mut requests = Vec::new();
    for line in &lines {
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => {
                requests.push(value);
                responses.push(None);
            }
            Err(e) => responses.push(Some(QueryResponse::invalid_request(format!(
                "Invalid JSON: {}",
                e
            )))),
        }
    }

    tracing::info!("Running {} batch requests", requests.len());
    let mut answered = ctx.service.handle_batch(requests).await.into_iter();

    let mut failures = 0usize;
    for slot in responses {
        let response = match slot {
            Some(response) => response,
            None => answered
                .next()
                .context("Batch returned fewer responses than requests")?,
        };
        if response.error.as_ref().is_some_and(|e| !e.negative) {
            failures += 1;
        }
        println!("{}", serde_json::to_string(&response)?);
    }

    if failures > 0 {
        tracing::warn!("{} batch requests failed", failures);
    }
    Ok(())
}

async fn read_lines<R>(reader: BufReader<R>) -> anyhow::Result<Vec<String>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = reader.lines();
    let mut out = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            out.push(line.to_string());
        }
    }
    Ok(out)
}
