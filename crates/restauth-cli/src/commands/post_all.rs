//! Post-all command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use restauth::{BatchSummary, Client};

use crate::output;

#[derive(Args, Debug)]
pub struct PostAllArgs {
    /// Resource path relative to the base URL
    pub path: String,

    /// Inline JSON array of bodies
    #[arg(long, short = 'd', conflicts_with = "json")]
    pub data: Option<String>,

    /// JSON file holding an array of bodies (use - for stdin)
    #[arg(long)]
    pub json: Option<String>,

    /// Maximum requests in flight
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}

/// One line of batch output.
#[derive(Debug, Serialize)]
pub(super) struct ItemOutcome {
    pub index: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemOutcome {
    pub(super) fn from_result(index: usize, result: &restauth::Result<Option<Value>>) -> Self {
        match result {
            Ok(body) => Self {
                index,
                ok: true,
                body: body.clone(),
                status: None,
                error: None,
            },
            Err(err) => Self {
                index,
                ok: false,
                body: None,
                status: err.status(),
                error: Some(err.to_string()),
            },
        }
    }
}

pub async fn run(client: &Client, args: PostAllArgs) -> Result<()> {
    let input = super::read_json(args.data.as_deref(), args.json.as_deref())?;
    let Value::Array(items) = input else {
        bail!("Expected a JSON array of bodies");
    };

    let results = if args.concurrency > 1 {
        client
            .post_all_concurrent(&args.path, &items, args.concurrency)
            .await
    } else {
        client.post_all(&args.path, &items).await
    };

    let summary = BatchSummary::of(&results);
    for (index, result) in results.into_iter().enumerate() {
        let result = result.map(Some);
        output::json(&ItemOutcome::from_result(index, &result))?;
    }

    report(&summary, items.len()).context("Batch create incomplete")
}

pub(super) fn report(summary: &BatchSummary, total: usize) -> Result<()> {
    if summary.all_succeeded() {
        output::success(&format!("{} of {} succeeded", summary.succeeded, total));
        Ok(())
    } else {
        output::error(&format!(
            "{} of {} failed (indices {:?})",
            summary.failed.len(),
            total,
            summary.failed
        ));
        bail!("{} item(s) failed", summary.failed.len())
    }
}
