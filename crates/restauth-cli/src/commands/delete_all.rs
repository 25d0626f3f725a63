//! Delete-all command implementation.

use anyhow::{Context, Result};
use clap::Args;

use restauth::{BatchSummary, Client};

use crate::output;

use super::post_all::{ItemOutcome, report};

#[derive(Args, Debug)]
pub struct DeleteAllArgs {
    /// Resource paths relative to the base URL
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Maximum requests in flight
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}

pub async fn run(client: &Client, args: DeleteAllArgs) -> Result<()> {
    let results = if args.concurrency > 1 {
        client
            .delete_all_concurrent(args.paths.as_slice(), args.concurrency)
            .await
    } else {
        client.delete_all(args.paths.as_slice()).await
    };

    let summary = BatchSummary::of(&results);
    for (index, result) in results.into_iter().enumerate() {
        let result = result.map(|()| None);
        output::json(&ItemOutcome::from_result(index, &result))?;
    }

    report(&summary, args.paths.len()).context("Batch delete incomplete")
}
