//! Get command implementation.

use anyhow::{Context, Result};
use clap::Args;

use restauth::Client;

use crate::output;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Resource path relative to the base URL
    pub path: String,
}

pub async fn run(client: &Client, args: GetArgs) -> Result<()> {
    let body = client
        .get(&args.path)
        .await
        .with_context(|| format!("Failed to get '{}'", args.path))?;

    output::json_pretty(&body)
}
