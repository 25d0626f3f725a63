//! Post command implementation.

use anyhow::{Context, Result};
use clap::Args;

use restauth::Client;

use crate::output;

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Resource path relative to the base URL
    pub path: String,

    /// Inline JSON body
    #[arg(long, short = 'd', conflicts_with = "json")]
    pub data: Option<String>,

    /// JSON file with the body (use - for stdin)
    #[arg(long)]
    pub json: Option<String>,
}

pub async fn run(client: &Client, args: PostArgs) -> Result<()> {
    let body = super::read_json(args.data.as_deref(), args.json.as_deref())?;

    let created = client
        .post(&args.path, &body)
        .await
        .with_context(|| format!("Failed to create entry at '{}'", args.path))?;

    output::json_pretty(&created)?;
    output::success(&format!("Created entry at {}", args.path));

    Ok(())
}
