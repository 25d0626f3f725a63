//! Delete command implementation.

use anyhow::{Context, Result};
use clap::Args;

use restauth::Client;

use crate::output;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Resource path relative to the base URL
    pub path: String,
}

pub async fn run(client: &Client, args: DeleteArgs) -> Result<()> {
    client
        .delete(&args.path)
        .await
        .with_context(|| format!("Failed to delete '{}'", args.path))?;

    output::success(&format!("Deleted {}", args.path));

    Ok(())
}
