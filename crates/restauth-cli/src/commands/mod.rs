//! Subcommand implementations.

mod delete;
mod delete_all;
mod get;
mod post;
mod post_all;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::Value;
use tracing::debug;

use restauth::Client;

use crate::cli::ConnectionArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a resource
    Get(get::GetArgs),

    /// Create a resource
    Post(post::PostArgs),

    /// Delete a resource
    Delete(delete::DeleteArgs),

    /// Create one resource per element of a JSON array
    PostAll(post_all::PostAllArgs),

    /// Delete several resources
    DeleteAll(delete_all::DeleteAllArgs),
}

pub async fn handle(connection: ConnectionArgs, command: Command) -> Result<()> {
    let config = connection.to_config()?;
    debug!(base_url = %config.base_url(), username = %config.credentials().username(), "Connecting");
    let client = Client::connect(config).await.context("Failed to login")?;

    match command {
        Command::Get(args) => get::run(&client, args).await,
        Command::Post(args) => post::run(&client, args).await,
        Command::Delete(args) => delete::run(&client, args).await,
        Command::PostAll(args) => post_all::run(&client, args).await,
        Command::DeleteAll(args) => delete_all::run(&client, args).await,
    }
}

/// Read JSON from inline text, a file, or stdin (`-`).
fn read_json(inline: Option<&str>, file: Option<&str>) -> Result<Value> {
    if let Some(text) = inline {
        return serde_json::from_str(text).context("Invalid JSON in --data");
    }

    match file {
        Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            serde_json::from_str(&buf).context("Invalid JSON from stdin")
        }
        Some(path) => {
            let content = std::fs::read_to_string(path).context("Failed to read JSON file")?;
            serde_json::from_str(&content).context("Invalid JSON in file")
        }
        None => Ok(Value::Object(serde_json::Map::new())),
    }
}
