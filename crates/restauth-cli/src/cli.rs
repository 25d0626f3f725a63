//! CLI argument definitions.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser};

use restauth::{ClientConfig, Credentials};

use crate::commands::Command;

/// Issue authenticated requests against a REST backend.
#[derive(Parser, Debug)]
#[command(name = "restauth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Backend location and credentials.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Backend base URL
    #[arg(long, env = "RESTAUTH_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Credential login endpoint path
    #[arg(long, env = "RESTAUTH_AUTH_ENDPOINT", global = true)]
    pub auth_endpoint: Option<String>,

    /// Refresh endpoint path, tried before the credential login
    #[arg(long, env = "RESTAUTH_REFRESH_ENDPOINT", global = true)]
    pub refresh_endpoint: Option<String>,

    /// Login username
    #[arg(long, env = "RESTAUTH_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password
    #[arg(long, env = "RESTAUTH_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> Result<ClientConfig> {
        let base_url = self
            .base_url
            .as_deref()
            .context("Missing base URL (--base-url or RESTAUTH_BASE_URL)")?;
        let auth_endpoint = self
            .auth_endpoint
            .as_deref()
            .context("Missing auth endpoint (--auth-endpoint or RESTAUTH_AUTH_ENDPOINT)")?;
        let username = self
            .username
            .as_deref()
            .context("Missing username (--username or RESTAUTH_USERNAME)")?;
        let password = self
            .password
            .as_deref()
            .context("Missing password (--password or RESTAUTH_PASSWORD)")?;

        let mut builder =
            ClientConfig::builder(base_url, auth_endpoint, Credentials::new(username, password));
        if let Some(ref refresh) = self.refresh_endpoint {
            builder = builder.refresh_endpoint(refresh);
        }
        if let Some(secs) = self.timeout {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }

        builder.build().context("Invalid client configuration")
    }
}
