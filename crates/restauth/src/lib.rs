//! restauth - Self-authenticating REST client
//!
//! This library wraps a REST backend behind a [`Client`] that logs in on
//! construction, attaches its access token to every request, and renews the
//! token when the backend rejects it.
//!
//! - Login tries the optional refresh endpoint, then the credential endpoint;
//!   both signal success with `202 Accepted` and an `access_token` field.
//! - Connectivity failures during login are retried until the backend is
//!   reachable.
//! - `post`/`get`/`delete` expect `201`/`200`/`204`; a `401` causes one
//!   re-login and one retry.
//! - `post_all`/`delete_all` return one result per item and never fail as a
//!   whole.
//!
//! # Example
//!
//! ```no_run
//! use restauth::{BatchSummary, Client, ClientConfig, Credentials};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), restauth::Error> {
//! let config = ClientConfig::builder(
//!     "https://api.example.com",
//!     "/auth/login",
//!     Credentials::new("alice", "s3cret"),
//! )
//! .refresh_endpoint("/auth/refresh")
//! .build()?;
//!
//! let client = Client::connect(config).await?;
//!
//! let results = client
//!     .post_all("items", &[json!({"name": "a"}), json!({"name": "b"})])
//!     .await;
//! let summary = BatchSummary::of(&results);
//! println!("{} created, failed: {:?}", summary.succeeded, summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

// Re-export primary types at crate root for convenience
pub use auth::{AccessToken, Credentials, SessionManager, TokenStore};
pub use batch::BatchSummary;
pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{AuthError, ClientError, Error, TransportError};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
