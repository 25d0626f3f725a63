//! Authentication types and session management.
//!
//! This module owns the access token lifecycle: credentials, the shared
//! [`TokenStore`] and the [`SessionManager`] that fills it.

mod credentials;
mod session;
mod tokens;

pub use credentials::Credentials;
pub use session::SessionManager;
pub use tokens::{AccessToken, TokenSnapshot, TokenStore};
