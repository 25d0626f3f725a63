//! Access token type and the shared token store.

use std::fmt;
use std::sync::{PoisonError, RwLock};

/// A bearer token for authenticated requests.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value.
    ///
    /// # Security
    ///
    /// Use only when constructing authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A consistent view of the store: the token and the generation it belongs to.
#[derive(Debug, Clone, Default)]
pub struct TokenSnapshot {
    pub token: Option<AccessToken>,
    pub generation: u64,
}

/// Holds the current access token.
///
/// Every replacement (login, re-login, clear) swaps the token wholesale and
/// bumps the generation counter. Requests record the generation they used so
/// that a rejected token can be told apart from one a concurrent caller has
/// already renewed.
#[derive(Debug, Default)]
pub struct TokenStore {
    state: RwLock<TokenSnapshot>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current token, if any.
    pub fn current(&self) -> Option<AccessToken> {
        self.snapshot().token
    }

    /// Returns the current token together with its generation.
    pub fn snapshot(&self) -> TokenSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn generation(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_none()
    }

    /// Install a new token, discarding the previous one. Returns the new generation.
    pub(crate) fn replace(&self, token: Option<AccessToken>) -> u64 {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = token;
        state.generation += 1;
        state.generation
    }

    /// Drop the held token.
    pub(crate) fn clear(&self) {
        self.replace(None);
    }
}
