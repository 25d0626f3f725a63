//! Session management: login, refresh and re-login.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use crate::config::ClientConfig;
use crate::error::{AuthError, Error};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

use super::tokens::{AccessToken, TokenStore};

/// Status both login endpoints answer with on success.
pub const ACCEPTED: u16 = 202;

/// Field of the login response body holding the access token.
pub const TOKEN_FIELD: &str = "access_token";

/// Produces access tokens and installs them in the [`TokenStore`].
///
/// A login tries the refresh endpoint first (when configured), then the
/// credential endpoint. Connectivity failures restart the whole sequence
/// until the backend is reachable; any other outcome that is not
/// [`ACCEPTED`] is a terminal [`AuthError`].
pub struct SessionManager {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenStore>,
    login_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
        tokens: Arc<TokenStore>,
    ) -> Self {
        Self {
            config,
            transport,
            tokens,
            login_lock: Mutex::new(()),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Authenticate and replace the stored token.
    ///
    /// Returns the new token, which is `None` when the backend accepted the
    /// login without an `access_token` field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if neither endpoint accepted the login, or
    /// a transport/decode error that is not a connectivity failure.
    #[instrument(skip(self), fields(base_url = %self.config.base_url(), username = %self.config.credentials().username()))]
    pub async fn login(&self) -> Result<Option<AccessToken>, Error> {
        let _guard = self.login_lock.lock().await;
        self.login_locked().await
    }

    /// Re-login after the token of `stale_generation` was rejected.
    ///
    /// If another caller already replaced that token, the replacement is
    /// used as-is.
    #[instrument(skip(self), fields(username = %self.config.credentials().username()))]
    pub(crate) async fn renew(&self, stale_generation: u64) -> Result<(), Error> {
        let _guard = self.login_lock.lock().await;
        if self.tokens.generation() != stale_generation {
            debug!("Token already renewed by a concurrent request");
            return Ok(());
        }
        self.login_locked().await.map(|_| ())
    }

    async fn login_locked(&self) -> Result<Option<AccessToken>, Error> {
        let token = self.authenticate().await?;
        let generation = self.tokens.replace(token.clone());
        debug!(generation, has_token = token.is_some(), "Token installed");
        Ok(token)
    }

    async fn authenticate(&self) -> Result<Option<AccessToken>, Error> {
        let delay = self.config.reconnect_delay();
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            match self.attempt_login().await {
                Err(Error::Transport(err)) if err.is_connectivity() => {
                    error!(attempt, error = %err, "A connection error occurred during login");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                result => return result,
            }
        }
    }

    async fn attempt_login(&self) -> Result<Option<AccessToken>, Error> {
        if let Some(refresh_url) = self.config.refresh_url() {
            let response = self.send(HttpRequest::new(Method::Post, &refresh_url)).await?;
            if response.status == ACCEPTED {
                info!("Session refreshed");
                return extract_token(&response);
            }
            debug!(
                status = response.status,
                "Refresh not accepted, falling back to credential login"
            );
        }

        let auth_url = self.config.auth_url();
        let credentials = self.config.credentials();
        let request = HttpRequest::new(Method::Post, &auth_url).form(credentials.form_fields());
        let response = self.send(request).await?;

        if response.status == ACCEPTED {
            info!("Logged in");
            return extract_token(&response);
        }

        error!(
            severity = "critical",
            endpoint = %auth_url,
            username = %credentials.username(),
            status = response.status,
            reason = %response.reason,
            "Failed to authenticate"
        );
        Err(AuthError::new(auth_url, response).into())
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let request = request.timeout(self.config.request_timeout());
        Ok(self.transport.send(request).await?)
    }
}

fn extract_token(response: &HttpResponse) -> Result<Option<AccessToken>, Error> {
    let body = response.json()?;
    Ok(body
        .get(TOKEN_FIELD)
        .and_then(serde_json::Value::as_str)
        .map(AccessToken::new))
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.config.base_url())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
