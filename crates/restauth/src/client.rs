//! Authenticated request execution.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::auth::{SessionManager, TokenStore};
use crate::config::ClientConfig;
use crate::error::{ClientError, Error, InvalidInputError};
use crate::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};

/// Status that triggers one re-login and retry.
pub const UNAUTHORIZED: u16 = 401;

/// The three resource operations and their success statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Read,
    Delete,
}

impl Operation {
    fn method(self) -> Method {
        match self {
            Operation::Create => Method::Post,
            Operation::Read => Method::Get,
            Operation::Delete => Method::Delete,
        }
    }

    fn success_status(self) -> u16 {
        match self {
            Operation::Create => 201,
            Operation::Read => 200,
            Operation::Delete => 204,
        }
    }
}

/// A REST client that logs in on construction and renews its token on demand.
///
/// Every request carries the current token as a bearer credential. A `401`
/// triggers exactly one re-login followed by exactly one retry; the outcome
/// of that retry is final.
///
/// Dropping the client clears its token.
///
/// # Example
///
/// ```no_run
/// use restauth::{Client, ClientConfig, Credentials};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), restauth::Error> {
/// let config = ClientConfig::builder(
///     "https://api.example.com",
///     "/auth/login",
///     Credentials::new("alice", "s3cret"),
/// )
/// .build()?;
///
/// let client = Client::connect(config).await?;
/// let created = client.post("items", &json!({"name": "widget"})).await?;
/// let items = client.get("items").await?;
/// client.delete("items/1").await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    session: SessionManager,
}

impl Client {
    /// Build a `reqwest` transport and log in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the backend rejects the login. Connectivity
    /// failures are retried until the backend becomes reachable.
    pub async fn connect(config: ClientConfig) -> Result<Self, Error> {
        let transport = match config.user_agent() {
            Some(user_agent) => ReqwestTransport::with_user_agent(user_agent)?,
            None => ReqwestTransport::new()?,
        };
        Self::with_transport(config, Arc::new(transport)).await
    }

    /// Log in over the given transport.
    pub async fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        let config = Arc::new(config);
        let tokens = Arc::new(TokenStore::new());
        let session = SessionManager::new(config.clone(), transport.clone(), tokens);

        session.login().await?;

        Ok(Self {
            config,
            transport,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared handle to the token store.
    pub fn token_store(&self) -> Arc<TokenStore> {
        self.session.tokens().clone()
    }

    /// Force a fresh login, replacing the current token.
    pub async fn login(&self) -> Result<(), Error> {
        self.session.login().await.map(|_| ())
    }

    /// Create a resource. Succeeds on `201 Created` with the decoded body.
    #[instrument(skip(self, body))]
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, Error> {
        let response = self.execute(Operation::Create, path, Some(body)).await?;
        Ok(response.json()?)
    }

    /// Read a resource. Succeeds on `200 OK` with the decoded body.
    #[instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        let response = self.execute(Operation::Read, path, None).await?;
        Ok(response.json()?)
    }

    /// Delete a resource. Succeeds on `204 No Content`.
    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        self.execute(Operation::Delete, path, None).await?;
        Ok(())
    }

    /// Typed variant of [`Client::post`].
    pub async fn post_as<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| InvalidInputError::Body {
            message: e.to_string(),
        })?;
        let response = self.execute(Operation::Create, path, Some(&body)).await?;
        Ok(response.json_as()?)
    }

    /// Typed variant of [`Client::get`].
    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self.execute(Operation::Read, path, None).await?;
        Ok(response.json_as()?)
    }

    /// Release the client, clearing its token.
    pub fn close(self) {
        drop(self);
    }

    async fn execute(
        &self,
        operation: Operation,
        path: &str,
        body: Option<&Value>,
    ) -> Result<HttpResponse, Error> {
        let method = operation.method();
        let url = self.config.resource_url(path);
        let mut retried = false;

        loop {
            let snapshot = self.session.tokens().snapshot();

            let mut request =
                HttpRequest::new(method, url.as_str()).timeout(self.config.request_timeout());
            if let Some(ref token) = snapshot.token {
                request = request.bearer(token.as_str());
            }
            if let Some(body) = body {
                request = request.json(body.clone());
            }

            debug!(%method, %url, retried, "Sending request");
            let response = self.transport.send(request).await?;

            if response.status == operation.success_status() {
                return Ok(response);
            }

            if response.status == UNAUTHORIZED && !retried {
                info!(%method, path, "Access token rejected, logging in again");
                self.session.renew(snapshot.generation).await?;
                retried = true;
                continue;
            }

            match body {
                Some(payload) => warn!(
                    %method,
                    path,
                    %payload,
                    status = response.status,
                    reason = %response.reason,
                    "Request failed"
                ),
                None => warn!(
                    %method,
                    path,
                    status = response.status,
                    reason = %response.reason,
                    "Request failed"
                ),
            }

            return Err(ClientError::new(method, path, response).into());
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.session.tokens().clear();
        debug!("Client closed, token cleared");
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url())
            .field("username", &self.config.credentials().username())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
