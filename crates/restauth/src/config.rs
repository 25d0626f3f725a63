//! Client configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::auth::Credentials;
use crate::error::{Error, InvalidInputError};

/// Pause between login attempts after a connectivity failure.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Immutable client configuration.
///
/// Built through [`ClientConfig::builder`], which validates the base URL and
/// endpoint paths.
///
/// # Example
///
/// ```
/// use restauth::{ClientConfig, Credentials};
///
/// let config = ClientConfig::builder(
///     "https://api.example.com/",
///     "/auth/login",
///     Credentials::new("alice", "s3cret"),
/// )
/// .refresh_endpoint("/auth/refresh")
/// .build()
/// .unwrap();
///
/// assert_eq!(config.auth_url(), "https://api.example.com/auth/login");
/// assert_eq!(config.resource_url("items"), "https://api.example.com/items");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    auth_endpoint: String,
    refresh_endpoint: Option<String>,
    credentials: Credentials,
    request_timeout: Option<Duration>,
    reconnect_delay: Duration,
    user_agent: Option<String>,
}

impl ClientConfig {
    /// Start building a configuration.
    pub fn builder(
        base_url: impl Into<String>,
        auth_endpoint: impl Into<String>,
        credentials: Credentials,
    ) -> ClientConfigBuilder {
        ClientConfigBuilder {
            base_url: base_url.into(),
            auth_endpoint: auth_endpoint.into(),
            refresh_endpoint: None,
            credentials,
            request_timeout: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            user_agent: None,
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_endpoint(&self) -> &str {
        &self.auth_endpoint
    }

    pub fn refresh_endpoint(&self) -> Option<&str> {
        self.refresh_endpoint.as_deref()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Absolute URL of the credential endpoint.
    pub fn auth_url(&self) -> String {
        self.endpoint_url(&self.auth_endpoint)
    }

    /// Absolute URL of the refresh endpoint, when one is configured.
    pub fn refresh_url(&self) -> Option<String> {
        self.refresh_endpoint
            .as_deref()
            .map(|endpoint| self.endpoint_url(endpoint))
    }

    /// Absolute URL of a resource path.
    pub fn resource_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("auth_endpoint", &self.auth_endpoint)
            .field("refresh_endpoint", &self.refresh_endpoint)
            .field("credentials", &self.credentials)
            .field("request_timeout", &self.request_timeout)
            .field("reconnect_delay", &self.reconnect_delay)
            .finish()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    base_url: String,
    auth_endpoint: String,
    refresh_endpoint: Option<String>,
    credentials: Credentials,
    request_timeout: Option<Duration>,
    reconnect_delay: Duration,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Try this endpoint before the credential endpoint on every login.
    pub fn refresh_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.refresh_endpoint = Some(endpoint.into());
        self
    }

    /// Timeout handed to the transport for every request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Pause between login attempts after a connectivity failure.
    ///
    /// `Duration::ZERO` retries immediately.
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the base URL is not an absolute
    /// `http`/`https` URL or an endpoint path is empty.
    pub fn build(self) -> Result<ClientConfig, Error> {
        let base_url = validate_base_url(&self.base_url)?;
        validate_endpoint("auth", &self.auth_endpoint)?;
        if let Some(ref refresh) = self.refresh_endpoint {
            validate_endpoint("refresh", refresh)?;
        }

        Ok(ClientConfig {
            base_url,
            auth_endpoint: self.auth_endpoint,
            refresh_endpoint: self.refresh_endpoint,
            credentials: self.credentials,
            request_timeout: self.request_timeout,
            reconnect_delay: self.reconnect_delay,
            user_agent: self.user_agent,
        })
    }
}

fn validate_base_url(value: &str) -> Result<String, Error> {
    let invalid = |reason: &str| InvalidInputError::BaseUrl {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid("must not be empty").into());
    }

    let url = Url::parse(trimmed).map_err(|e| InvalidInputError::BaseUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("must be an absolute URL with a host").into());
    }

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https").into());
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

fn validate_endpoint(name: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(InvalidInputError::Endpoint {
            name,
            value: value.to_string(),
            reason: "must not be empty".to_string(),
        }
        .into());
    }
    Ok(())
}
