//! `reqwest`-backed transport.

use async_trait::async_trait;
use tracing::{instrument, trace};

use crate::error::{Error, TransportError};

use super::{HttpRequest, HttpResponse, Method, RequestBody, Transport};

/// Transport over a shared, connection-reusing `reqwest::Client`.
///
/// The cookie store is enabled so that a session cookie set by the
/// credential endpoint is replayed to the refresh endpoint.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default user agent.
    pub fn new() -> Result<Self, Error> {
        Self::with_user_agent(concat!("restauth/", env!("CARGO_PKG_VERSION")))
    }

    /// Create a transport sending the given user agent.
    pub fn with_user_agent(user_agent: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        trace!(status = %status, "HTTP response");

        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
        assert!(ReqwestTransport::with_user_agent("custom/1.0").is_ok());
    }

    #[test]
    fn method_mapping() {
        assert_eq!(to_reqwest_method(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(Method::Post), reqwest::Method::POST);
        assert_eq!(to_reqwest_method(Method::Delete), reqwest::Method::DELETE);
    }
}
