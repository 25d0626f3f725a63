//! Call-count tests against a scripted in-memory transport.
//!
//! Each test queues the exact sequence of transport outcomes and then checks
//! which requests the client issued, including connectivity failures that a
//! mock HTTP server cannot produce.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use restauth::{
    Client, ClientConfig, Credentials, Error, HttpRequest, HttpResponse, Method, Transport,
    TransportError,
};

const BASE: &str = "http://api.test";

type Outcome = Result<HttpResponse, TransportError>;

#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::default(),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected extra request"))
    }
}

fn accepted(token: &str) -> Outcome {
    Ok(HttpResponse::new(
        202,
        "Accepted",
        format!(r#"{{"access_token":"{token}"}}"#),
    ))
}

fn status(code: u16, reason: &str, body: &str) -> Outcome {
    Ok(HttpResponse::new(code, reason, body))
}

fn unauthorized() -> Outcome {
    status(401, "Unauthorized", "")
}

fn connection_refused() -> Outcome {
    Err(TransportError::Connection {
        message: "connection refused".into(),
    })
}

fn config() -> ClientConfig {
    ClientConfig::builder(BASE, "/login", Credentials::new("alice", "pw"))
        .reconnect_delay(Duration::ZERO)
        .build()
        .unwrap()
}

fn config_with_refresh() -> ClientConfig {
    ClientConfig::builder(BASE, "/login", Credentials::new("alice", "pw"))
        .refresh_endpoint("/refresh")
        .reconnect_delay(Duration::ZERO)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_connectivity_failures_are_retried_until_login_succeeds() {
    let transport = ScriptedTransport::new(vec![
        connection_refused(),
        connection_refused(),
        accepted("tok-3"),
    ]);

    let client = Client::with_transport(config(), transport.clone())
        .await
        .unwrap();

    assert_eq!(client.token_store().current().unwrap().as_str(), "tok-3");
    assert_eq!(transport.urls(), vec![format!("{BASE}/login"); 3]);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_delay_is_applied_between_attempts() {
    let transport = ScriptedTransport::new(vec![connection_refused(), accepted("tok")]);
    let config = ClientConfig::builder(BASE, "/login", Credentials::new("alice", "pw"))
        .reconnect_delay(Duration::from_secs(5))
        .build()
        .unwrap();

    let started = tokio::time::Instant::now();
    Client::with_transport(config, transport.clone()).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_connectivity_failure_restarts_at_refresh() {
    let transport = ScriptedTransport::new(vec![
        status(400, "Bad Request", ""),
        connection_refused(),
        accepted("refreshed"),
    ]);

    let client = Client::with_transport(config_with_refresh(), transport.clone())
        .await
        .unwrap();

    assert_eq!(client.token_store().current().unwrap().as_str(), "refreshed");
    assert_eq!(
        transport.urls(),
        vec![
            format!("{BASE}/refresh"),
            format!("{BASE}/login"),
            format!("{BASE}/refresh"),
        ]
    );
}

#[tokio::test]
async fn test_refresh_request_is_unauthenticated_and_bodyless() {
    let transport = ScriptedTransport::new(vec![accepted("refreshed")]);

    Client::with_transport(config_with_refresh(), transport.clone())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert!(requests[0].body.is_none());
    assert!(requests[0].header_value("authorization").is_none());
}

#[tokio::test]
async fn test_timeout_during_login_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Err(TransportError::Timeout {
        message: "deadline elapsed".into(),
    })]);

    let err = Client::with_transport(config(), transport.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_no_third_attempt_after_second_401() {
    for method in [Method::Post, Method::Get, Method::Delete] {
        let transport = ScriptedTransport::new(vec![
            accepted("tok-1"),
            unauthorized(),
            accepted("tok-2"),
            unauthorized(),
        ]);
        let client = Client::with_transport(config(), transport.clone())
            .await
            .unwrap();

        let err = match method {
            Method::Post => client
                .post("items", &serde_json::json!({"a": 1}))
                .await
                .unwrap_err(),
            Method::Get => client.get("items").await.unwrap_err(),
            Method::Delete => client.delete("items/1").await.unwrap_err(),
        };

        assert_eq!(err.status(), Some(401), "{method}");
        assert_eq!(transport.requests().len(), 4, "{method}");
        assert_eq!(transport.remaining(), 0);
    }
}

#[tokio::test]
async fn test_retry_uses_renewed_token() {
    let transport = ScriptedTransport::new(vec![
        accepted("tok-1"),
        unauthorized(),
        accepted("tok-2"),
        status(200, "OK", r#"{"ok":true}"#),
    ]);
    let client = Client::with_transport(config(), transport.clone())
        .await
        .unwrap();

    let body = client.get("status").await.unwrap();
    assert_eq!(body["ok"], true);

    let requests = transport.requests();
    assert_eq!(requests[1].header_value("authorization"), Some("Bearer tok-1"));
    assert_eq!(requests[2].url, format!("{BASE}/login"));
    assert_eq!(requests[3].header_value("authorization"), Some("Bearer tok-2"));
    assert_eq!(requests[3].url, format!("{BASE}/status"));
}

#[tokio::test]
async fn test_retry_resends_same_payload() {
    let payload = serde_json::json!({"name": "widget", "tags": ["a", "b"]});
    let transport = ScriptedTransport::new(vec![
        accepted("tok-1"),
        unauthorized(),
        accepted("tok-2"),
        status(201, "Created", r#"{"id":9}"#),
    ]);
    let client = Client::with_transport(config(), transport.clone())
        .await
        .unwrap();

    client.post("items", &payload).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[1].body, requests[3].body);
    assert_eq!(requests[1].url, requests[3].url);
}

#[tokio::test]
async fn test_non_auth_failure_skips_relogin() {
    let transport = ScriptedTransport::new(vec![
        accepted("tok-1"),
        status(503, "Service Unavailable", "down"),
    ]);
    let client = Client::with_transport(config(), transport.clone())
        .await
        .unwrap();

    let err = client.delete("items/1").await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(transport.requests().len(), 2);
    assert_eq!(client.token_store().current().unwrap().as_str(), "tok-1");
}

#[tokio::test]
async fn test_connectivity_failure_on_request_is_returned() {
    let transport = ScriptedTransport::new(vec![accepted("tok-1"), connection_refused()]);
    let client = Client::with_transport(config(), transport.clone())
        .await
        .unwrap();

    let err = client.get("items").await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Connection { .. })));
}

#[tokio::test]
async fn test_missing_token_field_sends_no_authorization() {
    let transport = ScriptedTransport::new(vec![
        status(202, "Accepted", r#"{"detail":"welcome"}"#),
        status(200, "OK", "[]"),
    ]);
    let client = Client::with_transport(config(), transport.clone())
        .await
        .unwrap();

    assert!(client.token_store().current().is_none());
    client.get("items").await.unwrap();
    assert!(transport.requests()[1].header_value("authorization").is_none());
}

#[tokio::test]
async fn test_non_json_success_body_is_decode_error() {
    let transport = ScriptedTransport::new(vec![accepted("tok"), status(200, "OK", "<html>")]);
    let client = Client::with_transport(config(), transport.clone())
        .await
        .unwrap();

    let err = client.get("page").await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_request_timeout_is_passed_through() {
    let transport = ScriptedTransport::new(vec![accepted("tok"), status(204, "No Content", "")]);
    let config = ClientConfig::builder(BASE, "/login", Credentials::new("alice", "pw"))
        .request_timeout(Duration::from_secs(7))
        .build()
        .unwrap();
    let client = Client::with_transport(config, transport.clone())
        .await
        .unwrap();

    client.delete("items/1").await.unwrap();

    for request in transport.requests() {
        assert_eq!(request.timeout, Some(Duration::from_secs(7)));
    }
}

#[tokio::test]
async fn test_batch_failure_does_not_stop_later_items() {
    let transport = ScriptedTransport::new(vec![
        accepted("tok"),
        status(204, "No Content", ""),
        connection_refused(),
        status(204, "No Content", ""),
    ]);
    let client = Client::with_transport(config(), transport.clone())
        .await
        .unwrap();

    let results = client.delete_all(&["a/1", "a/2", "a/3"]).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::Transport(_))));
    assert!(results[2].is_ok());
}
