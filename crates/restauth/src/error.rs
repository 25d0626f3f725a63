//! Error types for the restauth client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, request, decoding and input validation errors.
//! Authentication and request failures carry the full HTTP response that
//! ended the operation.

use std::fmt;
use thiserror::Error;

use crate::transport::{HttpResponse, Method};

/// The unified error type for restauth operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, malformed request).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The authentication endpoint was reachable but did not accept the login.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A create/read/delete request did not reach its success status.
    #[error("request failed: {0}")]
    Client(#[from] ClientError),

    /// A success response carried a body that could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Configuration or argument validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the HTTP response carried by authentication and request errors.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Error::Auth(err) => Some(&err.response),
            Error::Client(err) => Some(&err.response),
            _ => None,
        }
    }

    /// Returns the HTTP status of the carried response, if any.
    pub fn status(&self) -> Option<u16> {
        self.response().map(|response| response.status)
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed before any HTTP exchange took place.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Any other HTTP-layer failure (invalid header, body read error, ...).
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl TransportError {
    /// Whether this is a network-level connectivity failure.
    ///
    /// Only connectivity failures are retried during login.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, TransportError::Connection { .. })
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Terminal authentication failure.
///
/// Raised when neither the refresh endpoint nor the credential endpoint
/// answered with the accepted-auth status.
#[derive(Debug)]
pub struct AuthError {
    /// The credential endpoint that was tried last.
    pub endpoint: String,
    /// The last response received.
    pub response: HttpResponse,
}

impl AuthError {
    pub(crate) fn new(endpoint: impl Into<String>, response: HttpResponse) -> Self {
        Self {
            endpoint: endpoint.into(),
            response,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login at {} rejected: {}", self.endpoint, self.response)
    }
}

impl std::error::Error for AuthError {}

/// Terminal failure of a single create/read/delete request.
#[derive(Debug)]
pub struct ClientError {
    /// HTTP method of the failed request.
    pub method: Method,
    /// Resource path as given by the caller.
    pub path: String,
    /// The final response (after at most one retry).
    pub response: HttpResponse,
}

impl ClientError {
    pub(crate) fn new(method: Method, path: impl Into<String>, response: HttpResponse) -> Self {
        Self {
            method,
            path: path.into(),
            response,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' returned {}", self.method, self.path, self.response)
    }
}

impl std::error::Error for ClientError {}

/// A response body that could not be decoded.
#[derive(Debug, Error)]
#[error("HTTP {status} body is not valid JSON: {message}")]
pub struct DecodeError {
    /// Status of the response whose body failed to decode.
    pub status: u16,
    /// Decoder message.
    pub message: String,
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// Invalid endpoint path.
    #[error("invalid {name} endpoint '{value}': {reason}")]
    Endpoint {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Request body could not be serialized.
    #[error("invalid request body: {message}")]
    Body { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
