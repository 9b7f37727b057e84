//! HTTP client error types.

use crate::TracedResponse;
use std::time::Duration;
use thiserror::Error;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The server answered with a non-success status.
    #[error("Request failed with status code {}", .0.status.as_u16())]
    Status(Box<TracedResponse>),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request building error.
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl HttpClientError {
    /// Classify a transport failure. Timeouts and connect failures get their
    /// own variants; everything else stays a raw [`reqwest::Error`].
    pub(crate) fn from_transport(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_connect() {
            Self::Connection(error.to_string())
        } else {
            Self::Http(error)
        }
    }

    /// The response the server sent, if this error carries one.
    pub fn response(&self) -> Option<&TracedResponse> {
        match self {
            Self::Status(response) => Some(response),
            _ => None,
        }
    }

    /// Consume the error and return the embedded response, if any.
    pub fn into_response(self) -> Option<TracedResponse> {
        match self {
            Self::Status(response) => Some(*response),
            _ => None,
        }
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_)) || matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_)) || matches!(self, Self::Http(e) if e.is_connect())
    }

    /// Get the HTTP status code if the server responded.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(response) => Some(response.status.as_u16()),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
