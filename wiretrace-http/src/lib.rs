//! # Wiretrace HTTP
//!
//! Correlated console tracing for outbound HTTP calls.
//!
//! A [`CorrelatingLogger`] is an [`Interceptor`]: it prints one line when a
//! request is sent and a matching line when its response (or error
//! response) arrives. Both lines carry the same operation id, and the
//! response line adds the elapsed time and an approximate payload size.
//!
//! ## Features
//!
//! - **Correlation**: Monotonic operation ids stamped onto each request
//! - **Timing and size**: Elapsed milliseconds and kilobytes per response
//! - **Field projection**: Pick which request/response fields are logged
//! - **Method colors**: Per-method badge colors with neutral fallbacks
//! - **Interceptors**: Request, response and error hooks on [`HttpClient`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wiretrace_http::{CorrelatingLogger, HttpClient, HttpClientConfig, LoggerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(HttpClientConfig::default())?
//!         .with_interceptor(CorrelatingLogger::new(LoggerConfig::default()));
//!
//!     // DEBUG  >> GET #1  https://api.example.com/users?page=2 {"params":{"page":2}}
//!     // DEBUG  << GET #1  https://api.example.com/users?page=2 1.3 kB 84 ms {"data":[...]}
//!     let response = client
//!         .get("https://api.example.com/users")
//!         .param("page", 2)
//!         .send()
//!         .await?;
//!
//!     println!("Status: {}", response.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Options
//!
//! ```rust
//! use wiretrace_http::{CorrelatingLogger, LoggerConfig, RequestKey};
//!
//! let logger = CorrelatingLogger::new(
//!     LoggerConfig::builder()
//!         .multiline(true)
//!         .response_size(false)
//!         .request_keys([RequestKey::Headers, RequestKey::Data])
//!         .build(),
//! );
//! assert!(logger.config().multiline);
//! ```

mod client;
mod config;
mod correlation;
mod error;
mod format;
mod interceptor;
mod logger;
mod options;
mod request;
mod response;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder, RedirectPolicy};
pub use correlation::{
    Clock, CorrelationToken, ManualClock, OperationCounter, SystemClock, TracerId,
};
pub use error::{HttpClientError, Result};
pub use format::{
    FAILURE_MARKER, is_empty_value, measure_response, project_request, project_response,
    request_line, response_line, response_size_kb, serialized_len,
};
pub use interceptor::Interceptor;
pub use logger::CorrelatingLogger;
pub use options::{
    ColorOptions, ColorScheme, FALLBACK_REQUEST_COLOR, FALLBACK_RESPONSE_COLOR, LoggerConfig,
    LoggerConfigBuilder, LoggerOptions, MethodColors, RequestKey, ResponseKey, TracedMethod,
};
pub use request::{RequestBuilder, RequestConfig};
pub use response::TracedResponse;

// Re-export common types
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use serde_json::Value;
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use wiretrace_http::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder};
    pub use crate::correlation::{Clock, CorrelationToken, OperationCounter, TracerId};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::interceptor::Interceptor;
    pub use crate::logger::CorrelatingLogger;
    pub use crate::options::{LoggerConfig, LoggerOptions, RequestKey, ResponseKey};
    pub use crate::request::{RequestBuilder, RequestConfig};
    pub use crate::response::TracedResponse;
    pub use http::{Method, StatusCode};
}
