//! Traced client configuration.

use crate::{LoggerConfig, LoggerOptions};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// How redirects are handled by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Return 3xx responses as-is.
    None,
    /// Follow up to this many redirects.
    Limited(usize),
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self::Limited(10)
    }
}

/// Settings for an [`HttpClient`](crate::HttpClient).
///
/// When `trace` is set the client registers a
/// [`CorrelatingLogger`](crate::CorrelatingLogger) built from it ahead of any
/// other interceptor, so every call gets its sent and received lines
/// without further wiring.
///
/// ```
/// use wiretrace_http::{HttpClientConfig, LoggerConfig};
///
/// let config = HttpClientConfig::builder()
///     .base_url("https://api.example.com")
///     .trace(LoggerConfig::builder().multiline(true).build())
///     .build();
/// assert!(config.trace.as_ref().is_some_and(|t| t.multiline));
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for requests that do not set their own.
    pub base_url: Option<String>,
    /// Default per-request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Headers sent with every request; request headers win on conflict.
    pub default_headers: HeaderMap,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Transparent gzip decoding.
    pub gzip: bool,
    /// Redirect handling.
    pub redirects: RedirectPolicy,
    /// Trace logger settings; `None` leaves the client untraced.
    pub trace: Option<LoggerConfig>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_headers: HeaderMap::new(),
            user_agent: format!("wiretrace-http/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
            redirects: RedirectPolicy::default(),
            trace: None,
        }
    }
}

impl HttpClientConfig {
    /// Start a configuration from the defaults.
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Read `WIRETRACE_BASE_URL` and `WIRETRACE_TIMEOUT_MS` over the
    /// defaults. Tracing is on unless `WIRETRACE_TRACE` is `0` or `false`,
    /// with logger toggles read by [`LoggerConfig::from_env`].
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::builder();

        if let Some(url) = lookup("WIRETRACE_BASE_URL").filter(|u| !u.is_empty()) {
            builder = builder.base_url(url);
        }
        if let Some(ms) = lookup("WIRETRACE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        let traced = lookup("WIRETRACE_TRACE")
            .is_none_or(|v| !(v == "0" || v.eq_ignore_ascii_case("false")));
        if traced {
            builder = builder.trace(LoggerConfig::from_lookup(&lookup));
        }

        builder.build()
    }
}

/// Builder for [`HttpClientConfig`].
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Base URL joined to relative request targets.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Default per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Send a header with every request. Invalid names or values are ignored.
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.config.default_headers.append(name, value);
        }
        self
    }

    /// `User-Agent` header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Transparent gzip decoding.
    pub fn gzip(mut self, enable: bool) -> Self {
        self.config.gzip = enable;
        self
    }

    /// Redirect handling.
    pub fn redirects(mut self, policy: RedirectPolicy) -> Self {
        self.config.redirects = policy;
        self
    }

    /// Trace every call with a logger built from `config`.
    pub fn trace(mut self, config: LoggerConfig) -> Self {
        self.config.trace = Some(config);
        self
    }

    /// Trace every call, merging `options` over the logger defaults.
    pub fn trace_options(self, options: LoggerOptions) -> Self {
        self.trace(LoggerConfig::from_options(options))
    }

    /// Finish the configuration.
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}
