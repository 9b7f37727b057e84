//! Request configuration and builder.

use crate::{
    CorrelationToken, HttpClient, HttpClientError, RequestKey, Result, TracedResponse, TracerId,
};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use url::form_urlencoded;

/// Everything needed to issue one request.
///
/// The configuration travels through the whole request pipeline: request
/// interceptors receive it, the client dispatches it, and the resulting
/// [`TracedResponse`] hands it back. Interceptors can therefore stash
/// per-request state on it and find it again when the response arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    /// HTTP method.
    pub method: Method,
    /// Target URL, absolute or relative to `base_url`.
    pub url: String,
    /// Base URL prepended to relative targets.
    pub base_url: Option<String>,
    /// Query parameters.
    pub params: Map<String, Value>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body; `Null` means no body.
    pub data: Value,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
    correlations: Vec<(TracerId, CorrelationToken)>,
}

impl RequestConfig {
    /// Create a request configuration.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            base_url: None,
            params: Map::new(),
            headers: HeaderMap::new(),
            data: Value::Null,
            timeout: None,
            correlations: Vec::new(),
        }
    }

    /// Create a GET request configuration.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a POST request configuration.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the body.
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = data.into();
        self
    }

    /// Set the body from any serializable value.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.data = serde_json::to_value(body).map_err(|e| HttpClientError::Json(e.to_string()))?;
        Ok(self)
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The first correlation token stamped on this request, if any.
    pub fn correlation(&self) -> Option<&CorrelationToken> {
        self.correlations.first().map(|(_, token)| token)
    }

    /// The token stamped by the logger identified by `tracer`.
    pub fn correlation_for(&self, tracer: TracerId) -> Option<&CorrelationToken> {
        self.correlations
            .iter()
            .find(|(id, _)| *id == tracer)
            .map(|(_, token)| token)
    }

    /// Remove and return every correlation token, in stamping order.
    pub fn take_correlations(&mut self) -> Vec<(TracerId, CorrelationToken)> {
        std::mem::take(&mut self.correlations)
    }

    /// Stamp a token for `tracer`, replacing any earlier one it left.
    pub(crate) fn set_correlation(&mut self, tracer: TracerId, token: CorrelationToken) {
        match self.correlations.iter_mut().find(|(id, _)| *id == tracer) {
            Some((_, slot)) => *slot = token,
            None => self.correlations.push((tracer, token)),
        }
    }

    /// Read one named field as a JSON value.
    pub fn field(&self, key: RequestKey) -> Value {
        match key {
            RequestKey::Url => Value::String(self.url.clone()),
            RequestKey::Method => Value::String(self.method.as_str().to_lowercase()),
            RequestKey::BaseUrl => self
                .base_url
                .as_ref()
                .map_or(Value::Null, |base| Value::String(base.clone())),
            RequestKey::Headers => headers_to_json(&self.headers),
            RequestKey::Params => Value::Object(self.params.clone()),
            RequestKey::Data => self.data.clone(),
            RequestKey::Timeout => self
                .timeout
                .map_or(Value::Null, |t| Value::from(t.as_millis() as u64)),
        }
    }

    /// Resolve the full request target: base URL, path, and query string.
    ///
    /// Relative targets stay relative when no base URL is configured.
    /// Absolute results must parse as URLs.
    pub fn uri(&self) -> Result<String> {
        let url = self.url.split('#').next().unwrap_or_default();

        let mut full = match &self.base_url {
            Some(base) if !is_absolute_url(url) => combine_urls(base, url),
            _ => url.to_string(),
        };

        let query = serialize_params(&self.params);
        if !query.is_empty() {
            full.push(if full.contains('?') { '&' } else { '?' });
            full.push_str(&query);
        }

        if has_scheme(&full) {
            url::Url::parse(&full)
                .map_err(|e| HttpClientError::InvalidUrl(format!("{}: {}", full, e)))?;
        }

        Ok(full)
    }
}

/// Render headers as a JSON object of lower-case names to values.
pub(crate) fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        map.insert(name.as_str().to_string(), Value::String(joined));
    }
    Value::Object(map)
}

fn scheme_end(url: &str) -> Option<usize> {
    let end = url.find("://")?;
    let scheme = &url[..end];
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(end)
}

fn has_scheme(url: &str) -> bool {
    scheme_end(url).is_some()
}

fn is_absolute_url(url: &str) -> bool {
    url.starts_with("//") || has_scheme(url)
}

fn combine_urls(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn serialize_params(params: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                let key = format!("{}[]", key);
                for item in items.iter().filter(|item| !item.is_null()) {
                    serializer.append_pair(&key, &param_text(item));
                }
            }
            other => {
                serializer.append_pair(key, &param_text(other));
            }
        }
    }
    serializer.finish()
}

/// HTTP request builder bound to a client.
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    config: RequestConfig,
}

impl<'a> RequestBuilder<'a> {
    /// Create a new request builder.
    pub(crate) fn new(client: &'a HttpClient, method: Method, url: String) -> Self {
        Self {
            client,
            config: RequestConfig::new(method, url),
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config = self.config.with_header(&name.into(), &value.into());
        self
    }

    /// Add multiple headers to the request.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers.extend(headers);
        self
    }

    /// Add a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config = self.config.with_param(key, value);
        self
    }

    /// Add multiple query parameters.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (k, v) in params {
            self.config = self.config.with_param(k, v);
        }
        self
    }

    /// Set the request body as text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.config.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.config.data = Value::String(text.into());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize>(mut self, json: &T) -> Self {
        match serde_json::to_value(json) {
            Ok(value) => {
                self.config.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.config.data = value;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize JSON body");
            }
        }
        self
    }

    /// Set a custom timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Set basic authentication.
    pub fn basic_auth(
        self,
        username: impl Into<String>,
        password: Option<impl Into<String>>,
    ) -> Self {
        use base64::Engine;
        let credentials = match password {
            Some(p) => format!("{}:{}", username.into(), p.into()),
            None => format!("{}:", username.into()),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.header("Authorization", format!("Basic {}", encoded))
    }

    /// Finish building without sending.
    pub fn build(self) -> RequestConfig {
        self.config
    }

    /// Send the request through the client's interceptors.
    pub async fn send(self) -> Result<TracedResponse> {
        self.client.execute(self.config).await
    }
}
