//! HTTP client implementation.

use http::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::{
    CorrelatingLogger, HttpClientConfig, HttpClientError, Interceptor, RedirectPolicy,
    RequestBuilder, RequestConfig, Result, TracedResponse,
};

/// HTTP client that runs every request through its interceptors.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<HttpClientConfig>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl HttpClient {
    /// Create a client. A configured `trace` becomes the first interceptor.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let redirect = match config.redirects {
            RedirectPolicy::None => reqwest::redirect::Policy::none(),
            RedirectPolicy::Limited(max) => reqwest::redirect::Policy::limited(max),
        };

        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .redirect(redirect)
            .build()?;

        let mut interceptors: Vec<Arc<dyn Interceptor>> = Vec::new();
        if let Some(trace) = &config.trace {
            interceptors.push(Arc::new(CorrelatingLogger::new(trace.clone())));
        }

        Ok(Self {
            inner,
            config: Arc::new(config),
            interceptors,
        })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(HttpClientConfig::default())
    }

    /// Register an interceptor. Interceptors run in registration order.
    pub fn with_interceptor<I: Interceptor + 'static>(self, interceptor: I) -> Self {
        self.with_shared_interceptor(Arc::new(interceptor))
    }

    /// Register an interceptor that is also held elsewhere.
    pub fn with_shared_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Number of registered interceptors.
    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::GET, url.into())
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::POST, url.into())
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PUT, url.into())
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PATCH, url.into())
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::DELETE, url.into())
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, url.into())
    }

    /// Run a request through the interceptors and the network.
    ///
    /// Request hooks run first and a failing hook aborts the call. The
    /// outcome of the network call is then threaded through every
    /// interceptor's response or error hook in turn.
    pub async fn execute(&self, mut request: RequestConfig) -> Result<TracedResponse> {
        if request.base_url.is_none() {
            request.base_url = self.config.base_url.clone();
        }

        for interceptor in &self.interceptors {
            request = interceptor.intercept_request(request).await?;
        }

        let mut outcome = self.dispatch(request).await;

        for interceptor in &self.interceptors {
            outcome = match outcome {
                Ok(response) => interceptor.intercept_response(response).await,
                Err(error) => interceptor.intercept_error(error).await,
            };
        }

        outcome
    }

    /// Send the request once and read the whole response.
    async fn dispatch(&self, request: RequestConfig) -> Result<TracedResponse> {
        let url = url::Url::parse(&request.uri()?)?;
        let mut builder = self.inner.request(request.method.clone(), url);

        builder = builder
            .headers(self.config.default_headers.clone())
            .headers(request.headers.clone());

        builder = match &request.data {
            Value::Null => builder,
            Value::String(text) => builder.body(text.clone()),
            body => builder.json(body),
        };

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        let timeout = request.timeout.unwrap_or(self.config.timeout);

        let outgoing = builder
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;

        debug!(method = %request.method, url = %request.url, "Dispatching HTTP request");

        let response = self
            .inner
            .execute(outgoing)
            .await
            .map_err(|e| HttpClientError::from_transport(e, timeout))?;
        debug!(status = %response.status(), "Received HTTP response");

        TracedResponse::from_reqwest(response, request)
            .await?
            .error_for_status()
    }
}
