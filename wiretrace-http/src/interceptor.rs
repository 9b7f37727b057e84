//! Request, response and error interceptors.

use crate::{HttpClientError, RequestConfig, Result, TracedResponse};
use async_trait::async_trait;

/// Hooks the client calls at each point of a request's lifecycle.
///
/// The client awaits every hook before moving on and threads each hook's
/// output into the next one, so an interceptor sees exactly what the
/// previous one returned.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Inspect or modify the request before it is sent.
    async fn intercept_request(&self, request: RequestConfig) -> Result<RequestConfig> {
        Ok(request)
    }

    /// Inspect or modify a successful response.
    async fn intercept_response(&self, response: TracedResponse) -> Result<TracedResponse> {
        Ok(response)
    }

    /// Inspect a failure. Returning `Ok` recovers; the default re-raises.
    async fn intercept_error(&self, error: HttpClientError) -> Result<TracedResponse> {
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, StatusCode};

    struct Passthrough;

    #[async_trait]
    impl Interceptor for Passthrough {}

    #[tokio::test]
    async fn test_default_hooks_pass_through() {
        let request = RequestConfig::get("/a").with_param("q", 1);
        assert_eq!(
            Passthrough.intercept_request(request.clone()).await.unwrap(),
            request
        );

        let response = TracedResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            serde_json::Value::Null,
            request,
        );
        assert_eq!(
            Passthrough.intercept_response(response.clone()).await.unwrap(),
            response
        );

        let err = Passthrough
            .intercept_error(HttpClientError::Connection("reset".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpClientError::Connection(ref m) if m == "reset"));
    }
}
