//! HTTP response wrapper.

use crate::request::headers_to_json;
use crate::{HttpClientError, RequestConfig, ResponseKey, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A fully read response together with the configuration that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedResponse {
    /// Status code.
    pub status: StatusCode,
    /// Reason phrase for the status code.
    pub status_text: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded body: JSON when it parses, text otherwise, `Null` when empty.
    pub data: Value,
    /// The request configuration as it left the request interceptors.
    pub config: RequestConfig,
}

impl TracedResponse {
    /// Create a response.
    pub fn new(status: StatusCode, headers: HeaderMap, data: Value, config: RequestConfig) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            data,
            config,
        }
    }

    /// Read a `reqwest` response to the end.
    pub(crate) async fn from_reqwest(
        response: reqwest::Response,
        config: RequestConfig,
    ) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Self::new(status, headers, decode_body(&body), config))
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Headers as a JSON object.
    pub fn headers_json(&self) -> Value {
        headers_to_json(&self.headers)
    }

    /// Read one named field as a JSON value.
    pub fn field(&self, key: ResponseKey) -> Value {
        match key {
            ResponseKey::Data => self.data.clone(),
            ResponseKey::Status => Value::from(self.status.as_u16()),
            ResponseKey::StatusText => Value::String(self.status_text.clone()),
            ResponseKey::Headers => self.headers_json(),
        }
    }

    /// Deserialize the body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.data.clone()).map_err(|e| HttpClientError::Json(e.to_string()))
    }

    /// Convert a non-2xx response into an error carrying it.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpClientError::Status(Box::new(self)))
        }
    }
}

fn decode_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    fn response(status: StatusCode) -> TracedResponse {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        TracedResponse::new(status, headers, json!({"ok": true}), RequestConfig::get("/health"))
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"{\"a\":1}"), json!({"a": 1}));
        assert_eq!(decode_body(b"plain text"), json!("plain text"));
    }

    #[test]
    fn test_fields() {
        let resp = response(StatusCode::OK);
        assert_eq!(resp.field(ResponseKey::Data), json!({"ok": true}));
        assert_eq!(resp.field(ResponseKey::Status), json!(200));
        assert_eq!(resp.field(ResponseKey::StatusText), json!("OK"));
        assert_eq!(
            resp.field(ResponseKey::Headers),
            json!({"content-type": "application/json"})
        );
        assert_eq!(resp.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_error_for_status() {
        assert!(response(StatusCode::OK).error_for_status().is_ok());

        let err = response(StatusCode::BAD_GATEWAY).error_for_status().unwrap_err();
        assert_eq!(err.status_code(), Some(502));
    }

    #[test]
    fn test_json() {
        #[derive(serde::Deserialize)]
        struct Health {
            ok: bool,
        }

        assert!(response(StatusCode::OK).json::<Health>().unwrap().ok);
    }
}
