//! Trace logger configuration.

use crate::{HttpClientError, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use wiretrace_log::Rgb;

/// Request-phase color for methods without a configured color.
pub const FALLBACK_REQUEST_COLOR: Rgb = Rgb::new(0xaa, 0xaa, 0xaa);

/// Response-phase color for methods without a configured color.
pub const FALLBACK_RESPONSE_COLOR: Rgb = Rgb::new(0x88, 0x88, 0x88);

/// Methods that have their own colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracedMethod {
    /// GET
    Get,
    /// POST
    Post,
}

impl TracedMethod {
    /// Map an HTTP method onto the colored set.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Self::Get),
            Method::POST => Some(Self::Post),
            _ => None,
        }
    }
}

/// Badge colors for both phases of one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodColors {
    /// Background of the request line badge.
    pub request: Rgb,
    /// Background of the response line badge.
    pub response: Rgb,
}

/// Method-keyed badge colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// Colors for GET.
    pub get: MethodColors,
    /// Colors for POST.
    pub post: MethodColors,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            get: MethodColors {
                request: Rgb::new(0x54, 0xb7, 0xd3),
                response: Rgb::new(0x40, 0x8b, 0xa1),
            },
            post: MethodColors {
                request: Rgb::new(0x96, 0xc7, 0x50),
                response: Rgb::new(0x6f, 0x94, 0x3b),
            },
        }
    }
}

impl ColorScheme {
    /// Colors for a member of the closed set.
    pub fn colors(&self, method: TracedMethod) -> &MethodColors {
        match method {
            TracedMethod::Get => &self.get,
            TracedMethod::Post => &self.post,
        }
    }

    /// Colors for an arbitrary method, if it has any.
    pub fn for_method(&self, method: &Method) -> Option<&MethodColors> {
        TracedMethod::from_method(method).map(|m| self.colors(m))
    }

    /// Request badge color, falling back to neutral gray.
    pub fn request_color(&self, method: &Method) -> Rgb {
        self.for_method(method)
            .map_or(FALLBACK_REQUEST_COLOR, |c| c.request)
    }

    /// Response badge color, falling back to neutral gray.
    pub fn response_color(&self, method: &Method) -> Rgb {
        self.for_method(method)
            .map_or(FALLBACK_RESPONSE_COLOR, |c| c.response)
    }
}

/// Request fields that can be projected into the request line payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKey {
    /// Target URL as given.
    #[serde(rename = "url")]
    Url,
    /// Lower-case method.
    #[serde(rename = "method")]
    Method,
    /// Base URL.
    #[serde(rename = "baseURL")]
    BaseUrl,
    /// Headers.
    #[serde(rename = "headers")]
    Headers,
    /// Query parameters.
    #[serde(rename = "params")]
    Params,
    /// Body.
    #[serde(rename = "data")]
    Data,
    /// Timeout in milliseconds.
    #[serde(rename = "timeout")]
    Timeout,
}

impl RequestKey {
    /// Name used in the projected payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Method => "method",
            Self::BaseUrl => "baseURL",
            Self::Headers => "headers",
            Self::Params => "params",
            Self::Data => "data",
            Self::Timeout => "timeout",
        }
    }
}

/// Response fields that can be projected into the response line payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseKey {
    /// Body.
    #[serde(rename = "data")]
    Data,
    /// Numeric status.
    #[serde(rename = "status")]
    Status,
    /// Reason phrase.
    #[serde(rename = "statusText")]
    StatusText,
    /// Headers.
    #[serde(rename = "headers")]
    Headers,
}

impl ResponseKey {
    /// Name used in the projected payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Status => "status",
            Self::StatusText => "statusText",
            Self::Headers => "headers",
        }
    }
}

/// Immutable trace logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Badge colors per method.
    pub colors: ColorScheme,
    /// Append a line break after each line.
    pub multiline: bool,
    /// Show the response size metric.
    pub response_size: bool,
    /// Show the elapsed time metric.
    pub response_time: bool,
    /// Request fields projected into the request payload, in order.
    pub request_keys: Vec<RequestKey>,
    /// Response fields projected into the response payload, in order.
    pub response_keys: Vec<ResponseKey>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            multiline: false,
            response_size: true,
            response_time: true,
            request_keys: vec![RequestKey::Params, RequestKey::Data],
            response_keys: vec![ResponseKey::Data],
        }
    }
}

impl LoggerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::default()
    }

    /// Merge partial options over the defaults, field by field.
    pub fn from_options(options: LoggerOptions) -> Self {
        let defaults = Self::default();
        let colors = options.colors.unwrap_or_default();

        Self {
            colors: ColorScheme {
                get: colors.get.unwrap_or(defaults.colors.get),
                post: colors.post.unwrap_or(defaults.colors.post),
            },
            multiline: options.multiline.unwrap_or(defaults.multiline),
            response_size: options.response_size.unwrap_or(defaults.response_size),
            response_time: options.response_time.unwrap_or(defaults.response_time),
            request_keys: options.request_keys.unwrap_or(defaults.request_keys),
            response_keys: options.response_keys.unwrap_or(defaults.response_keys),
        }
    }

    /// Read toggles from `WIRETRACE_MULTILINE`, `WIRETRACE_RESPONSE_SIZE`
    /// and `WIRETRACE_RESPONSE_TIME` over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| {
            lookup(name).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        };

        Self::from_options(LoggerOptions {
            multiline: flag("WIRETRACE_MULTILINE"),
            response_size: flag("WIRETRACE_RESPONSE_SIZE"),
            response_time: flag("WIRETRACE_RESPONSE_TIME"),
            ..Default::default()
        })
    }
}

impl From<LoggerOptions> for LoggerConfig {
    fn from(options: LoggerOptions) -> Self {
        Self::from_options(options)
    }
}

/// Partial per-method color overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOptions {
    /// GET colors.
    #[serde(default)]
    pub get: Option<MethodColors>,
    /// POST colors.
    #[serde(default)]
    pub post: Option<MethodColors>,
}

/// Caller-supplied options; every unset field keeps its default.
///
/// ```
/// use wiretrace_http::{LoggerConfig, LoggerOptions, ResponseKey};
///
/// let options = LoggerOptions::from_json(r#"{"multiline": true, "responseKeys": ["status", "data"]}"#)?;
/// let config = LoggerConfig::from_options(options);
/// assert!(config.multiline);
/// assert!(config.response_time);
/// assert_eq!(config.response_keys, vec![ResponseKey::Status, ResponseKey::Data]);
/// # Ok::<(), wiretrace_http::HttpClientError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerOptions {
    /// Color overrides.
    pub colors: Option<ColorOptions>,
    /// Append a line break after each line.
    pub multiline: Option<bool>,
    /// Show the response size metric.
    pub response_size: Option<bool>,
    /// Show the elapsed time metric.
    pub response_time: Option<bool>,
    /// Request fields to project.
    pub request_keys: Option<Vec<RequestKey>>,
    /// Response fields to project.
    pub response_keys: Option<Vec<ResponseKey>>,
}

impl LoggerOptions {
    /// Parse options from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| HttpClientError::Json(e.to_string()))
    }
}

/// Builder for [`LoggerConfig`].
#[derive(Debug, Default)]
pub struct LoggerConfigBuilder {
    config: LoggerConfig,
}

impl LoggerConfigBuilder {
    /// Replace the whole color scheme.
    pub fn colors(mut self, colors: ColorScheme) -> Self {
        self.config.colors = colors;
        self
    }

    /// Override colors for one method.
    pub fn method_colors(mut self, method: TracedMethod, colors: MethodColors) -> Self {
        match method {
            TracedMethod::Get => self.config.colors.get = colors,
            TracedMethod::Post => self.config.colors.post = colors,
        }
        self
    }

    /// Append a line break after each line.
    pub fn multiline(mut self, enable: bool) -> Self {
        self.config.multiline = enable;
        self
    }

    /// Show or hide the response size metric.
    pub fn response_size(mut self, enable: bool) -> Self {
        self.config.response_size = enable;
        self
    }

    /// Show or hide the elapsed time metric.
    pub fn response_time(mut self, enable: bool) -> Self {
        self.config.response_time = enable;
        self
    }

    /// Request fields to project.
    pub fn request_keys(mut self, keys: impl Into<Vec<RequestKey>>) -> Self {
        self.config.request_keys = keys.into();
        self
    }

    /// Response fields to project.
    pub fn response_keys(mut self, keys: impl Into<Vec<ResponseKey>>) -> Self {
        self.config.response_keys = keys.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> LoggerConfig {
        self.config
    }
}
