//! Correlated request/response trace logging.

use crate::format::{request_line, response_line};
use crate::{
    Clock, CorrelationToken, HttpClientError, Interceptor, LoggerConfig, OperationCounter,
    RequestConfig, Result, SystemClock, TracedResponse, TracerId,
};
use async_trait::async_trait;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use wiretrace_log::{ConsoleSink, LogSink, StyledLine};

/// Interceptor that prints a "sent" line for every request and a matching
/// "received" or "failed" line for every response, tagged with the same
/// operation id.
///
/// The id, canonical URI and start time travel on the request configuration
/// itself, keyed by this logger's [`TracerId`], so responses are matched
/// correctly no matter how many calls are in flight, in which order they
/// complete, or how many loggers are chained on the same client.
///
/// ```
/// use std::sync::Arc;
/// use wiretrace_http::{CorrelatingLogger, LoggerConfig, RequestConfig};
/// use wiretrace_log::MemorySink;
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = CorrelatingLogger::new(LoggerConfig::default()).with_sink(sink.clone());
///
/// let request = logger.on_request(RequestConfig::get("/users").with_param("q", "x"))?;
/// assert_eq!(request.correlation().map(|t| t.operation_id), Some(1));
/// assert!(sink.lines()[0].plain_text().contains(">> GET #1"));
/// # Ok::<(), wiretrace_http::HttpClientError>(())
/// ```
pub struct CorrelatingLogger {
    id: TracerId,
    config: LoggerConfig,
    counter: Arc<OperationCounter>,
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
}

impl CorrelatingLogger {
    /// Create a logger writing to the console with its own id counter.
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            id: TracerId::unique(),
            config,
            counter: Arc::new(OperationCounter::new()),
            sink: Arc::new(ConsoleSink::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Write lines to `sink` instead of the console.
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Read timestamps from `clock`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Draw operation ids from a counter shared with other loggers.
    pub fn with_counter(mut self, counter: Arc<OperationCounter>) -> Self {
        self.counter = counter;
        self
    }

    /// Key under which this logger stamps its tokens.
    pub fn id(&self) -> TracerId {
        self.id
    }

    /// The configuration this logger was built with.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// The id counter in use.
    pub fn counter(&self) -> &Arc<OperationCounter> {
        &self.counter
    }

    /// Stamp the request with a correlation token and log the "sent" line.
    ///
    /// The request is returned untouched apart from the token. A URI that
    /// cannot be resolved is an error; no id is consumed in that case.
    pub fn on_request(&self, mut request: RequestConfig) -> Result<RequestConfig> {
        let uri = request.uri()?;
        let operation_id = self.counter.next();

        self.emit(|| request_line(&self.config, &request, operation_id, &uri));

        let started_at = self
            .config
            .response_time
            .then(|| self.clock.now_millis());

        request.set_correlation(
            self.id,
            CorrelationToken {
                operation_id,
                uri,
                started_at,
            },
        );

        Ok(request)
    }

    /// Log the "received" line for a response stamped by this logger.
    ///
    /// Responses carrying no token from this logger are returned without
    /// logging anything.
    pub fn on_response(&self, response: TracedResponse) -> TracedResponse {
        self.log_response(&response, false);
        response
    }

    /// Log the "failed" line when the error carries a response, then hand
    /// the error back unchanged.
    ///
    /// Errors without a response (connection failures, timeouts) produce no
    /// line at all.
    pub fn on_error<T>(&self, error: HttpClientError) -> Result<T> {
        if let Some(response) = error.response() {
            self.log_response(response, true);
        }
        Err(error)
    }

    fn log_response(&self, response: &TracedResponse, failed: bool) {
        let Some(token) = response.config.correlation_for(self.id) else {
            return;
        };

        let now = self.clock.now_millis();
        self.emit(|| response_line(&self.config, response, token, now, failed));
    }

    /// Build and write one line. A panic in either step is caught and
    /// reported on the `error!` channel. The process panic hook still runs
    /// first, so with the default hook the panic message also reaches stderr.
    fn emit(&self, build: impl FnOnce() -> StyledLine) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let line = build();
            self.sink.debug(&line);
        }));

        if let Err(payload) = outcome {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            wiretrace_log::error!(target: "wiretrace::http", "Dropped trace line: {}", reason);
        }
    }
}

impl Default for CorrelatingLogger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

impl fmt::Debug for CorrelatingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelatingLogger")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("last_operation_id", &self.counter.last())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Interceptor for CorrelatingLogger {
    async fn intercept_request(&self, request: RequestConfig) -> Result<RequestConfig> {
        self.on_request(request)
    }

    async fn intercept_response(&self, response: TracedResponse) -> Result<TracedResponse> {
        Ok(self.on_response(response))
    }

    async fn intercept_error(&self, error: HttpClientError) -> Result<TracedResponse> {
        self.on_error(error)
    }
}
