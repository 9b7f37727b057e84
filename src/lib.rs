// Wiretrace - correlated console tracing for outbound HTTP calls
//
// Every request gets a "sent" line and its response a matching "received"
// line, tagged with the same operation id, timing, and payload size.

// Re-export the HTTP tracing core
pub use wiretrace_http::*;

// Re-export the logging layer
pub use wiretrace_log as log;
pub use wiretrace_log::{ConsoleSink, LogSink, MemorySink, Rgb, Style, StyledLine};

#[cfg(feature = "tracing")]
pub use wiretrace_log::tracing_compat;

// Prelude for common imports
pub mod prelude {
    pub use wiretrace_http::prelude::*;
    pub use wiretrace_log::{ConsoleSink, LogSink, MemorySink, StyledLine};
}
