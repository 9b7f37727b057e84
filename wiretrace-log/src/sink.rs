//! Output sinks for styled lines.

use crate::{Format, Level, LogConfig, StyledLine};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Destination for debug-level styled lines.
pub trait LogSink: Send + Sync {
    /// Emit one line on the debug channel.
    fn debug(&self, line: &StyledLine);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn debug(&self, line: &StyledLine) {
        (**self).debug(line)
    }
}

// ============================================================================
// Console
// ============================================================================

/// Sink that writes to stderr using the global [`LogConfig`].
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    target: String,
}

impl ConsoleSink {
    /// Create a console sink with the default `wiretrace` target.
    pub fn new() -> Self {
        Self {
            target: "wiretrace".to_string(),
        }
    }

    /// Use a custom target label.
    pub fn with_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The target label printed with each line.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Render a line the way it would be written, without writing it.
    pub fn render(&self, line: &StyledLine, config: &LogConfig) -> String {
        match config.format {
            Format::Pretty => self.render_pretty(line, config),
            Format::Compact => self.render_compact(line, config),
            Format::Json => self.render_json(line),
        }
    }

    fn render_pretty(&self, line: &StyledLine, config: &LogConfig) -> String {
        let mut out = String::new();

        if config.timestamps {
            let now = chrono::Local::now();
            out.push_str(&now.format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
        }

        out.push_str(&format!("{:5} ", Level::Debug.as_str()));

        if config.module_path && !self.target.is_empty() {
            out.push_str(&format!("[{}] ", self.target));
        }

        out.push_str(&styled_text(line, config.color));
        push_payload(&mut out, line);
        out
    }

    fn render_compact(&self, line: &StyledLine, config: &LogConfig) -> String {
        let mut out = String::new();

        if config.timestamps {
            let now = chrono::Local::now();
            out.push_str(&now.format("%H:%M:%S ").to_string());
        }

        out.push_str("D ");

        if config.module_path && !self.target.is_empty() {
            out.push_str(&format!("{}: ", self.target));
        }

        out.push_str(&styled_text(line, config.color));
        push_payload(&mut out, line);
        out
    }

    fn render_json(&self, line: &StyledLine) -> String {
        use serde::Serialize;

        #[derive(Serialize)]
        struct LogEntry<'a> {
            timestamp: String,
            level: &'a str,
            target: &'a str,
            message: String,
            payload: &'a serde_json::Value,
        }

        let entry = LogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: Level::Debug.as_str(),
            target: &self.target,
            message: line.plain_text().trim_end().to_string(),
            payload: &line.payload,
        };

        serde_json::to_string(&entry).unwrap_or_default()
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn debug(&self, line: &StyledLine) {
        if !(crate::is_debug_enabled() || crate::is_level_enabled(Level::Debug)) {
            return;
        }

        let rendered = self.render(line, crate::config());
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", rendered);
    }
}

fn push_payload(out: &mut String, line: &StyledLine) {
    if !line.has_payload() {
        return;
    }
    if !out.ends_with('\n') {
        out.push(' ');
    }
    if let Ok(json) = serde_json::to_string(&line.payload) {
        out.push_str(&json);
    }
}

fn styled_text(line: &StyledLine, color: bool) -> String {
    let mut out = String::new();
    for (text, style) in line.segments() {
        match style {
            Some(style) if color && !text.is_empty() => out.push_str(&paint(&text, style)),
            _ => out.push_str(&text),
        }
    }
    out
}

#[cfg(feature = "color")]
fn paint(text: &str, style: &crate::Style) -> String {
    use colored::Colorize;

    let text = if style.is_padded() {
        format!(" {} ", text)
    } else {
        text.to_string()
    };

    let mut painted = text.normal();
    if let Some(crate::Rgb(r, g, b)) = style.color_rgb() {
        painted = painted.truecolor(r, g, b);
    }
    if let Some(crate::Rgb(r, g, b)) = style.background_rgb() {
        painted = painted.on_truecolor(r, g, b);
    }
    if style.is_bold() {
        painted = painted.bold();
    }
    painted.to_string()
}

#[cfg(not(feature = "color"))]
fn paint(text: &str, _style: &crate::Style) -> String {
    text.to_string()
}

// ============================================================================
// Memory
// ============================================================================

/// Sink that records every line it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<StyledLine>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines.
    pub fn lines(&self) -> Vec<StyledLine> {
        self.lines.lock().clone()
    }

    /// Number of recorded lines.
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Drop every recorded line.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn debug(&self, line: &StyledLine) {
        self.lines.lock().push(line.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Style;
    use serde_json::json;

    fn plain_config(format: Format) -> LogConfig {
        LogConfig {
            format,
            color: false,
            timestamps: false,
            ..Default::default()
        }
    }

    fn line(payload: serde_json::Value) -> StyledLine {
        StyledLine::new(
            "%c >> GET #3 %c %chttp://localhost/a%c",
            vec![Some(Style::new().padding("2px")), None, Some(Style::new().bold()), None],
            payload,
        )
    }

    #[test]
    fn test_memory_sink_records() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.debug(&line(json!({})));
        sink.debug(&line(json!({"data": 1})));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.lines()[1].payload, json!({"data": 1}));

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_arc_sink_delegates() {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<dyn LogSink> = sink.clone();
        shared.debug(&line(json!({})));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_render_pretty_plain() {
        let sink = ConsoleSink::with_target("http");
        let rendered = sink.render(&line(json!({"params": {"q": "x"}})), &plain_config(Format::Pretty));
        assert_eq!(
            rendered,
            "DEBUG [http]  >> GET #3  http://localhost/a {\"params\":{\"q\":\"x\"}}"
        );
    }

    #[test]
    fn test_render_pretty_without_payload() {
        let sink = ConsoleSink::new();
        let rendered = sink.render(&line(json!({})), &plain_config(Format::Pretty));
        assert!(rendered.ends_with("http://localhost/a"));
    }

    #[test]
    fn test_render_compact() {
        let sink = ConsoleSink::with_target("http");
        let rendered = sink.render(&line(json!({})), &plain_config(Format::Compact));
        assert_eq!(rendered, "D http:  >> GET #3  http://localhost/a");
    }

    #[test]
    fn test_render_multiline_puts_payload_on_next_line() {
        let sink = ConsoleSink::new();
        let mut multiline = line(json!({"data": true}));
        multiline.template.push('\n');
        let rendered = sink.render(&multiline, &plain_config(Format::Pretty));
        assert!(rendered.ends_with("http://localhost/a\n{\"data\":true}"));
    }

    #[test]
    fn test_render_json() {
        let sink = ConsoleSink::with_target("http");
        let rendered = sink.render(&line(json!({"data": [1]})), &plain_config(Format::Json));
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["level"], "DEBUG");
        assert_eq!(value["target"], "http");
        assert_eq!(value["message"], " >> GET #3  http://localhost/a");
        assert_eq!(value["payload"], json!({"data": [1]}));
    }

    #[cfg(feature = "color")]
    #[test]
    fn test_render_colored_pads_styled_runs() {
        colored::control::set_override(true);
        let sink = ConsoleSink::new();
        let config = LogConfig {
            color: true,
            ..plain_config(Format::Compact)
        };
        let rendered = sink.render(&line(json!({})), &config);
        assert!(rendered.contains("  >> GET #3  "));
        assert!(rendered.contains("\u{1b}["));
    }
}
