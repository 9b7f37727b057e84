//! Template lines with `%c` style placeholders.

use crate::Style;
use serde_json::Value;

/// Placeholder that switches the style of the text following it.
pub const STYLE_PLACEHOLDER: &str = "%c";

/// Escape `%` in text that is spliced into a template, so that it is shown
/// verbatim instead of being read as a placeholder.
///
/// ```
/// use wiretrace_log::{StyledLine, escape_text};
///
/// let line = StyledLine::new(format!("%c{}", escape_text("/caf%c3%a9")), vec![None], Default::default());
/// assert_eq!(line.placeholder_count(), 1);
/// assert_eq!(line.plain_text(), "/caf%c3%a9");
/// ```
pub fn escape_text(text: &str) -> String {
    text.replace('%', "%%")
}

enum Token<'a> {
    Text(&'a str),
    Placeholder,
}

/// Walk a template, yielding literal text and placeholders. `%%` yields a
/// single `%`; any other `%` is literal.
fn tokens(template: &str) -> impl Iterator<Item = Token<'_>> {
    let mut rest = template;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        if let Some(tail) = rest.strip_prefix(STYLE_PLACEHOLDER) {
            rest = tail;
            return Some(Token::Placeholder);
        }
        if let Some(tail) = rest.strip_prefix("%%") {
            rest = tail;
            return Some(Token::Text("%"));
        }
        let first = rest.chars().next().map_or(1, char::len_utf8);
        let end = rest[first..].find('%').map_or(rest.len(), |i| i + first);
        let (text, tail) = rest.split_at(end);
        rest = tail;
        Some(Token::Text(text))
    })
}

/// A single log line: a template with `%c` placeholders, one optional style
/// per placeholder, and a structured payload logged after the text.
///
/// A literal percent sign in the template is written `%%`.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    /// Template text containing `%c` placeholders.
    pub template: String,
    /// Style for each placeholder; `None` resets to the default style.
    pub styles: Vec<Option<Style>>,
    /// Structured value printed as-is after the text.
    pub payload: Value,
}

impl StyledLine {
    /// Create a line.
    pub fn new(template: impl Into<String>, styles: Vec<Option<Style>>, payload: Value) -> Self {
        Self {
            template: template.into(),
            styles,
            payload,
        }
    }

    /// Number of `%c` placeholders in the template.
    pub fn placeholder_count(&self) -> usize {
        tokens(&self.template)
            .filter(|t| matches!(t, Token::Placeholder))
            .count()
    }

    /// Split the template into text runs paired with the style in effect.
    ///
    /// Text before the first placeholder is unstyled. Empty runs are kept so
    /// that callers can rely on one run per placeholder plus the leading run.
    pub fn segments(&self) -> Vec<(String, Option<&Style>)> {
        let mut segments = vec![(String::new(), None)];
        let mut index = 0;

        for token in tokens(&self.template) {
            match token {
                Token::Text(text) => {
                    if let Some((run, _)) = segments.last_mut() {
                        run.push_str(text);
                    }
                }
                Token::Placeholder => {
                    let style = self.styles.get(index).and_then(Option::as_ref);
                    segments.push((String::new(), style));
                    index += 1;
                }
            }
        }

        segments
    }

    /// The template with every placeholder removed and escapes resolved.
    pub fn plain_text(&self) -> String {
        tokens(&self.template)
            .filter_map(|t| match t {
                Token::Text(text) => Some(text),
                Token::Placeholder => None,
            })
            .collect()
    }

    /// Whether the payload carries anything worth printing.
    pub fn has_payload(&self) -> bool {
        match &self.payload {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> StyledLine {
        StyledLine::new(
            "%c >> GET #1 %c %c/users%c",
            vec![
                Some(Style::new().padding("2px")),
                None,
                Some(Style::new().bold()),
                None,
            ],
            json!({"params": {"q": "x"}}),
        )
    }

    #[test]
    fn test_placeholder_count() {
        let line = sample();
        assert_eq!(line.placeholder_count(), 4);
        assert_eq!(line.placeholder_count(), line.styles.len());
    }

    #[test]
    fn test_segments() {
        let line = sample();
        let segments = line.segments();

        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], (String::new(), None));
        assert_eq!(segments[1].0, " >> GET #1 ");
        assert!(segments[1].1.is_some());
        assert_eq!(segments[2], (" ".to_string(), None));
        assert_eq!(segments[3].0, "/users");
        assert!(segments[3].1.unwrap().is_bold());
        assert_eq!(segments[4], (String::new(), None));
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(sample().plain_text(), " >> GET #1  /users");
    }

    #[test]
    fn test_escaped_percent_is_literal() {
        let line = StyledLine::new(
            format!("%c GET %c{}%c", escape_text("/caf%c3%a9?q=100%")),
            vec![Some(Style::new().bold()), Some(Style::new().bold()), None],
            Value::Null,
        );

        assert_eq!(line.placeholder_count(), 3);
        assert_eq!(line.plain_text(), " GET /caf%c3%a9?q=100%");

        let segments = line.segments();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[2].0, "/caf%c3%a9?q=100%");
        assert!(segments[2].1.unwrap().is_bold());
        assert_eq!(segments[3], (String::new(), None));
    }

    #[test]
    fn test_lone_percent_is_literal() {
        let line = StyledLine::new("50% done%, café", vec![], Value::Null);
        assert_eq!(line.placeholder_count(), 0);
        assert_eq!(line.plain_text(), "50% done%, café");
    }

    #[test]
    fn test_has_payload() {
        assert!(sample().has_payload());
        assert!(!StyledLine::new("x", vec![], json!({})).has_payload());
        assert!(!StyledLine::new("x", vec![], Value::Null).has_payload());
    }
}
