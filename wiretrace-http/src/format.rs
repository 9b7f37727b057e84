//! Trace line formatting and metric derivation.

use crate::{
    CorrelationToken, LoggerConfig, RequestConfig, RequestKey, ResponseKey, TracedResponse,
};
use serde_json::{Map, Value};
use wiretrace_log::{Rgb, Style, StyledLine, escape_text};

const BADGE_TEXT: Rgb = Rgb::new(0xff, 0xff, 0xff);
const SUCCESS_TEXT: Rgb = Rgb::new(0x00, 0x80, 0x00);
const FAILURE_BACKGROUND: Rgb = Rgb::new(0xff, 0xd6, 0xd6);
const METRIC_BACKGROUND: Rgb = Rgb::new(0xe4, 0xe4, 0xe4);

/// Marker printed before the URI of a failed call.
pub const FAILURE_MARKER: &str = "⚠️ ";

/// Whether a projected value should be left out of the payload.
///
/// `null`, `false`, zero, `""`, `[]` and `{}` are empty; everything else,
/// including `[0]` or `{"a": null}`, is kept.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn project<K: Copy>(
    keys: &[K],
    name: impl Fn(K) -> &'static str,
    lookup: impl Fn(K) -> Value,
) -> Value {
    let mut projected = Map::new();
    for &key in keys {
        let value = lookup(key);
        if !is_empty_value(&value) {
            projected.insert(name(key).to_string(), value);
        }
    }
    Value::Object(projected)
}

/// Project the configured request fields, skipping empty ones.
pub fn project_request(request: &RequestConfig, keys: &[RequestKey]) -> Value {
    project(keys, |k| k.as_str(), |k| request.field(k))
}

/// Project the configured response fields, skipping empty ones.
pub fn project_response(response: &TracedResponse, keys: &[ResponseKey]) -> Value {
    project(keys, |k| k.as_str(), |k| response.field(k))
}

/// Kilobytes rounded to one decimal place.
pub fn response_size_kb(body_len: usize, headers_len: usize) -> f64 {
    (((body_len + headers_len) as f64 / 1024.0) * 10.0).round() / 10.0
}

/// Length of the JSON text of `value` in UTF-16 code units; 0 if it
/// cannot be serialized.
pub fn serialized_len(value: &Value) -> usize {
    serde_json::to_string(value).map_or(0, |text| text.encode_utf16().count())
}

/// Approximate size of a response: serialized body plus serialized headers.
///
/// An absent body (`Null`) contributes nothing.
pub fn measure_response(response: &TracedResponse) -> f64 {
    let body_len = match &response.data {
        Value::Null => 0,
        data => serialized_len(data),
    };
    response_size_kb(body_len, serialized_len(&response.headers_json()))
}

fn badge(color: Rgb) -> Style {
    Style::new()
        .background(color)
        .padding("2px")
        .color(BADGE_TEXT)
        .border_radius("3px")
}

fn metric_pill() -> Style {
    Style::new()
        .background(METRIC_BACKGROUND)
        .padding("2px 4px")
        .border_radius("3px")
        .font_size("11px")
}

fn outcome_style(failed: bool) -> Style {
    let style = Style::new().bold();
    if failed {
        style.background(FAILURE_BACKGROUND)
    } else {
        style.color(SUCCESS_TEXT)
    }
}

fn line_end(config: &LoggerConfig) -> &'static str {
    if config.multiline { "\n" } else { "" }
}

/// Build the "sent" line for a request.
pub fn request_line(
    config: &LoggerConfig,
    request: &RequestConfig,
    operation_id: u64,
    uri: &str,
) -> StyledLine {
    let template = format!(
        "%c >> {} #{} %c %c{}%c{}",
        request.method.as_str().to_uppercase(),
        operation_id,
        escape_text(uri),
        line_end(config),
    );

    let styles = vec![
        Some(badge(config.colors.request_color(&request.method))),
        None,
        Some(Style::new().color_inherit().bold()),
        None,
    ];

    StyledLine::new(template, styles, project_request(request, &config.request_keys))
}

/// Build the "received" or "failed" line for a response.
pub fn response_line(
    config: &LoggerConfig,
    response: &TracedResponse,
    token: &CorrelationToken,
    now_millis: i64,
    failed: bool,
) -> StyledLine {
    let method = &response.config.method;
    let mut template = format!(
        "%c << {} #{} %c {}%c{}%c",
        method.as_str().to_uppercase(),
        token.operation_id,
        if failed { FAILURE_MARKER } else { "" },
        escape_text(&token.uri),
    );

    if config.response_size {
        template.push_str(&format!(" %c{:.1} kB", measure_response(response)));
    } else {
        template.push_str("%c");
    }
    template.push_str("%c");

    let elapsed = if config.response_time {
        token.elapsed_millis(now_millis)
    } else {
        None
    };
    match elapsed {
        Some(ms) => template.push_str(&format!(" %c{} ms", ms)),
        None => template.push_str("%c"),
    }
    template.push_str("%c");
    template.push_str(line_end(config));

    let styles = vec![
        Some(badge(config.colors.response_color(method))),
        None,
        Some(outcome_style(failed)),
        None,
        config.response_size.then(metric_pill),
        None,
        elapsed.map(|_| metric_pill()),
        None,
    ];

    StyledLine::new(
        template,
        styles,
        project_response(response, &config.response_keys),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, StatusCode};
    use serde_json::json;

    fn token(started_at: Option<i64>) -> CorrelationToken {
        CorrelationToken {
            operation_id: 7,
            uri: "https://api.example.com/users".into(),
            started_at,
        }
    }

    fn response(method: Method, data: Value) -> TracedResponse {
        TracedResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            data,
            RequestConfig::new(method, "/users"),
        )
    }

    #[test]
    fn test_emptiness_rule() {
        for empty in [json!(0), json!(""), Value::Null, json!(false), json!({}), json!([]), json!(0.0)] {
            assert!(is_empty_value(&empty), "{} should be empty", empty);
        }
        for kept in [json!({"a": 1}), json!([1]), json!(true), json!(-1), json!("x"), json!([0])] {
            assert!(!is_empty_value(&kept), "{} should be kept", kept);
        }
    }

    #[test]
    fn test_projection_skips_empty_and_keeps_order() {
        let request = RequestConfig::get("/users")
            .with_param("q", "x")
            .with_data(json!(""));
        let projected = project_request(
            &request,
            &[RequestKey::Data, RequestKey::Params, RequestKey::Method],
        );
        assert_eq!(projected, json!({"params": {"q": "x"}, "method": "get"}));
        assert_eq!(project_request(&request, &[]), json!({}));
    }

    #[test]
    fn test_size_metric() {
        assert_eq!(response_size_kb(2048, 0), 2.0);
        assert_eq!(format!("{:.1} kB", response_size_kb(2048, 0)), "2.0 kB");
        assert_eq!(response_size_kb(0, 0), 0.0);
        assert_eq!(response_size_kb(1000, 100), 1.1);
        assert_eq!(response_size_kb(51, 0), 0.0);
        assert_eq!(response_size_kb(52, 0), 0.1);
    }

    #[test]
    fn test_serialized_len() {
        assert_eq!(serialized_len(&json!({"ok": true})), 11);
        assert_eq!(serialized_len(&json!("é")), 3);
    }

    #[test]
    fn test_measure_response_counts_body_and_headers() {
        let body = "x".repeat(2046);
        let resp = response(Method::GET, Value::String(body));
        // 2048 chars of body text plus "{}" for the headers
        assert_eq!(serialized_len(&resp.data), 2048);
        assert_eq!(measure_response(&resp), response_size_kb(2048, 2));
    }

    #[test]
    fn test_measure_response_absent_body_adds_nothing() {
        let resp = response(Method::GET, Value::Null);
        // only the "{}" of the empty header map
        assert_eq!(measure_response(&resp), response_size_kb(0, 2));
        assert_eq!(measure_response(&resp), 0.0);

        let mut headers = HeaderMap::new();
        headers.insert("x-pad", "p".repeat(1017).parse().unwrap());
        let padded = TracedResponse::new(
            StatusCode::NO_CONTENT,
            headers,
            Value::Null,
            RequestConfig::get("/users"),
        );
        // {"x-pad":"ppp..."} is 1029 chars
        assert_eq!(serialized_len(&padded.headers_json()), 1029);
        assert_eq!(measure_response(&padded), 1.0);
    }

    #[test]
    fn test_request_line_layout() {
        let config = LoggerConfig::default();
        let request = RequestConfig::post("/orders").with_data(json!({"n": 1}));
        let line = request_line(&config, &request, 3, "https://shop.test/orders");

        assert_eq!(line.template, "%c >> POST #3 %c %chttps://shop.test/orders%c");
        assert_eq!(line.placeholder_count(), line.styles.len());
        assert_eq!(
            line.styles[0].as_ref().unwrap().to_string(),
            "background: #96c750; padding: 2px; color: #ffffff; border-radius: 3px;"
        );
        assert!(line.styles[1].is_none());
        assert_eq!(
            line.styles[2].as_ref().unwrap().to_string(),
            "color: inherit; font-weight: bold;"
        );
        assert_eq!(line.payload, json!({"data": {"n": 1}}));
    }

    #[test]
    fn test_request_line_unknown_method_fallback_and_multiline() {
        let config = LoggerConfig::builder().multiline(true).build();
        let request = RequestConfig::new(Method::DELETE, "/orders/1");
        let line = request_line(&config, &request, 1, "/orders/1");

        assert!(line.template.ends_with("%c\n"));
        assert_eq!(
            line.styles[0].as_ref().unwrap().background_rgb(),
            Some(crate::FALLBACK_REQUEST_COLOR)
        );
    }

    #[test]
    fn test_response_line_success() {
        let config = LoggerConfig::default();
        let resp = response(Method::GET, json!({"ok": true}));
        let line = response_line(&config, &resp, &token(Some(1_000)), 1_042, false);

        assert_eq!(
            line.template,
            "%c << GET #7 %c %chttps://api.example.com/users%c %c0.0 kB%c %c42 ms%c"
        );
        assert_eq!(line.placeholder_count(), 8);
        assert_eq!(line.styles.len(), 8);
        assert_eq!(
            line.styles[2].as_ref().unwrap().to_string(),
            "font-weight: bold; color: #008000;"
        );
        assert!(line.styles[4].is_some());
        assert!(line.styles[6].is_some());
        assert_eq!(line.payload, json!({"data": {"ok": true}}));
    }

    #[test]
    fn test_response_line_failure_styling() {
        let config = LoggerConfig::default();
        let resp = response(Method::PUT, Value::Null);
        let line = response_line(&config, &resp, &token(Some(0)), 5, true);

        assert!(line.template.contains(&format!("%c {}%c", FAILURE_MARKER)));
        assert_eq!(
            line.styles[2].as_ref().unwrap().to_string(),
            "font-weight: bold; background: #ffd6d6;"
        );
        assert_eq!(
            line.styles[0].as_ref().unwrap().background_rgb(),
            Some(crate::FALLBACK_RESPONSE_COLOR)
        );
        assert_eq!(line.payload, json!({}));
    }

    #[test]
    fn test_response_line_metrics_disabled() {
        let config = LoggerConfig::builder()
            .response_size(false)
            .response_time(false)
            .build();
        let resp = response(Method::GET, json!([1]));
        let line = response_line(&config, &resp, &token(None), 99, false);

        assert_eq!(
            line.template,
            "%c << GET #7 %c %chttps://api.example.com/users%c%c%c%c%c"
        );
        assert!(line.styles[4].is_none());
        assert!(line.styles[6].is_none());
        assert!(!line.plain_text().contains("kB"));
        assert!(!line.plain_text().contains("ms"));
    }

    #[test]
    fn test_response_line_untimed_token_omits_timing() {
        let config = LoggerConfig::default();
        let resp = response(Method::GET, json!({}));
        let line = response_line(&config, &resp, &token(None), 99, false);

        assert!(line.plain_text().contains("kB"));
        assert!(!line.plain_text().contains(" ms"));
        assert!(line.styles[6].is_none());
    }

    #[test]
    fn test_percent_escapes_in_uri_are_displayed_verbatim() {
        let config = LoggerConfig::default();
        let uri = "/caf%c3%a9?q=%C3%A9";
        let request = RequestConfig::get(uri);
        let sent = request_line(&config, &request, 1, uri);

        assert_eq!(sent.placeholder_count(), sent.styles.len());
        assert_eq!(sent.plain_text(), format!(" >> GET #1  {}", uri));
        let segments = sent.segments();
        assert_eq!(segments[3].0, uri);
        assert!(segments[3].1.unwrap().is_bold());

        let token = CorrelationToken {
            operation_id: 1,
            uri: uri.to_string(),
            started_at: Some(0),
        };
        let received = response_line(&config, &response(Method::GET, json!({})), &token, 3, false);
        assert_eq!(received.placeholder_count(), 8);
        assert!(received.plain_text().starts_with(&format!(" << GET #1  {} ", uri)));
        assert_eq!(received.segments()[3].0, uri);
    }
}
