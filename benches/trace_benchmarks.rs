//! Trace line formatting benchmarks for wiretrace

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

use wiretrace::{
    CorrelationToken, HeaderMap, LoggerConfig, OperationCounter, RequestConfig, RequestKey,
    StatusCode, TracedResponse, is_empty_value, measure_response, project_request, request_line,
    response_line,
};

fn sample_request() -> RequestConfig {
    RequestConfig::get("/users")
        .with_base_url("https://api.example.com/v1")
        .with_param("page", 2)
        .with_param("sort", "name")
        .with_header("accept", "application/json")
}

fn sample_response() -> TracedResponse {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", "application/json".parse().unwrap());
    headers.insert("x-request-id", "abc-123".parse().unwrap());

    let users: Vec<_> = (0..50)
        .map(|i| json!({"id": i, "name": format!("user-{}", i), "active": i % 2 == 0}))
        .collect();

    TracedResponse::new(StatusCode::OK, headers, json!(users), sample_request())
}

fn sample_token() -> CorrelationToken {
    CorrelationToken {
        operation_id: 42,
        uri: "https://api.example.com/v1/users?page=2&sort=name".to_string(),
        started_at: Some(1_000),
    }
}

fn uri_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("uri");
    let request = sample_request();

    group.bench_function("resolve_with_params", |b| {
        b.iter(|| {
            let uri = black_box(&request).uri();
            black_box(uri)
        });
    });

    group.finish();
}

fn line_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("lines");
    let config = LoggerConfig::default();
    let request = sample_request();
    let response = sample_response();
    let token = sample_token();

    group.bench_function("request_line", |b| {
        b.iter(|| {
            let line = request_line(&config, black_box(&request), 42, &token.uri);
            black_box(line)
        });
    });

    group.bench_function("response_line", |b| {
        b.iter(|| {
            let line = response_line(&config, black_box(&response), &token, 1_084, false);
            black_box(line)
        });
    });

    group.bench_function("response_line_failed", |b| {
        b.iter(|| {
            let line = response_line(&config, black_box(&response), &token, 1_084, true);
            black_box(line)
        });
    });

    group.finish();
}

fn projection_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");
    let request = sample_request();
    let response = sample_response();
    let all_keys = [
        RequestKey::Url,
        RequestKey::Method,
        RequestKey::BaseUrl,
        RequestKey::Headers,
        RequestKey::Params,
        RequestKey::Data,
        RequestKey::Timeout,
    ];

    group.bench_function("project_request_all_keys", |b| {
        b.iter(|| {
            let projected = project_request(black_box(&request), &all_keys);
            black_box(projected)
        });
    });

    group.bench_function("measure_response", |b| {
        b.iter(|| {
            let size = measure_response(black_box(&response));
            black_box(size)
        });
    });

    let values = [json!(null), json!(""), json!([]), json!({}), json!(0), json!({"a": 1})];
    group.bench_function("is_empty_value", |b| {
        b.iter(|| {
            let empty = values.iter().filter(|v| is_empty_value(black_box(v))).count();
            black_box(empty)
        });
    });

    group.finish();
}

fn counter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter");
    let counter = OperationCounter::new();

    group.bench_function("next", |b| {
        b.iter(|| black_box(counter.next()));
    });

    group.finish();
}

criterion_group!(
    benches,
    uri_benchmark,
    line_benchmark,
    projection_benchmark,
    counter_benchmark,
);

criterion_main!(benches);
