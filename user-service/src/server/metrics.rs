use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::Duration;

use crate::downstream::DownstreamService;

/// Metric name prefix for all user service metrics
const PREFIX: &str = "user_service";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Downstream Service Metrics
    pub static ref DOWNSTREAM_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_downstream_requests_total"),
            "Requests sent to the song, playlist and artist services"
        ),
        &["service", "method", "outcome"]
    ).expect("Failed to create downstream_requests_total metric");

    pub static ref DOWNSTREAM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_downstream_request_duration_seconds"),
            "Downstream request duration in seconds"
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
        &["service", "method"]
    ).expect("Failed to create downstream_request_duration_seconds metric");

    // Database Metrics
    pub static ref USER_STORE_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_user_store_errors_total"), "Failed user store operations"),
        &["operation"]
    ).expect("Failed to create user_store_errors_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Already registered is fine, tests call this repeatedly
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DOWNSTREAM_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(DOWNSTREAM_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(USER_STORE_ERRORS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record a request sent to a downstream service.
///
/// `outcome` is the response status code, or a short failure label when no
/// response was received.
pub fn record_downstream_request(
    service: DownstreamService,
    method: &str,
    outcome: &str,
    duration: Duration,
) {
    DOWNSTREAM_REQUESTS_TOTAL
        .with_label_values(&[service.label(), method, outcome])
        .inc();

    DOWNSTREAM_REQUEST_DURATION_SECONDS
        .with_label_values(&[service.label(), method])
        .observe(duration.as_secs_f64());
}

pub fn record_user_store_error(operation: &str) {
    USER_STORE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

/// Collapses ids out of a request path so metric labels stay bounded.
///
/// `/v1/users/12/playlists/7` becomes `/v1/users/{id}/playlists/{id}`.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let follows_collection = index > 0
                && matches!(
                    segments[index - 1],
                    "users" | "playlists" | "songs" | "artists"
                );
            if follows_collection && !segment.is_empty() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
