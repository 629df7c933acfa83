//! Metrics and observability utilities
//!
//! Metric descriptions and recording helpers for the catalog pipeline
//! and the gateway, using standardized `aixiv_*` naming.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all aiXiv metrics
pub const METRICS_PREFIX: &str = "aixiv";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s, backend timeout
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Backend fetch metrics
    describe_counter!(
        format!("{}_fetches_total", METRICS_PREFIX),
        Unit::Count,
        "Total submission fetches against the backend"
    );

    describe_counter!(
        format!("{}_fetch_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total failed submission fetches"
    );

    describe_histogram!(
        format!("{}_fetch_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Submission fetch latency in seconds"
    );

    describe_gauge!(
        format!("{}_fetched_records", METRICS_PREFIX),
        Unit::Count,
        "Records returned by the last successful fetch"
    );

    describe_counter!(
        format!("{}_stale_responses_total", METRICS_PREFIX),
        Unit::Count,
        "Fetch results discarded because a newer fetch was issued"
    );

    // Pipeline metrics
    describe_histogram!(
        format!("{}_pipeline_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Resolve/filter/sort/paginate latency in seconds"
    );

    describe_gauge!(
        format!("{}_matching_submissions", METRICS_PREFIX),
        Unit::Count,
        "Submissions matching the last evaluated view"
    );

    // View session metrics
    describe_gauge!(
        format!("{}_open_views", METRICS_PREFIX),
        Unit::Count,
        "Live view sessions held by the gateway"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a backend fetch
pub fn record_fetch(duration_secs: f64, source: &str, record_count: usize, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_fetches_total", METRICS_PREFIX),
        "source" => source.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_fetch_duration_seconds", METRICS_PREFIX),
            "source" => source.to_string()
        )
        .record(duration_secs);

        gauge!(
            format!("{}_fetched_records", METRICS_PREFIX),
            "source" => source.to_string()
        )
        .set(record_count as f64);
    } else {
        counter!(
            format!("{}_fetch_errors_total", METRICS_PREFIX),
            "source" => source.to_string()
        )
        .increment(1);
    }
}

/// Helper to record one pipeline evaluation
pub fn record_pipeline(duration_secs: f64, sort: &str, total_matching: usize) {
    histogram!(
        format!("{}_pipeline_duration_seconds", METRICS_PREFIX),
        "sort" => sort.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_matching_submissions", METRICS_PREFIX),
        "sort" => sort.to_string()
    )
    .set(total_matching as f64);
}

/// Helper to count a discarded out-of-order fetch result
pub fn record_stale_response() {
    counter!(format!("{}_stale_responses_total", METRICS_PREFIX)).increment(1);
}

/// Helper to publish the number of live view sessions
pub fn record_open_views(count: usize) {
    gauge!(format!("{}_open_views", METRICS_PREFIX)).set(count as f64);
}
