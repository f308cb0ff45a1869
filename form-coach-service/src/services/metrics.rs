//! Prometheus metrics for form-coach-service.
//!
//! AI call, validation and persistence metrics. HTTP request metrics live in
//! `service_core::middleware::metrics` and are appended by [`get_metrics`].

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// AI metrics
pub static AI_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static AI_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static AI_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Output contract metrics
pub static VALIDATION_FAILURES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Persistence metrics
pub static RECORDS_PERSISTED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static DB_QUERY_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize all metrics. Must be called once at startup.
pub fn init_metrics() {
    let registry = Registry::new();

    let ai_requests = IntCounterVec::new(
        Opts::new("form_coach_ai_requests_total", "Total generative AI calls"),
        &["operation", "status"],
    )
    .expect("Failed to create form_coach_ai_requests_total metric");

    let ai_latency = HistogramVec::new(
        HistogramOpts::new(
            "form_coach_ai_latency_seconds",
            "Generative AI call latency in seconds",
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["operation"],
    )
    .expect("Failed to create form_coach_ai_latency_seconds metric");

    let ai_tokens = IntCounterVec::new(
        Opts::new("form_coach_ai_tokens_total", "Total tokens processed"),
        &["operation", "direction"], // direction: input, output
    )
    .expect("Failed to create form_coach_ai_tokens_total metric");

    let validation_failures = IntCounterVec::new(
        Opts::new(
            "form_coach_validation_failures_total",
            "AI responses rejected before persistence",
        ),
        &["reason"],
    )
    .expect("Failed to create form_coach_validation_failures_total metric");

    let records_persisted = IntCounterVec::new(
        Opts::new("form_coach_records_persisted_total", "Row insert attempts"),
        &["table", "status"],
    )
    .expect("Failed to create form_coach_records_persisted_total metric");

    let db_duration = HistogramVec::new(
        HistogramOpts::new(
            "form_coach_db_query_duration_seconds",
            "Database query duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["operation"],
    )
    .expect("Failed to create form_coach_db_query_duration_seconds metric");

    registry
        .register(Box::new(ai_requests.clone()))
        .expect("Failed to register form_coach_ai_requests_total");
    registry
        .register(Box::new(ai_latency.clone()))
        .expect("Failed to register form_coach_ai_latency_seconds");
    registry
        .register(Box::new(ai_tokens.clone()))
        .expect("Failed to register form_coach_ai_tokens_total");
    registry
        .register(Box::new(validation_failures.clone()))
        .expect("Failed to register form_coach_validation_failures_total");
    registry
        .register(Box::new(records_persisted.clone()))
        .expect("Failed to register form_coach_records_persisted_total");
    registry
        .register(Box::new(db_duration.clone()))
        .expect("Failed to register form_coach_db_query_duration_seconds");

    let _ = REGISTRY.set(registry);
    let _ = AI_REQUESTS_TOTAL.set(ai_requests);
    let _ = AI_LATENCY_SECONDS.set(ai_latency);
    let _ = AI_TOKENS_TOTAL.set(ai_tokens);
    let _ = VALIDATION_FAILURES_TOTAL.set(validation_failures);
    let _ = RECORDS_PERSISTED_TOTAL.set(records_persisted);
    let _ = DB_QUERY_DURATION_SECONDS.set(db_duration);

    tracing::info!("Prometheus metrics initialized");
}

/// Get service and HTTP metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = encode_registry();
    output.push_str(&service_core::middleware::metrics::render_http_metrics());
    output
}

fn encode_registry() -> String {
    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => return "# Metrics registry not initialized\n".to_string(),
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

/// Record a finished AI call. `status` is `ok` or a provider error kind.
pub fn record_ai_request(operation: &str, status: &str, duration_secs: f64) {
    if let Some(counter) = AI_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[operation, status]).inc();
    }
    if let Some(histogram) = AI_LATENCY_SECONDS.get() {
        histogram.with_label_values(&[operation]).observe(duration_secs);
    }
}

pub fn record_tokens(operation: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(counter) = AI_TOKENS_TOTAL.get() {
        counter
            .with_label_values(&[operation, "input"])
            .inc_by(input_tokens.max(0) as u64);
        counter
            .with_label_values(&[operation, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}

pub fn record_validation_failure(reason: &str) {
    if let Some(counter) = VALIDATION_FAILURES_TOTAL.get() {
        counter.with_label_values(&[reason]).inc();
    }
}

/// Record a row insert attempt; `status` is `ok` or `error`.
pub fn record_persisted(table: &str, status: &str) {
    if let Some(counter) = RECORDS_PERSISTED_TOTAL.get() {
        counter.with_label_values(&[table, status]).inc();
    }
}

pub fn record_db_query(operation: &str, duration_secs: f64) {
    if let Some(histogram) = DB_QUERY_DURATION_SECONDS.get() {
        histogram.with_label_values(&[operation]).observe(duration_secs);
    }
}
