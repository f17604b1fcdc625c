//! Metrics definitions for the Medica service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `medica_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: the route table below, plus "/other"
//! - `status`: 3 values (success, error, timeout)
//! - `outcome`: bounded by code (found, not_found, out_of_stock, invalid)
//! - `operation`: bounded by code (search_medicine, list_stock, ...)

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Routes reported under their own `endpoint` label. UUID path segments are
/// replaced by `{id}` before lookup.
const KNOWN_ENDPOINTS: &[&str] = &[
    "/health",
    "/ready",
    "/metrics",
    "/api/v1/doctors",
    "/api/v1/doctors/{id}",
    "/api/v1/doctors/{id}/reviews",
    "/api/v1/specialties",
    "/api/v1/medicines/search",
    "/api/v1/pharmacies/{id}",
    "/api/v1/me/availability",
    "/api/v1/me/pharmacy/stock",
    "/api/v1/me/vip-assignments",
    "/api/v1/vip-consults",
    "/api/v1/admin/overview",
];

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("medica_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("medica_medicine_search".to_string()),
            &[0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000],
        )
        .map_err(|e| format!("Failed to set medicine search buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("medica_vip_assignment".to_string()),
            &[0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000],
        )
        .map_err(|e| format!("Failed to set VIP assignment buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("medica_db_query".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `medica_http_requests_total`, `medica_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("medica_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("medica_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion.
///
/// UUID segments become `{id}`; anything outside the route table becomes
/// "/other".
fn normalize_endpoint(path: &str) -> String {
    let normalized = path
        .split('/')
        .map(|segment| {
            if uuid::Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    if KNOWN_ENDPOINTS.contains(&normalized.as_str()) {
        normalized
    } else {
        "/other".to_string()
    }
}

// ============================================================================
// Medicine Locator Metrics
// ============================================================================

/// Record a medicine search.
///
/// Metric: `medica_medicine_search_duration_seconds`, `medica_medicine_searches_total`
/// Labels: `outcome` (found, not_found, out_of_stock, invalid, error)
pub fn record_medicine_search(outcome: &str, result_count: usize, duration: Duration) {
    histogram!("medica_medicine_search_duration_seconds",
        "outcome" => outcome.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("medica_medicine_searches_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!("medica_medicine_search_results").record(result_count as f64);
}

// ============================================================================
// VIP Assignment Metrics
// ============================================================================

/// Record a VIP consult fan-out.
///
/// Metric: `medica_vip_assignment_duration_seconds`, `medica_vip_assignments_total`,
/// `medica_vip_assigned_doctors`
/// Labels: `pool` (specialty, fallback)
pub fn record_vip_assignment(pool: &str, assigned: usize, duration: Duration) {
    histogram!("medica_vip_assignment_duration_seconds",
        "pool" => pool.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("medica_vip_assignments_total",
        "pool" => pool.to_string()
    )
    .increment(1);

    histogram!("medica_vip_assigned_doctors").record(assigned as f64);
}

/// Record a consult created with no qualifying doctor at all.
///
/// Metric: `medica_vip_assignment_empty_total`
pub fn record_vip_assignment_empty() {
    counter!("medica_vip_assignment_empty_total").increment(1);
}

// ============================================================================
// Review Metrics
// ============================================================================

/// Record a review submission attempt.
///
/// Metric: `medica_review_submissions_total`
/// Labels: `status` (accepted, duplicate, invalid, not_found, error)
pub fn record_review_submission(status: &str) {
    counter!("medica_review_submissions_total",
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record database query execution
///
/// Metric: `medica_db_query_duration_seconds`, `medica_db_queries_total`
/// Labels: `operation`, `status`
pub fn record_db_query(operation: &str, status: &str, duration: Duration) {
    histogram!("medica_db_query_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("medica_db_queries_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Marketplace Gauges
// ============================================================================

/// Set the current size of a marketplace entity table.
///
/// Metric: `medica_marketplace_entities`
/// Labels: `entity` (doctors, medicines, pharmacies, reviews, vip_consults,
/// pending_vip_consults)
///
/// Refreshed whenever the admin overview is computed.
pub fn set_marketplace_entities(entity: &str, count: i64) {
    gauge!("medica_marketplace_entities",
        "entity" => entity.to_string()
    )
    .set(count as f64);
}
