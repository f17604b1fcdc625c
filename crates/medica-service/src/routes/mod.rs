//! HTTP routes for the Medica service.
//!
//! Defines the Axum router and application state.

use crate::auth::JwtValidator;
use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_user_auth, AuthState};
use crate::services::AttachmentStore;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,

    /// Where VIP consult attachments are written.
    pub attachments: Arc<dyn AttachmentStore>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/ready`, `/metrics` - operational endpoints, public, unversioned
/// - Public `/api/v1` routes: doctor directory, pharmacy pages, medicine search
/// - Protected `/api/v1` routes behind `require_user_auth`; role checks
///   happen in the handlers
/// - Body size limit from `MAX_UPLOAD_BYTES`
/// - TraceLayer for request logging
/// - Request timeout from `REQUEST_TIMEOUT_SECONDS`
/// - HTTP metrics middleware (outermost)
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let jwt_validator = Arc::new(JwtValidator::new(
        &state.config.jwt_secret,
        state.config.jwt_clock_skew_seconds,
    ));
    let auth_state = Arc::new(AuthState { jwt_validator });

    let body_limit = state.config.max_upload_bytes;
    let request_timeout = Duration::from_secs(state.config.request_timeout_seconds);

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/api/v1/doctors", get(handlers::list_doctors))
        .route("/api/v1/doctors/:id", get(handlers::get_doctor))
        .route("/api/v1/specialties", get(handlers::list_specialties))
        .route("/api/v1/pharmacies/:id", get(handlers::get_pharmacy))
        .route("/api/v1/medicines/search", post(handlers::search_medicines))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/api/v1/doctors/:id/reviews", post(handlers::submit_review))
        .route(
            "/api/v1/me/availability",
            get(handlers::list_availability).post(handlers::add_availability),
        )
        .route("/api/v1/me/pharmacy/stock", put(handlers::update_stock))
        .route("/api/v1/me/vip-assignments", get(handlers::list_my_assignments))
        .route("/api/v1/vip-consults", post(handlers::create_vip_consult))
        .route("/api/v1/admin/overview", get(handlers::get_overview))
        .route_layer(middleware::from_fn_with_state(
            auth_state,
            require_user_auth,
        ))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. DefaultBodyLimit - Caps JSON and multipart bodies (innermost)
    // 2. TimeoutLayer
    // 3. TraceLayer
    // 4. http_metrics_middleware - Records ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(http_metrics_middleware))
}
