//! HTTP metrics middleware.
//!
//! Records every response, including ones produced before a handler runs
//! (unknown route, wrong method, body limit exceeded, auth rejection).

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Records method, normalized path, status and duration of each request.
///
/// Applied as the outermost layer.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status_code = response.status().as_u16();
    record_http_request(&method, &path, status_code, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn handler_200() -> &'static str {
        "OK"
    }

    async fn handler_409() -> (StatusCode, &'static str) {
        (StatusCode::CONFLICT, "Already reviewed")
    }

    fn test_app() -> Router {
        Router::new()
            .route("/api/v1/specialties", get(handler_200))
            .route("/api/v1/doctors/:id/reviews", get(handler_409))
            .layer(middleware::from_fn(http_metrics_middleware))
    }

    #[tokio::test]
    async fn test_middleware_records_success() {
        let app = test_app();

        let request = HttpRequest::builder()
            .method("GET")
            .uri("/api/v1/specialties")
            .body(Body::empty())
            .expect("request builder should succeed");

        let response = app.oneshot(request).await.expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_records_handler_error() {
        let app = test_app();

        let request = HttpRequest::builder()
            .method("GET")
            .uri("/api/v1/doctors/5f0c1d2e-3a4b-4c5d-8e6f-7a8b9c0d1e2f/reviews")
            .body(Body::empty())
            .expect("request builder should succeed");

        let response = app.oneshot(request).await.expect("request should succeed");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_middleware_records_not_found() {
        let app = test_app();

        let request = HttpRequest::builder()
            .method("GET")
            .uri("/api/v1/unknown")
            .body(Body::empty())
            .expect("request builder should succeed");

        let response = app.oneshot(request).await.expect("request should succeed");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
