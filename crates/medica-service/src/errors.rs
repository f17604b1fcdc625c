//! Medica service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Messages
//! for 5xx responses are generic; the underlying cause is logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Medica service error type.
///
/// Maps to HTTP status codes:
/// - Validation: 400 Bad Request
/// - InvalidToken: 401 Unauthorized
/// - Forbidden: 403 Forbidden
/// - NotFound, OutOfStock: 404 Not Found
/// - Conflict: 409 Conflict
/// - PayloadTooLarge: 413 Payload Too Large
/// - Database, Storage, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum MedicaError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error")]
    Internal,
}

impl MedicaError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            MedicaError::Validation(_) => 400,
            MedicaError::InvalidToken(_) => 401,
            MedicaError::Forbidden(_) => 403,
            MedicaError::NotFound(_) | MedicaError::OutOfStock(_) => 404,
            MedicaError::Conflict(_) => 409,
            MedicaError::PayloadTooLarge => 413,
            MedicaError::Database(_) | MedicaError::Storage(_) | MedicaError::Internal => 500,
        }
    }

    /// Bounded label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MedicaError::Validation(_) => "validation",
            MedicaError::InvalidToken(_) => "invalid_token",
            MedicaError::Forbidden(_) => "forbidden",
            MedicaError::NotFound(_) => "not_found",
            MedicaError::OutOfStock(_) => "out_of_stock",
            MedicaError::Conflict(_) => "conflict",
            MedicaError::PayloadTooLarge => "payload_too_large",
            MedicaError::Database(_) => "database",
            MedicaError::Storage(_) => "storage",
            MedicaError::Internal => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for MedicaError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            MedicaError::Validation(reason) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", reason.clone())
            }
            MedicaError::InvalidToken(reason) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", reason.clone())
            }
            MedicaError::Forbidden(reason) => (StatusCode::FORBIDDEN, "FORBIDDEN", reason.clone()),
            MedicaError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone())
            }
            MedicaError::OutOfStock(reason) => {
                (StatusCode::NOT_FOUND, "OUT_OF_STOCK", reason.clone())
            }
            MedicaError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason.clone()),
            MedicaError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "The uploaded content is too large".to_string(),
            ),
            MedicaError::Database(err) => {
                tracing::error!(target: "medica.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            MedicaError::Storage(err) => {
                tracing::error!(target: "medica.storage", error = %err, "Attachment storage failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "The attachment could not be stored".to_string(),
                )
            }
            MedicaError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = "Bearer realm=\"medica-api\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

/// Convert sqlx errors to MedicaError
impl From<sqlx::Error> for MedicaError {
    fn from(err: sqlx::Error) -> Self {
        MedicaError::Database(err.to_string())
    }
}

/// Returns true when the error is a PostgreSQL unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            MedicaError::Validation("empty name".to_string()).to_string(),
            "Validation error: empty name"
        );
        assert_eq!(
            MedicaError::OutOfStock("Aspirin".to_string()).to_string(),
            "Out of stock: Aspirin"
        );
        assert_eq!(
            MedicaError::Conflict("duplicate review".to_string()).to_string(),
            "Conflict: duplicate review"
        );
        assert_eq!(MedicaError::PayloadTooLarge.to_string(), "Payload too large");
        assert_eq!(MedicaError::Internal.to_string(), "Internal server error");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(MedicaError::Validation("x".to_string()).status_code(), 400);
        assert_eq!(MedicaError::InvalidToken("x".to_string()).status_code(), 401);
        assert_eq!(MedicaError::Forbidden("x".to_string()).status_code(), 403);
        assert_eq!(MedicaError::NotFound("x".to_string()).status_code(), 404);
        assert_eq!(MedicaError::OutOfStock("x".to_string()).status_code(), 404);
        assert_eq!(MedicaError::Conflict("x".to_string()).status_code(), 409);
        assert_eq!(MedicaError::PayloadTooLarge.status_code(), 413);
        assert_eq!(MedicaError::Database("x".to_string()).status_code(), 500);
        assert_eq!(MedicaError::Storage("x".to_string()).status_code(), 500);
        assert_eq!(MedicaError::Internal.status_code(), 500);
    }

    #[tokio::test]
    async fn test_into_response_validation() {
        let response = MedicaError::Validation("Please enter a medicine name.".to_string())
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body_json["error"]["message"],
            "Please enter a medicine name."
        );
    }

    #[tokio::test]
    async fn test_into_response_out_of_stock_is_404() {
        let response = MedicaError::OutOfStock("Ibuprofen".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "OUT_OF_STOCK");
    }

    #[tokio::test]
    async fn test_into_response_invalid_token_sets_www_authenticate() {
        let response = MedicaError::InvalidToken("token expired".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let www_auth = response
            .headers()
            .get("WWW-Authenticate")
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(www_auth.contains("Bearer realm=\"medica-api\""));

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_into_response_conflict() {
        let response =
            MedicaError::Conflict("You have already reviewed this doctor.".to_string())
                .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_into_response_database_error_is_generic() {
        let response =
            MedicaError::Database("relation \"pharmacies\" does not exist".to_string())
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "DATABASE_ERROR");
        assert_eq!(
            body_json["error"]["message"],
            "An internal database error occurred"
        );
    }

    #[tokio::test]
    async fn test_into_response_storage_error_is_generic() {
        let response = MedicaError::Storage("disk full at /srv".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "STORAGE_ERROR");
        assert!(!body_json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("/srv"));
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: MedicaError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, MedicaError::Database(_)));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
