//! HTTP request handlers for the Medica service.

pub mod admin;
pub mod availability;
pub mod doctors;
pub mod health;
pub mod medicines;
pub mod metrics;
pub mod pharmacies;
pub mod vip_consults;

pub use admin::get_overview;
pub use availability::{add_availability, list_availability};
pub use doctors::{get_doctor, list_doctors, list_specialties, submit_review};
pub use health::{health_check, readiness_check};
pub use medicines::search_medicines;
pub use metrics::metrics_handler;
pub use pharmacies::{get_pharmacy, update_stock};
pub use vip_consults::{create_vip_consult, list_my_assignments};

use crate::errors::MedicaError;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Deserialize a JSON request body.
///
/// Handlers take the raw body instead of `Json<T>` so malformed input is a
/// 400 with our error envelope rather than axum's 422.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, MedicaError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "medica.handlers", error = %e, "Invalid request body");
        MedicaError::Validation("Invalid request body".to_string())
    })
}

/// Parse a resource id taken from the path.
///
/// A malformed id cannot name an existing resource, so it is reported as
/// not found.
pub(crate) fn parse_path_id(raw: &str, resource: &str) -> Result<Uuid, MedicaError> {
    Uuid::parse_str(raw).map_err(|_| MedicaError::NotFound(format!("{resource} not found")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::SubmitReviewRequest;

    #[test]
    fn test_parse_json_body_accepts_valid_json() {
        let request: SubmitReviewRequest =
            parse_json_body(br#"{"rating": 4, "comment": "Kind and thorough"}"#).unwrap();
        assert_eq!(request.rating, 4);
        assert_eq!(request.comment, "Kind and thorough");
    }

    #[test]
    fn test_parse_json_body_rejects_malformed_json() {
        let err = parse_json_body::<SubmitReviewRequest>(b"{rating: 4").unwrap_err();
        assert!(matches!(err, MedicaError::Validation(_)));
    }

    #[test]
    fn test_parse_path_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_path_id(&id.to_string(), "Doctor").unwrap(), id);

        let err = parse_path_id("not-a-uuid", "Doctor").unwrap_err();
        assert!(matches!(err, MedicaError::NotFound(ref m) if m == "Doctor not found"));
    }

    #[test]
    fn test_parse_json_body_rejects_wrong_types() {
        let err = parse_json_body::<SubmitReviewRequest>(br#"{"rating": "five"}"#).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
