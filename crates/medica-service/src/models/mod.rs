//! Medica service models.
//!
//! Domain records returned by repositories and the request/response types
//! of the HTTP API.

use chrono::{DateTime, NaiveTime, Utc};
use common::types::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Readiness check response.
///
/// Returned by the `/ready` endpoint (readiness probe).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Database connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,

    /// Error message (generic, no infrastructure details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Status enums
// ============================================================================

/// Error returned when a status column holds an unknown value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

/// Lifecycle of a VIP consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl ConsultStatus {
    /// Returns the database representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultStatus::Pending => "pending",
            ConsultStatus::Accepted => "accepted",
            ConsultStatus::Completed => "completed",
            ConsultStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ConsultStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConsultStatus::Pending),
            "accepted" => Ok(ConsultStatus::Accepted),
            "completed" => Ok(ConsultStatus::Completed),
            "cancelled" => Ok(ConsultStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// State of a single doctor's assignment to a VIP consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Declined,
}

impl AssignmentStatus {
    /// Returns the database representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Declined => "declined",
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AssignmentStatus::Pending),
            "accepted" => Ok(AssignmentStatus::Accepted),
            "declined" => Ok(AssignmentStatus::Declined),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Domain records
// ============================================================================

/// A medicine in the catalogue.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Medicine {
    pub medicine_id: Uuid,
    pub name: String,
    pub description: String,
}

/// A pharmacy with its coordinates.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Pharmacy {
    pub pharmacy_id: Uuid,
    pub owner_user_id: Option<Uuid>,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl Pharmacy {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Quantity of one medicine held by one pharmacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct StockEntry {
    pub pharmacy_id: Uuid,
    pub medicine_id: Uuid,
    pub quantity: i32,
}

/// Stock line as shown on a pharmacy page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockLine {
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub quantity: i32,
}

/// A doctor's public profile.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DoctorProfile {
    pub doctor_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub specialty: String,
    pub address: String,
    pub phone: String,
    pub bio: String,
    pub average_rating: f64,
}

/// A patient's review of a doctor.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub review_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A weekly availability slot.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Availability {
    pub availability_id: Uuid,
    pub doctor_id: Uuid,
    pub day: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// A VIP consultation request.
#[derive(Debug, Clone)]
pub struct VipConsult {
    pub consult_id: Uuid,
    pub patient_id: Uuid,
    pub description: String,
    pub specialty: String,
    pub attachment_path: Option<String>,
    pub status: ConsultStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields of a consult about to be created.
#[derive(Debug, Clone)]
pub struct NewConsult {
    pub description: String,
    pub specialty: String,
    pub attachment_path: Option<String>,
}

/// An assignment joined with the consult it belongs to.
#[derive(Debug, Clone)]
pub struct AssignedConsult {
    pub assignment_id: Uuid,
    pub assignment_status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub consult: VipConsult,
}

/// Row counts shown on the admin overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MarketplaceCounts {
    pub doctors: i64,
    pub medicines: i64,
    pub pharmacies: i64,
    pub reviews: i64,
    pub vip_consults: i64,
    pub pending_vip_consults: i64,
}

// ============================================================================
// Medicine search API
// ============================================================================

/// Medicine search request body.
///
/// `lat` and `lng` are kept as raw JSON so numeric strings and malformed
/// values can be told apart from missing ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicineSearchRequest {
    #[serde(default)]
    pub medicine_name: String,

    #[serde(default)]
    pub lat: Option<serde_json::Value>,

    #[serde(default)]
    pub lng: Option<serde_json::Value>,
}

/// Matched medicine in a search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<Medicine> for MedicineSummary {
    fn from(medicine: Medicine) -> Self {
        Self {
            id: medicine.medicine_id,
            name: medicine.name,
            description: medicine.description,
        }
    }
}

/// One ranked pharmacy in a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyMatch {
    pub pharmacy_id: Uuid,
    pub pharmacy_name: String,
    pub address: String,
    pub quantity: i32,
    /// Kilometres from the requester, rounded to 2 decimals. `None` when the
    /// requester's coordinates could not be parsed.
    pub distance: Option<f64>,
    pub lat: f64,
    pub lng: f64,
}

/// Medicine search response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineSearchResponse {
    pub medicine: MedicineSummary,
    pub pharmacies: Vec<PharmacyMatch>,
}

// ============================================================================
// Doctor directory API
// ============================================================================

/// Query parameters for the doctor directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorListQuery {
    pub specialty: Option<String>,
    pub min_rating: Option<String>,
}

/// Directory card for one doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorCard {
    pub doctor_id: Uuid,
    pub display_name: String,
    pub specialty: String,
    pub address: String,
    pub average_rating: f64,
    pub bio_excerpt: String,
}

/// Doctor directory response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListResponse {
    pub doctors: Vec<DoctorCard>,
}

/// Distinct specialties response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtiesResponse {
    pub specialties: Vec<String>,
}

/// Review as shown on a doctor's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewView {
    pub review_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            review_id: review.review_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

/// Full doctor profile response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDetailResponse {
    pub doctor_id: Uuid,
    pub display_name: String,
    pub specialty: String,
    pub address: String,
    pub phone: String,
    pub bio: String,
    pub average_rating: f64,
    pub reviews: Vec<ReviewView>,
}

// ============================================================================
// Reviews API
// ============================================================================

/// Review submission body.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReviewRequest {
    pub rating: i64,

    #[serde(default)]
    pub comment: String,
}

/// Review submission response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReviewResponse {
    pub review_id: Uuid,
    pub average_rating: f64,
}

// ============================================================================
// Availability API
// ============================================================================

/// New availability slot body. Times are `HH:MM`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddAvailabilityRequest {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

/// Availability slot as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityView {
    pub availability_id: Uuid,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

impl From<Availability> for AvailabilityView {
    fn from(slot: Availability) -> Self {
        Self {
            availability_id: slot.availability_id,
            day: slot.day,
            start_time: slot.start_time.format("%H:%M").to_string(),
            end_time: slot.end_time.format("%H:%M").to_string(),
        }
    }
}

/// Availability listing response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityListResponse {
    pub availability: Vec<AvailabilityView>,
}

// ============================================================================
// Pharmacy API
// ============================================================================

/// Stock update body.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStockRequest {
    pub medicine_name: String,
    pub quantity: i64,
}

/// Stock update response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStockResponse {
    pub pharmacy_id: Uuid,
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub quantity: i32,
    pub medicine_created: bool,
}

/// Pharmacy page response body.
#[derive(Debug, Clone, Serialize)]
pub struct PharmacyDetailResponse {
    pub pharmacy_id: Uuid,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub stock: Vec<StockLine>,
}

// ============================================================================
// VIP consult API
// ============================================================================

/// VIP consult creation response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultCreatedResponse {
    pub consult_id: Uuid,
    pub status: ConsultStatus,
    pub assigned_doctors: usize,
}

/// One consult offered to the calling doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentView {
    pub assignment_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub consult_id: Uuid,
    pub description: String,
    pub specialty: String,
    pub attachment_path: Option<String>,
    pub consult_status: ConsultStatus,
}

impl From<AssignedConsult> for AssignmentView {
    fn from(assigned: AssignedConsult) -> Self {
        Self {
            assignment_id: assigned.assignment_id,
            status: assigned.assignment_status,
            assigned_at: assigned.assigned_at,
            consult_id: assigned.consult.consult_id,
            description: assigned.consult.description,
            specialty: assigned.consult.specialty,
            attachment_path: assigned.consult.attachment_path,
            consult_status: assigned.consult.status,
        }
    }
}

/// Doctor's assignment listing response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentListResponse {
    pub assignments: Vec<AssignmentView>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_consult_status_round_trips_through_str() {
        for status in [
            ConsultStatus::Pending,
            ConsultStatus::Accepted,
            ConsultStatus::Completed,
            ConsultStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ConsultStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ConsultStatus>().is_err());
    }

    #[test]
    fn test_assignment_status_round_trips_through_str() {
        for status in [
            AssignmentStatus::Pending,
            AssignmentStatus::Accepted,
            AssignmentStatus::Declined,
        ] {
            assert_eq!(status.as_str().parse::<AssignmentStatus>().unwrap(), status);
        }
        assert_eq!(
            "expired".parse::<AssignmentStatus>(),
            Err(UnknownStatus("expired".to_string()))
        );
    }

    #[test]
    fn test_search_request_keeps_raw_coordinates() {
        let req: MedicineSearchRequest =
            serde_json::from_str(r#"{"medicine_name":"Aspirin","lat":"48.85","lng":2.35}"#)
                .unwrap();

        assert_eq!(req.medicine_name, "Aspirin");
        assert_eq!(req.lat, Some(serde_json::json!("48.85")));
        assert_eq!(req.lng, Some(serde_json::json!(2.35)));
    }

    #[test]
    fn test_search_request_missing_fields_default() {
        let req: MedicineSearchRequest = serde_json::from_str("{}").unwrap();

        assert!(req.medicine_name.is_empty());
        assert!(req.lat.is_none());
        assert!(req.lng.is_none());
    }

    #[test]
    fn test_pharmacy_match_serializes_null_distance() {
        let row = PharmacyMatch {
            pharmacy_id: Uuid::nil(),
            pharmacy_name: "Pharmacie Centrale".to_string(),
            address: "1 Rue de Rivoli".to_string(),
            quantity: 4,
            distance: None,
            lat: 48.86,
            lng: 2.34,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert!(json["distance"].is_null());
        assert_eq!(json["pharmacy_name"], "Pharmacie Centrale");
    }

    #[test]
    fn test_availability_view_formats_times() {
        let slot = Availability {
            availability_id: Uuid::nil(),
            doctor_id: Uuid::nil(),
            day: "Monday".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
        };

        let view = AvailabilityView::from(slot);
        assert_eq!(view.start_time, "09:00");
        assert_eq!(view.end_time, "12:30");
    }

    #[test]
    fn test_readiness_response_omits_empty_fields() {
        let ready = ReadinessResponse {
            status: "ready",
            database: Some("healthy"),
            error: None,
        };

        let json = serde_json::to_string(&ready).unwrap();
        assert!(json.contains("\"status\":\"ready\""));
        assert!(!json.contains("\"error\""));
    }
}
