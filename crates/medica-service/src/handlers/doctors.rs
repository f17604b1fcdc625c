//! Doctor directory and review handlers.
//!
//! - `GET /api/v1/doctors` - Directory with optional filters (public)
//! - `GET /api/v1/specialties` - Distinct specialties (public)
//! - `GET /api/v1/doctors/{id}` - Profile with reviews (public)
//! - `POST /api/v1/doctors/{id}/reviews` - Submit a review (patient)

use crate::errors::MedicaError;
use crate::handlers::{parse_json_body, parse_path_id};
use crate::middleware::auth::{require_role, subject_id};
use crate::models::{
    DoctorDetailResponse, DoctorListQuery, DoctorListResponse, SpecialtiesResponse,
    SubmitReviewRequest, SubmitReviewResponse,
};
use crate::repositories::DoctorsRepository;
use crate::routes::AppState;
use crate::services::doctor_directory::parse_min_rating;
use crate::services::geo::round1;
use crate::services::{DoctorDirectoryService, ReviewService};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use common::jwt::UserClaims;
use common::types::Role;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/v1/doctors
///
/// `specialty` matches as a case-insensitive substring. `min_rating` keeps
/// doctors rated at or above it; an unparseable value is ignored.
#[instrument(skip_all, name = "medica.doctors.list")]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<DoctorListResponse>, MedicaError> {
    let min_rating = parse_min_rating(query.min_rating.as_deref());

    let doctors =
        DoctorDirectoryService::list(&state.pool, query.specialty.as_deref(), min_rating).await?;

    Ok(Json(DoctorListResponse { doctors }))
}

/// Handler for GET /api/v1/specialties
#[instrument(skip_all, name = "medica.doctors.specialties")]
pub async fn list_specialties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SpecialtiesResponse>, MedicaError> {
    let specialties = DoctorsRepository::list_specialties(&state.pool).await?;
    Ok(Json(SpecialtiesResponse { specialties }))
}

/// Handler for GET /api/v1/doctors/{id}
///
/// # Response
///
/// - 200 OK: Profile with reviews, newest first
/// - 404 Not Found: Unknown doctor
#[instrument(skip_all, name = "medica.doctors.detail")]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<DoctorDetailResponse>, MedicaError> {
    let doctor_id = parse_path_id(&doctor_id, "Doctor")?;
    let detail = DoctorDirectoryService::detail(&state.pool, doctor_id).await?;
    Ok(Json(detail))
}

/// Handler for POST /api/v1/doctors/{id}/reviews
///
/// Body: `{"rating": 1..=5, "comment": "..."}`.
///
/// # Response
///
/// - 201 Created: Review stored; body carries the doctor's new average
/// - 400 Bad Request: Malformed body or rating out of range
/// - 403 Forbidden: Caller is not a patient
/// - 404 Not Found: Unknown doctor
/// - 409 Conflict: The caller already reviewed this doctor
#[instrument(
    skip_all,
    name = "medica.doctors.review",
    fields(method = "POST", endpoint = "/api/v1/doctors/{id}/reviews")
)]
pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<UserClaims>,
    Path(doctor_id): Path<String>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<SubmitReviewResponse>), MedicaError> {
    require_role(&claims, Role::Patient)?;
    let patient_id = subject_id(&claims)?;
    let doctor_id = parse_path_id(&doctor_id, "Doctor")?;

    let request: SubmitReviewRequest = parse_json_body(&body)?;

    let submitted = ReviewService::submit_review(
        &state.pool,
        doctor_id,
        patient_id,
        request.rating,
        &request.comment,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitReviewResponse {
            review_id: submitted.review.review_id,
            average_rating: round1(submitted.average_rating),
        }),
    ))
}
