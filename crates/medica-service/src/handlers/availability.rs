//! Doctor availability handlers.
//!
//! - `POST /api/v1/me/availability` - Add a weekly slot (doctor)
//! - `GET /api/v1/me/availability` - List the caller's slots (doctor)

use crate::errors::MedicaError;
use crate::handlers::parse_json_body;
use crate::middleware::auth::{require_role, subject_id};
use crate::models::{AddAvailabilityRequest, AvailabilityListResponse, AvailabilityView};
use crate::routes::AppState;
use crate::services::AvailabilityService;
use axum::{extract::State, http::StatusCode, Extension, Json};
use common::jwt::UserClaims;
use common::types::Role;
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/v1/me/availability
///
/// Body: `{"day": "Monday", "start_time": "09:00", "end_time": "12:00"}`.
///
/// # Response
///
/// - 201 Created: Slot stored
/// - 400 Bad Request: Malformed body, unknown day, bad time, or start not before end
/// - 403 Forbidden: Caller is not a doctor
/// - 404 Not Found: Caller has no doctor profile
/// - 409 Conflict: Slot overlaps an existing one on the same day
#[instrument(
    skip_all,
    name = "medica.availability.add",
    fields(method = "POST", endpoint = "/api/v1/me/availability")
)]
pub async fn add_availability(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<UserClaims>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<AvailabilityView>), MedicaError> {
    require_role(&claims, Role::Doctor)?;
    let user_id = subject_id(&claims)?;

    let request: AddAvailabilityRequest = parse_json_body(&body)?;

    let slot = AvailabilityService::add_slot(
        &state.pool,
        user_id,
        &request.day,
        &request.start_time,
        &request.end_time,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(AvailabilityView::from(slot))))
}

/// Handler for GET /api/v1/me/availability
///
/// Slots are ordered by weekday, then start time.
#[instrument(skip_all, name = "medica.availability.list")]
pub async fn list_availability(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<AvailabilityListResponse>, MedicaError> {
    require_role(&claims, Role::Doctor)?;
    let user_id = subject_id(&claims)?;

    let slots = AvailabilityService::list_slots(&state.pool, user_id).await?;

    Ok(Json(AvailabilityListResponse {
        availability: slots.into_iter().map(AvailabilityView::from).collect(),
    }))
}
