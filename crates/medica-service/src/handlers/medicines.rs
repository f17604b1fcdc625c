//! Medicine search handler.
//!
//! - `POST /api/v1/medicines/search` - Locate pharmacies stocking a medicine (public)

use crate::errors::MedicaError;
use crate::handlers::parse_json_body;
use crate::models::{MedicineSearchRequest, MedicineSearchResponse};
use crate::routes::AppState;
use crate::services::{MedicineLocatorService, RequesterLocation};
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/v1/medicines/search
///
/// Body: `{"medicine_name": "...", "lat": .., "lng": ..}`. Coordinates may be
/// numbers or numeric strings. A missing coordinate ranks from the configured
/// fallback point; an unparseable one returns every match with a null
/// distance.
///
/// # Response
///
/// - 200 OK: Matched medicine and up to 10 pharmacies, nearest first
/// - 400 Bad Request: Malformed body or empty medicine name
/// - 404 Not Found: No such medicine, or no pharmacy has it in stock
#[instrument(
    skip_all,
    name = "medica.medicine.search",
    fields(method = "POST", endpoint = "/api/v1/medicines/search")
)]
pub async fn search_medicines(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<Json<MedicineSearchResponse>, MedicaError> {
    let request: MedicineSearchRequest = parse_json_body(&body)?;

    let location = RequesterLocation::from_json(request.lat.as_ref(), request.lng.as_ref());

    let response = MedicineLocatorService::locate(
        &state.pool,
        &request.medicine_name,
        location,
        state.config.locator_fallback,
    )
    .await?;

    Ok(Json(response))
}
