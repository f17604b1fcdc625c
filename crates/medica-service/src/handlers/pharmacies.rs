//! Pharmacy handlers.
//!
//! - `GET /api/v1/pharmacies/{id}` - Pharmacy page with stock (public)
//! - `PUT /api/v1/me/pharmacy/stock` - Set a medicine's quantity (pharmacy)

use crate::errors::MedicaError;
use crate::handlers::{parse_json_body, parse_path_id};
use crate::middleware::auth::{require_role, subject_id};
use crate::models::{PharmacyDetailResponse, UpdateStockRequest, UpdateStockResponse};
use crate::repositories::{PharmaciesRepository, StocksRepository};
use crate::routes::AppState;
use crate::services::PharmacyStockService;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use common::jwt::UserClaims;
use common::types::Role;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/v1/pharmacies/{id}
#[instrument(skip_all, name = "medica.pharmacies.detail")]
pub async fn get_pharmacy(
    State(state): State<Arc<AppState>>,
    Path(pharmacy_id): Path<String>,
) -> Result<Json<PharmacyDetailResponse>, MedicaError> {
    let pharmacy_id = parse_path_id(&pharmacy_id, "Pharmacy")?;

    let pharmacy = PharmaciesRepository::get_by_id(&state.pool, pharmacy_id)
        .await?
        .ok_or_else(|| MedicaError::NotFound("Pharmacy not found".to_string()))?;

    let stock = StocksRepository::list_for_pharmacy(&state.pool, pharmacy_id).await?;

    Ok(Json(PharmacyDetailResponse {
        pharmacy_id: pharmacy.pharmacy_id,
        name: pharmacy.name,
        address: pharmacy.address,
        lat: pharmacy.lat,
        lng: pharmacy.lng,
        stock,
    }))
}

/// Handler for PUT /api/v1/me/pharmacy/stock
///
/// Body: `{"medicine_name": "...", "quantity": 12}`. Unknown medicines are
/// added to the catalogue.
///
/// # Response
///
/// - 200 OK: Stock row written
/// - 400 Bad Request: Malformed body, empty name, or negative quantity
/// - 403 Forbidden: Caller is not a pharmacy
/// - 404 Not Found: Caller owns no pharmacy
#[instrument(
    skip_all,
    name = "medica.pharmacies.update_stock",
    fields(method = "PUT", endpoint = "/api/v1/me/pharmacy/stock")
)]
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<UserClaims>,
    body: axum::body::Bytes,
) -> Result<Json<UpdateStockResponse>, MedicaError> {
    require_role(&claims, Role::Pharmacy)?;
    let owner_id = subject_id(&claims)?;

    let request: UpdateStockRequest = parse_json_body(&body)?;

    let response = PharmacyStockService::update_stock(
        &state.pool,
        owner_id,
        &request.medicine_name,
        request.quantity,
    )
    .await?;

    Ok(Json(response))
}
