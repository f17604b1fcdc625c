//! Admin overview handler.

use crate::errors::MedicaError;
use crate::middleware::auth::require_role;
use crate::models::MarketplaceCounts;
use crate::observability::metrics;
use crate::repositories::AdminRepository;
use crate::routes::AppState;
use axum::{extract::State, Extension, Json};
use common::jwt::UserClaims;
use common::types::Role;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/v1/admin/overview
///
/// Returns marketplace row counts and refreshes the matching gauges.
///
/// # Response
///
/// - 200 OK: Counts
/// - 403 Forbidden: Caller is not an admin
#[instrument(skip_all, name = "medica.admin.overview")]
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<MarketplaceCounts>, MedicaError> {
    require_role(&claims, Role::Admin)?;

    let counts = AdminRepository::counts(&state.pool).await?;

    metrics::set_marketplace_entities("doctors", counts.doctors);
    metrics::set_marketplace_entities("medicines", counts.medicines);
    metrics::set_marketplace_entities("pharmacies", counts.pharmacies);
    metrics::set_marketplace_entities("reviews", counts.reviews);
    metrics::set_marketplace_entities("vip_consults", counts.vip_consults);
    metrics::set_marketplace_entities("pending_vip_consults", counts.pending_vip_consults);

    Ok(Json(counts))
}
