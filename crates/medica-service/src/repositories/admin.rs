//! Aggregate counts for the admin overview.

use super::observe;
use crate::errors::MedicaError;
use crate::models::MarketplaceCounts;
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

/// Repository for admin-only aggregate queries.
pub struct AdminRepository;

impl AdminRepository {
    /// Row counts of the main marketplace tables.
    #[instrument(skip_all)]
    pub async fn counts(pool: &PgPool) -> Result<MarketplaceCounts, MedicaError> {
        let start = Instant::now();

        let query_result: Result<MarketplaceCounts, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM doctor_profiles) AS doctors,
                (SELECT COUNT(*) FROM medicines) AS medicines,
                (SELECT COUNT(*) FROM pharmacies) AS pharmacies,
                (SELECT COUNT(*) FROM reviews) AS reviews,
                (SELECT COUNT(*) FROM vip_consults) AS vip_consults,
                (SELECT COUNT(*) FROM vip_consults WHERE status = 'pending') AS pending_vip_consults
            "#,
        )
        .fetch_one(pool)
        .await;

        Ok(observe("marketplace_counts", start, query_result)?)
    }
}
