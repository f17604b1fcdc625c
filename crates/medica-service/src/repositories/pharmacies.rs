//! Pharmacies repository.

use super::observe;
use crate::errors::MedicaError;
use crate::models::Pharmacy;
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// Repository for pharmacy lookups.
pub struct PharmaciesRepository;

impl PharmaciesRepository {
    /// Get a pharmacy by ID.
    #[instrument(skip_all, fields(pharmacy_id = %pharmacy_id))]
    pub async fn get_by_id(
        pool: &PgPool,
        pharmacy_id: Uuid,
    ) -> Result<Option<Pharmacy>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Option<Pharmacy>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT pharmacy_id, owner_user_id, name, address, lat, lng
            FROM pharmacies
            WHERE pharmacy_id = $1
            "#,
        )
        .bind(pharmacy_id)
        .fetch_optional(pool)
        .await;

        Ok(observe("get_pharmacy", start, query_result)?)
    }

    /// Batch lookup by primary key. Unknown IDs are simply absent from the
    /// result; order is by `pharmacy_id`.
    #[instrument(skip_all, fields(count = pharmacy_ids.len()))]
    pub async fn get_by_ids(
        pool: &PgPool,
        pharmacy_ids: &[Uuid],
    ) -> Result<Vec<Pharmacy>, MedicaError> {
        if pharmacy_ids.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();

        let query_result: Result<Vec<Pharmacy>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT pharmacy_id, owner_user_id, name, address, lat, lng
            FROM pharmacies
            WHERE pharmacy_id = ANY($1)
            ORDER BY pharmacy_id
            "#,
        )
        .bind(pharmacy_ids)
        .fetch_all(pool)
        .await;

        Ok(observe("get_pharmacies_by_ids", start, query_result)?)
    }

    /// Get the pharmacy owned by a user account.
    #[instrument(skip_all)]
    pub async fn get_by_owner(
        pool: &PgPool,
        owner_user_id: Uuid,
    ) -> Result<Option<Pharmacy>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Option<Pharmacy>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT pharmacy_id, owner_user_id, name, address, lat, lng
            FROM pharmacies
            WHERE owner_user_id = $1
            "#,
        )
        .bind(owner_user_id)
        .fetch_optional(pool)
        .await;

        Ok(observe("get_pharmacy_by_owner", start, query_result)?)
    }
}
