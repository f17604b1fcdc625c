//! Pharmacy stock repository.

use super::observe;
use crate::errors::MedicaError;
use crate::models::{StockEntry, StockLine};
use sqlx::{PgConnection, PgPool};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// Repository for `pharmacy_stock` rows.
pub struct StocksRepository;

impl StocksRepository {
    /// Stock rows with a positive quantity for a medicine, ordered by
    /// pharmacy ID.
    #[instrument(skip_all, fields(medicine_id = %medicine_id))]
    pub async fn list_available(
        pool: &PgPool,
        medicine_id: Uuid,
    ) -> Result<Vec<StockEntry>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<StockEntry>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT pharmacy_id, medicine_id, quantity
            FROM pharmacy_stock
            WHERE medicine_id = $1 AND quantity > 0
            ORDER BY pharmacy_id
            "#,
        )
        .bind(medicine_id)
        .fetch_all(pool)
        .await;

        Ok(observe("list_available_stock", start, query_result)?)
    }

    /// Every stock line of a pharmacy, by medicine name.
    #[instrument(skip_all, fields(pharmacy_id = %pharmacy_id))]
    pub async fn list_for_pharmacy(
        pool: &PgPool,
        pharmacy_id: Uuid,
    ) -> Result<Vec<StockLine>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<StockLine>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT s.medicine_id, m.name AS medicine_name, s.quantity
            FROM pharmacy_stock s
            JOIN medicines m ON m.medicine_id = s.medicine_id
            WHERE s.pharmacy_id = $1
            ORDER BY m.name
            "#,
        )
        .bind(pharmacy_id)
        .fetch_all(pool)
        .await;

        Ok(observe("list_pharmacy_stock", start, query_result)?)
    }

    /// Set the quantity for a pharmacy/medicine pair, creating the row if
    /// needed.
    #[instrument(skip_all, fields(pharmacy_id = %pharmacy_id, medicine_id = %medicine_id))]
    pub async fn upsert(
        conn: &mut PgConnection,
        pharmacy_id: Uuid,
        medicine_id: Uuid,
        quantity: i32,
    ) -> Result<StockEntry, MedicaError> {
        let start = Instant::now();

        let query_result: Result<StockEntry, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO pharmacy_stock (pharmacy_id, medicine_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (pharmacy_id, medicine_id) DO UPDATE SET
                quantity = EXCLUDED.quantity,
                updated_at = NOW()
            RETURNING pharmacy_id, medicine_id, quantity
            "#,
        )
        .bind(pharmacy_id)
        .bind(medicine_id)
        .bind(quantity)
        .fetch_one(conn)
        .await;

        Ok(observe("upsert_stock", start, query_result)?)
    }
}
