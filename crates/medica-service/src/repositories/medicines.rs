//! Medicines repository.

use super::{contains_pattern, observe};
use crate::errors::MedicaError;
use crate::models::Medicine;
use sqlx::{PgConnection, PgPool};
use std::time::Instant;
use tracing::instrument;

/// Repository for medicine catalogue operations.
pub struct MedicinesRepository;

impl MedicinesRepository {
    /// Find the best medicine whose name contains `term`, ignoring case.
    ///
    /// Ranking: an exact case-insensitive match first, then the shortest
    /// name, then alphabetical order. `%`, `_` and `\` in `term` match
    /// literally.
    #[instrument(skip_all)]
    pub async fn find_best_match(
        pool: &PgPool,
        term: &str,
    ) -> Result<Option<Medicine>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Option<Medicine>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT medicine_id, name, description
            FROM medicines
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY (LOWER(name) = LOWER($2)) DESC, LENGTH(name) ASC, name ASC
            LIMIT 1
            "#,
        )
        .bind(contains_pattern(term))
        .bind(term)
        .fetch_optional(pool)
        .await;

        Ok(observe("find_medicine", start, query_result)?)
    }

    /// Look up a medicine by name, ignoring case.
    #[instrument(skip_all)]
    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Medicine>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Option<Medicine>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT medicine_id, name, description
            FROM medicines
            WHERE LOWER(name) = LOWER($1)
            ORDER BY name
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(conn)
        .await;

        Ok(observe("find_medicine_by_name", start, query_result)?)
    }

    /// Insert a medicine, or return the existing row when the name is taken.
    ///
    /// The boolean is `true` when a new row was created.
    #[instrument(skip_all)]
    pub async fn insert_or_get(
        conn: &mut PgConnection,
        name: &str,
        description: &str,
    ) -> Result<(Medicine, bool), MedicaError> {
        let start = Instant::now();

        // The no-op update makes RETURNING yield the existing row on conflict;
        // xmax is 0 only for freshly inserted tuples.
        let query_result: Result<InsertedMedicineRow, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO medicines (name, description)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING medicine_id, name, description, (xmax = 0) AS inserted
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(conn)
        .await;

        let row = observe("insert_medicine", start, query_result)?;
        Ok((
            Medicine {
                medicine_id: row.medicine_id,
                name: row.name,
                description: row.description,
            },
            row.inserted,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct InsertedMedicineRow {
    medicine_id: uuid::Uuid,
    name: String,
    description: String,
    inserted: bool,
}
