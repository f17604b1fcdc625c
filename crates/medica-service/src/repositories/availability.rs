//! Availability slots repository.

use super::observe;
use crate::errors::MedicaError;
use crate::models::Availability;
use chrono::NaiveTime;
use sqlx::{PgConnection, PgPool};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// Repository for weekly availability slots.
pub struct AvailabilityRepository;

impl AvailabilityRepository {
    /// Slots of one doctor on one day.
    #[instrument(skip_all, fields(doctor_id = %doctor_id, day = %day))]
    pub async fn list_for_day(
        conn: &mut PgConnection,
        doctor_id: Uuid,
        day: &str,
    ) -> Result<Vec<Availability>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<Availability>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT availability_id, doctor_id, day, start_time, end_time
            FROM availabilities
            WHERE doctor_id = $1 AND day = $2
            ORDER BY start_time
            "#,
        )
        .bind(doctor_id)
        .bind(day)
        .fetch_all(conn)
        .await;

        Ok(observe("list_availability_for_day", start, query_result)?)
    }

    /// Insert a slot.
    #[instrument(skip_all, fields(doctor_id = %doctor_id, day = %day))]
    pub async fn insert(
        conn: &mut PgConnection,
        doctor_id: Uuid,
        day: &str,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Availability, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Availability, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO availabilities (doctor_id, day, start_time, end_time)
            VALUES ($1, $2, $3, $4)
            RETURNING availability_id, doctor_id, day, start_time, end_time
            "#,
        )
        .bind(doctor_id)
        .bind(day)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(conn)
        .await;

        Ok(observe("insert_availability", start, query_result)?)
    }

    /// All slots of a doctor, Monday first, then by start time.
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn list_for_doctor(
        pool: &PgPool,
        doctor_id: Uuid,
    ) -> Result<Vec<Availability>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<Availability>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT availability_id, doctor_id, day, start_time, end_time
            FROM availabilities
            WHERE doctor_id = $1
            ORDER BY array_position(
                ARRAY['Monday','Tuesday','Wednesday','Thursday','Friday','Saturday','Sunday']::VARCHAR[],
                day
            ), start_time
            "#,
        )
        .bind(doctor_id)
        .fetch_all(pool)
        .await;

        Ok(observe("list_availability", start, query_result)?)
    }
}
