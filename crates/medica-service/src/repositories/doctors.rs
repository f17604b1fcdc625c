//! Doctor profiles repository.

use super::{contains_pattern, observe};
use crate::errors::MedicaError;
use crate::models::DoctorProfile;
use sqlx::{PgConnection, PgPool};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

const DOCTOR_COLUMNS: &str =
    "doctor_id, user_id, display_name, specialty, address, phone, bio, average_rating";

/// Repository for doctor profile operations.
pub struct DoctorsRepository;

impl DoctorsRepository {
    /// Get a doctor profile by ID.
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn get_by_id(
        pool: &PgPool,
        doctor_id: Uuid,
    ) -> Result<Option<DoctorProfile>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Option<DoctorProfile>, sqlx::Error> = sqlx::query_as(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctor_profiles WHERE doctor_id = $1"
        ))
        .bind(doctor_id)
        .fetch_optional(pool)
        .await;

        Ok(observe("get_doctor", start, query_result)?)
    }

    /// Get the doctor profile belonging to a user account.
    #[instrument(skip_all)]
    pub async fn get_by_user_id(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<DoctorProfile>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Option<DoctorProfile>, sqlx::Error> = sqlx::query_as(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctor_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await;

        Ok(observe("get_doctor_by_user", start, query_result)?)
    }

    /// Lock a doctor row for the rest of the transaction.
    ///
    /// Serializes read-modify-write sequences on data owned by the doctor
    /// (average rating, availability slots).
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        doctor_id: Uuid,
    ) -> Result<Option<DoctorProfile>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Option<DoctorProfile>, sqlx::Error> = sqlx::query_as(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctor_profiles WHERE doctor_id = $1 FOR UPDATE"
        ))
        .bind(doctor_id)
        .fetch_optional(conn)
        .await;

        Ok(observe("lock_doctor", start, query_result)?)
    }

    /// Directory listing, best rated first.
    ///
    /// `specialty` is a case-insensitive substring filter; `min_rating` is
    /// inclusive.
    #[instrument(skip_all)]
    pub async fn list(
        pool: &PgPool,
        specialty: Option<&str>,
        min_rating: Option<f64>,
    ) -> Result<Vec<DoctorProfile>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<DoctorProfile>, sqlx::Error> = sqlx::query_as(&format!(
            r#"
            SELECT {DOCTOR_COLUMNS}
            FROM doctor_profiles
            WHERE ($1::TEXT IS NULL OR specialty ILIKE $1 ESCAPE '\')
              AND ($2::DOUBLE PRECISION IS NULL OR average_rating >= $2)
            ORDER BY average_rating DESC, display_name ASC
            "#
        ))
        .bind(specialty.map(contains_pattern))
        .bind(min_rating)
        .fetch_all(pool)
        .await;

        Ok(observe("list_doctors", start, query_result)?)
    }

    /// Distinct specialties, sorted.
    #[instrument(skip_all)]
    pub async fn list_specialties(pool: &PgPool) -> Result<Vec<String>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<(String,)>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT DISTINCT specialty
            FROM doctor_profiles
            ORDER BY specialty
            "#,
        )
        .fetch_all(pool)
        .await;

        let rows = observe("list_specialties", start, query_result)?;
        Ok(rows.into_iter().map(|(specialty,)| specialty).collect())
    }

    /// IDs of doctors rated strictly above `min_rating_exclusive`,
    /// optionally restricted to a specialty substring.
    #[instrument(skip_all, fields(has_specialty = specialty.is_some()))]
    pub async fn list_qualifying_ids(
        conn: &mut PgConnection,
        min_rating_exclusive: f64,
        specialty: Option<&str>,
    ) -> Result<Vec<Uuid>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<(Uuid,)>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT doctor_id
            FROM doctor_profiles
            WHERE average_rating > $1
              AND ($2::TEXT IS NULL OR specialty ILIKE $2 ESCAPE '\')
            ORDER BY doctor_id
            "#,
        )
        .bind(min_rating_exclusive)
        .bind(specialty.map(contains_pattern))
        .fetch_all(conn)
        .await;

        let rows = observe("list_qualifying_doctors", start, query_result)?;
        Ok(rows.into_iter().map(|(doctor_id,)| doctor_id).collect())
    }

    /// Persist a recomputed average rating.
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn set_average_rating(
        conn: &mut PgConnection,
        doctor_id: Uuid,
        average_rating: f64,
    ) -> Result<(), MedicaError> {
        let start = Instant::now();

        let query_result = sqlx::query(
            r#"
            UPDATE doctor_profiles
            SET average_rating = $2
            WHERE doctor_id = $1
            "#,
        )
        .bind(doctor_id)
        .bind(average_rating)
        .execute(conn)
        .await;

        observe("set_average_rating", start, query_result)?;
        Ok(())
    }
}
