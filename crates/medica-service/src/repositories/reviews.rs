//! Reviews repository.

use super::observe;
use crate::errors::{is_unique_violation, MedicaError};
use crate::models::Review;
use sqlx::{PgConnection, PgPool};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// Repository for doctor reviews.
pub struct ReviewsRepository;

impl ReviewsRepository {
    /// Whether the patient has already reviewed the doctor.
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn exists_for_pair(
        conn: &mut PgConnection,
        doctor_id: Uuid,
        patient_id: Uuid,
    ) -> Result<bool, MedicaError> {
        let start = Instant::now();

        let query_result: Result<(bool,), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM reviews WHERE doctor_id = $1 AND patient_id = $2
            )
            "#,
        )
        .bind(doctor_id)
        .bind(patient_id)
        .fetch_one(conn)
        .await;

        let (exists,) = observe("review_exists", start, query_result)?;
        Ok(exists)
    }

    /// Insert a review.
    ///
    /// # Errors
    ///
    /// `MedicaError::Conflict` if the pair already has a review.
    #[instrument(skip_all, fields(doctor_id = %doctor_id, rating = rating))]
    pub async fn insert(
        conn: &mut PgConnection,
        doctor_id: Uuid,
        patient_id: Uuid,
        rating: i32,
        comment: &str,
    ) -> Result<Review, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Review, sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO reviews (doctor_id, patient_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING review_id, doctor_id, patient_id, rating, comment, created_at
            "#,
        )
        .bind(doctor_id)
        .bind(patient_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(conn)
        .await;

        match observe("insert_review", start, query_result) {
            Ok(review) => Ok(review),
            Err(e) if is_unique_violation(&e) => Err(MedicaError::Conflict(
                "You have already reviewed this doctor.".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Mean rating over all of a doctor's reviews; 0.0 when there are none.
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn average_for_doctor(
        conn: &mut PgConnection,
        doctor_id: Uuid,
    ) -> Result<f64, MedicaError> {
        let start = Instant::now();

        let query_result: Result<(Option<f64>,), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT AVG(rating)::DOUBLE PRECISION
            FROM reviews
            WHERE doctor_id = $1
            "#,
        )
        .bind(doctor_id)
        .fetch_one(conn)
        .await;

        let (average,) = observe("average_rating", start, query_result)?;
        Ok(average.unwrap_or(0.0))
    }

    /// A doctor's reviews, newest first.
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn list_for_doctor(
        pool: &PgPool,
        doctor_id: Uuid,
    ) -> Result<Vec<Review>, MedicaError> {
        let start = Instant::now();

        let query_result: Result<Vec<Review>, sqlx::Error> = sqlx::query_as(
            r#"
            SELECT review_id, doctor_id, patient_id, rating, comment, created_at
            FROM reviews
            WHERE doctor_id = $1
            ORDER BY created_at DESC, review_id
            "#,
        )
        .bind(doctor_id)
        .fetch_all(pool)
        .await;

        Ok(observe("list_reviews", start, query_result)?)
    }
}
