//! Doctor rating aggregation.

use crate::errors::MedicaError;
use crate::models::Review;
use crate::observability::metrics;
use crate::repositories::{DoctorsRepository, ReviewsRepository};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Lowest accepted rating.
pub const MIN_RATING: i64 = 1;

/// Highest accepted rating.
pub const MAX_RATING: i64 = 5;

/// Check a rating is within `MIN_RATING..=MAX_RATING`.
pub fn validate_rating(rating: i64) -> Result<i32, MedicaError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(MedicaError::Validation(format!(
            "Rating must be between {} and {}.",
            MIN_RATING, MAX_RATING
        )));
    }
    i32::try_from(rating).map_err(|_| MedicaError::Internal)
}

/// A stored review and the doctor's recomputed average.
#[derive(Debug, Clone)]
pub struct ReviewSubmitted {
    pub review: Review,
    pub average_rating: f64,
}

/// Service for review submission.
pub struct ReviewService;

impl ReviewService {
    /// Store a patient's review and recompute the doctor's average rating.
    ///
    /// The doctor row is locked for the duration so concurrent reviews of
    /// the same doctor serialize on the recomputation.
    ///
    /// # Errors
    ///
    /// - `MedicaError::Validation` - Rating outside 1..=5
    /// - `MedicaError::NotFound` - Unknown doctor
    /// - `MedicaError::Conflict` - The patient already reviewed this doctor
    /// - `MedicaError::Database` - Database operation failed
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn submit_review(
        pool: &PgPool,
        doctor_id: Uuid,
        patient_id: Uuid,
        rating: i64,
        comment: &str,
    ) -> Result<ReviewSubmitted, MedicaError> {
        let result = Self::submit(pool, doctor_id, patient_id, rating, comment).await;

        let status = match &result {
            Ok(_) => "accepted",
            Err(MedicaError::Conflict(_)) => "duplicate",
            Err(MedicaError::Validation(_)) => "invalid",
            Err(MedicaError::NotFound(_)) => "not_found",
            Err(_) => "error",
        };
        metrics::record_review_submission(status);

        result
    }

    async fn submit(
        pool: &PgPool,
        doctor_id: Uuid,
        patient_id: Uuid,
        rating: i64,
        comment: &str,
    ) -> Result<ReviewSubmitted, MedicaError> {
        let rating = validate_rating(rating)?;

        let mut tx = pool.begin().await?;

        if DoctorsRepository::lock_for_update(&mut tx, doctor_id)
            .await?
            .is_none()
        {
            return Err(MedicaError::NotFound("Doctor not found".to_string()));
        }

        if ReviewsRepository::exists_for_pair(&mut tx, doctor_id, patient_id).await? {
            return Err(MedicaError::Conflict(
                "You have already reviewed this doctor.".to_string(),
            ));
        }

        let review =
            ReviewsRepository::insert(&mut tx, doctor_id, patient_id, rating, comment.trim())
                .await?;

        let average_rating = ReviewsRepository::average_for_doctor(&mut tx, doctor_id).await?;
        DoctorsRepository::set_average_rating(&mut tx, doctor_id, average_rating).await?;

        tx.commit().await?;

        tracing::info!(
            target: "medica.service.reviews",
            doctor_id = %doctor_id,
            rating = rating,
            average_rating = average_rating,
            "Review stored"
        );

        Ok(ReviewSubmitted {
            review,
            average_rating,
        })
    }
}
