//! Doctor directory and profile pages.

use crate::errors::MedicaError;
use crate::models::{DoctorCard, DoctorDetailResponse, DoctorProfile, ReviewView};
use crate::repositories::{DoctorsRepository, ReviewsRepository};
use crate::services::geo::round1;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Characters of bio shown on a directory card.
pub const BIO_EXCERPT_CHARS: usize = 100;

/// First `BIO_EXCERPT_CHARS` characters of `bio`, with "..." appended when
/// truncated.
pub fn bio_excerpt(bio: &str) -> String {
    if bio.chars().count() <= BIO_EXCERPT_CHARS {
        return bio.to_string();
    }
    let mut excerpt: String = bio.chars().take(BIO_EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

/// Parse the `min_rating` query parameter. Blank or unparseable values mean
/// no filter.
pub fn parse_min_rating(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl From<DoctorProfile> for DoctorCard {
    fn from(doctor: DoctorProfile) -> Self {
        Self {
            doctor_id: doctor.doctor_id,
            bio_excerpt: bio_excerpt(&doctor.bio),
            display_name: doctor.display_name,
            specialty: doctor.specialty,
            address: doctor.address,
            average_rating: round1(doctor.average_rating),
        }
    }
}

/// Service for public doctor listings.
pub struct DoctorDirectoryService;

impl DoctorDirectoryService {
    /// Doctors matching the optional filters, best rated first.
    #[instrument(skip_all)]
    pub async fn list(
        pool: &PgPool,
        specialty: Option<&str>,
        min_rating: Option<f64>,
    ) -> Result<Vec<DoctorCard>, MedicaError> {
        let specialty = specialty.map(str::trim).filter(|s| !s.is_empty());

        let doctors = DoctorsRepository::list(pool, specialty, min_rating).await?;
        Ok(doctors.into_iter().map(DoctorCard::from).collect())
    }

    /// A doctor's profile with reviews, newest first.
    ///
    /// # Errors
    ///
    /// `MedicaError::NotFound` for an unknown doctor.
    #[instrument(skip_all, fields(doctor_id = %doctor_id))]
    pub async fn detail(pool: &PgPool, doctor_id: Uuid) -> Result<DoctorDetailResponse, MedicaError> {
        let doctor = DoctorsRepository::get_by_id(pool, doctor_id)
            .await?
            .ok_or_else(|| MedicaError::NotFound("Doctor not found".to_string()))?;

        let reviews = ReviewsRepository::list_for_doctor(pool, doctor_id).await?;

        Ok(DoctorDetailResponse {
            doctor_id: doctor.doctor_id,
            display_name: doctor.display_name,
            specialty: doctor.specialty,
            address: doctor.address,
            phone: doctor.phone,
            bio: doctor.bio,
            average_rating: round1(doctor.average_rating),
            reviews: reviews.into_iter().map(ReviewView::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bio_excerpt_short_bio_unchanged() {
        assert_eq!(bio_excerpt("Cardiologist."), "Cardiologist.");
        assert_eq!(bio_excerpt(""), "");
    }

    #[test]
    fn test_bio_excerpt_truncates_long_bio() {
        let bio = "a".repeat(150);
        let excerpt = bio_excerpt(&bio);
        assert_eq!(excerpt.len(), 103);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_bio_excerpt_counts_characters_not_bytes() {
        let bio = "é".repeat(101);
        let excerpt = bio_excerpt(&bio);
        assert_eq!(excerpt.chars().count(), 103);
    }

    #[test]
    fn test_parse_min_rating() {
        assert_eq!(parse_min_rating(Some("4")), Some(4.0));
        assert_eq!(parse_min_rating(Some(" 3.5 ")), Some(3.5));
        assert_eq!(parse_min_rating(Some("")), None);
        assert_eq!(parse_min_rating(Some("high")), None);
        assert_eq!(parse_min_rating(None), None);
    }

    #[test]
    fn test_card_rounds_rating() {
        let card = DoctorCard::from(DoctorProfile {
            doctor_id: Uuid::nil(),
            user_id: Uuid::nil(),
            display_name: "Dr. Ben Ali".to_string(),
            specialty: "Cardiology".to_string(),
            address: String::new(),
            phone: String::new(),
            bio: "x".repeat(120),
            average_rating: 4.666_666,
        });

        assert_eq!(card.average_rating, 4.7);
        assert!(card.bio_excerpt.ends_with("..."));
    }
}
