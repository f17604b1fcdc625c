//! Doctor availability slots.

use crate::errors::MedicaError;
use crate::models::Availability;
use crate::repositories::{AvailabilityRepository, DoctorsRepository};
use chrono::NaiveTime;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Accepted day names, in week order.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Canonical weekday name for `day`, ignoring case and surrounding space.
pub fn normalize_day(day: &str) -> Result<&'static str, MedicaError> {
    let day = day.trim();
    WEEKDAYS
        .iter()
        .find(|name| name.eq_ignore_ascii_case(day))
        .copied()
        .ok_or_else(|| MedicaError::Validation(format!("Unknown day '{}'.", day)))
}

/// Parse an `HH:MM` time.
pub fn parse_time(value: &str) -> Result<NaiveTime, MedicaError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| MedicaError::Validation("Invalid time format. Use HH:MM.".to_string()))
}

/// Whether two half-open intervals `[start, end)` intersect. Touching
/// intervals do not overlap.
pub fn overlaps(start: NaiveTime, end: NaiveTime, other_start: NaiveTime, other_end: NaiveTime) -> bool {
    start < other_end && end > other_start
}

/// Service for managing a doctor's weekly slots.
pub struct AvailabilityService;

impl AvailabilityService {
    /// Add a slot for the doctor owned by `user_id`.
    ///
    /// # Errors
    ///
    /// - `MedicaError::Validation` - Unknown day, bad time format, or start not before end
    /// - `MedicaError::NotFound` - The user has no doctor profile
    /// - `MedicaError::Conflict` - The slot overlaps an existing one on the same day
    #[instrument(skip_all, fields(day = %day))]
    pub async fn add_slot(
        pool: &PgPool,
        user_id: Uuid,
        day: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<Availability, MedicaError> {
        let day = normalize_day(day)?;
        let start = parse_time(start_time)?;
        let end = parse_time(end_time)?;

        if start >= end {
            return Err(MedicaError::Validation(
                "End time must be after start time.".to_string(),
            ));
        }

        let doctor = DoctorsRepository::get_by_user_id(pool, user_id)
            .await?
            .ok_or_else(|| MedicaError::NotFound("Doctor profile not found".to_string()))?;

        let mut tx = pool.begin().await?;

        // Serializes concurrent slot additions for the same doctor.
        DoctorsRepository::lock_for_update(&mut tx, doctor.doctor_id).await?;

        let existing = AvailabilityRepository::list_for_day(&mut tx, doctor.doctor_id, day).await?;
        if let Some(clash) = existing
            .iter()
            .find(|slot| overlaps(start, end, slot.start_time, slot.end_time))
        {
            tracing::debug!(
                target: "medica.service.availability",
                doctor_id = %doctor.doctor_id,
                clashing_slot = %clash.availability_id,
                "Availability overlaps existing slot"
            );
            return Err(MedicaError::Conflict(
                "This time slot overlaps with an existing availability.".to_string(),
            ));
        }

        let slot =
            AvailabilityRepository::insert(&mut tx, doctor.doctor_id, day, start, end).await?;

        tx.commit().await?;

        tracing::info!(
            target: "medica.service.availability",
            doctor_id = %doctor.doctor_id,
            availability_id = %slot.availability_id,
            "Availability added"
        );

        Ok(slot)
    }

    /// All slots of the doctor owned by `user_id`.
    #[instrument(skip_all)]
    pub async fn list_slots(pool: &PgPool, user_id: Uuid) -> Result<Vec<Availability>, MedicaError> {
        let doctor = DoctorsRepository::get_by_user_id(pool, user_id)
            .await?
            .ok_or_else(|| MedicaError::NotFound("Doctor profile not found".to_string()))?;

        AvailabilityRepository::list_for_doctor(pool, doctor.doctor_id).await
    }
}
