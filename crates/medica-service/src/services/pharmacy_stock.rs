//! Pharmacy stock management.

use crate::errors::MedicaError;
use crate::models::UpdateStockResponse;
use crate::repositories::{MedicinesRepository, PharmaciesRepository, StocksRepository};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Description given to medicines first introduced by a pharmacy.
pub const PHARMACY_ADDED_DESCRIPTION: &str = "Added by pharmacy";

/// Longest accepted medicine name (`medicines.name`).
pub const MAX_MEDICINE_NAME_CHARS: usize = 200;

/// Service for pharmacy-owned stock updates.
pub struct PharmacyStockService;

impl PharmacyStockService {
    /// Set the quantity of a medicine at the caller's pharmacy.
    ///
    /// The medicine is looked up by name ignoring case and created when
    /// unknown.
    ///
    /// # Errors
    ///
    /// - `MedicaError::Validation` - Empty or overlong name, or quantity
    ///   outside `0..=i32::MAX`
    /// - `MedicaError::NotFound` - The user owns no pharmacy
    #[instrument(skip_all, fields(quantity = quantity))]
    pub async fn update_stock(
        pool: &PgPool,
        owner_user_id: Uuid,
        medicine_name: &str,
        quantity: i64,
    ) -> Result<UpdateStockResponse, MedicaError> {
        let medicine_name = medicine_name.trim();
        if medicine_name.is_empty() {
            return Err(MedicaError::Validation(
                "Please enter a medicine name.".to_string(),
            ));
        }
        if medicine_name.chars().count() > MAX_MEDICINE_NAME_CHARS {
            return Err(MedicaError::Validation(format!(
                "Medicine name must be at most {MAX_MEDICINE_NAME_CHARS} characters."
            )));
        }

        let quantity = i32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 0)
            .ok_or_else(|| {
                MedicaError::Validation("Quantity must be a non-negative integer.".to_string())
            })?;

        let pharmacy = PharmaciesRepository::get_by_owner(pool, owner_user_id)
            .await?
            .ok_or_else(|| MedicaError::NotFound("Pharmacy not found".to_string()))?;

        let mut tx = pool.begin().await?;

        let (medicine, medicine_created) =
            match MedicinesRepository::find_by_name(&mut tx, medicine_name).await? {
                Some(existing) => (existing, false),
                None => {
                    MedicinesRepository::insert_or_get(
                        &mut tx,
                        medicine_name,
                        PHARMACY_ADDED_DESCRIPTION,
                    )
                    .await?
                }
            };

        let entry =
            StocksRepository::upsert(&mut tx, pharmacy.pharmacy_id, medicine.medicine_id, quantity)
                .await?;

        tx.commit().await?;

        tracing::info!(
            target: "medica.service.pharmacy_stock",
            pharmacy_id = %pharmacy.pharmacy_id,
            medicine_id = %medicine.medicine_id,
            quantity = entry.quantity,
            medicine_created = medicine_created,
            "Stock updated"
        );

        Ok(UpdateStockResponse {
            pharmacy_id: entry.pharmacy_id,
            medicine_id: entry.medicine_id,
            medicine_name: medicine.name,
            quantity: entry.quantity,
            medicine_created,
        })
    }
}
