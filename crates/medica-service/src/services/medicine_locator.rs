//! Medicine Locator.
//!
//! Resolves a medicine by name, finds pharmacies holding it, and ranks them
//! by great-circle distance from the requester.
//!
//! # Flow
//!
//! 1. Trim and validate the name
//! 2. Resolve the medicine (exact match, else shortest containing name)
//! 3. Load stock rows with a positive quantity
//! 4. Batch-load the pharmacies those rows reference
//! 5. Compute distances, sort nulls last, keep the first 10

use crate::errors::MedicaError;
use crate::models::{
    MedicineSearchResponse, MedicineSummary, Pharmacy, PharmacyMatch, StockEntry,
};
use crate::observability::metrics;
use crate::repositories::{MedicinesRepository, PharmaciesRepository, StocksRepository};
use crate::services::geo::{haversine_km, round2};
use common::types::GeoPoint;
use serde_json::Value;
use sqlx::PgPool;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// Maximum number of pharmacies returned by a search.
pub const MAX_LOCATOR_RESULTS: usize = 10;

/// Where the requester is, as far as the request tells us.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequesterLocation {
    /// Both coordinates present and numeric.
    At(GeoPoint),
    /// Both coordinates present but at least one is not a number. Every
    /// result gets a null distance.
    Invalid,
    /// A coordinate is missing. Distances are measured from the configured
    /// fallback point.
    Absent,
}

impl RequesterLocation {
    /// Interpret raw `lat`/`lng` JSON values. JSON `null` counts as missing;
    /// numeric strings are accepted.
    pub fn from_json(lat: Option<&Value>, lng: Option<&Value>) -> Self {
        let lat = lat.filter(|v| !v.is_null());
        let lng = lng.filter(|v| !v.is_null());

        match (lat, lng) {
            (Some(lat), Some(lng)) => match (parse_coordinate(lat), parse_coordinate(lng)) {
                (Some(lat), Some(lng)) => RequesterLocation::At(GeoPoint::new(lat, lng)),
                _ => RequesterLocation::Invalid,
            },
            _ => RequesterLocation::Absent,
        }
    }

    /// Label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RequesterLocation::At(_) => "provided",
            RequesterLocation::Invalid => "invalid",
            RequesterLocation::Absent => "absent",
        }
    }
}

fn parse_coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Build the ranked result list from stock rows and their pharmacies.
///
/// Stock rows whose pharmacy is missing are skipped. The sort is stable, so
/// rows with equal (rounded) distance keep stock order.
pub fn rank_pharmacies(
    stock: &[StockEntry],
    pharmacies: &[Pharmacy],
    location: RequesterLocation,
    fallback: GeoPoint,
) -> Vec<PharmacyMatch> {
    let by_id: HashMap<Uuid, &Pharmacy> = pharmacies.iter().map(|p| (p.pharmacy_id, p)).collect();

    let mut results: Vec<PharmacyMatch> = stock
        .iter()
        .filter_map(|entry| {
            let Some(pharmacy) = by_id.get(&entry.pharmacy_id) else {
                tracing::warn!(
                    target: "medica.service.locator",
                    pharmacy_id = %entry.pharmacy_id,
                    "Stock row references a missing pharmacy, skipping"
                );
                return None;
            };

            let distance = match location {
                RequesterLocation::At(origin) => Some(haversine_km(origin, pharmacy.location())),
                RequesterLocation::Invalid => None,
                RequesterLocation::Absent => Some(haversine_km(fallback, pharmacy.location())),
            };

            Some(PharmacyMatch {
                pharmacy_id: pharmacy.pharmacy_id,
                pharmacy_name: pharmacy.name.clone(),
                address: pharmacy.address.clone(),
                quantity: entry.quantity,
                distance: distance.map(round2),
                lat: pharmacy.lat,
                lng: pharmacy.lng,
            })
        })
        .collect();

    results.sort_by(|a, b| compare_distance(a.distance, b.distance));
    results.truncate(MAX_LOCATOR_RESULTS);
    results
}

/// Ascending, with `None` after every known distance.
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Service for medicine availability search.
pub struct MedicineLocatorService;

impl MedicineLocatorService {
    /// Search for a medicine and rank the pharmacies that stock it.
    ///
    /// # Errors
    ///
    /// - `MedicaError::Validation` - Empty medicine name
    /// - `MedicaError::NotFound` - No medicine name contains the input
    /// - `MedicaError::OutOfStock` - The medicine has no positive stock
    /// - `MedicaError::Database` - Database operation failed
    #[instrument(skip_all, fields(location = location.kind()))]
    pub async fn locate(
        pool: &PgPool,
        medicine_name: &str,
        location: RequesterLocation,
        fallback: GeoPoint,
    ) -> Result<MedicineSearchResponse, MedicaError> {
        let start = Instant::now();

        let result = Self::search(pool, medicine_name.trim(), location, fallback).await;

        let (outcome, count) = match &result {
            Ok(response) => ("found", response.pharmacies.len()),
            Err(MedicaError::Validation(_)) => ("invalid", 0),
            Err(MedicaError::NotFound(_)) => ("not_found", 0),
            Err(MedicaError::OutOfStock(_)) => ("out_of_stock", 0),
            Err(_) => ("error", 0),
        };
        metrics::record_medicine_search(outcome, count, start.elapsed());

        result
    }

    async fn search(
        pool: &PgPool,
        medicine_name: &str,
        location: RequesterLocation,
        fallback: GeoPoint,
    ) -> Result<MedicineSearchResponse, MedicaError> {
        if medicine_name.is_empty() {
            return Err(MedicaError::Validation(
                "Please enter a medicine name.".to_string(),
            ));
        }

        let medicine = MedicinesRepository::find_best_match(pool, medicine_name)
            .await?
            .ok_or_else(|| {
                MedicaError::NotFound(format!(
                    "Medicine \"{}\" not found in our database. Please try another name.",
                    medicine_name
                ))
            })?;

        let stock = StocksRepository::list_available(pool, medicine.medicine_id).await?;
        if stock.is_empty() {
            tracing::debug!(
                target: "medica.service.locator",
                medicine_id = %medicine.medicine_id,
                "Medicine matched but has no stock"
            );
            return Err(MedicaError::OutOfStock(format!(
                "Medicine \"{}\" is not currently in stock at any nearby pharmacy.",
                medicine_name
            )));
        }

        let pharmacy_ids: Vec<Uuid> = stock.iter().map(|s| s.pharmacy_id).collect();
        let pharmacies = PharmaciesRepository::get_by_ids(pool, &pharmacy_ids).await?;

        let ranked = rank_pharmacies(&stock, &pharmacies, location, fallback);

        tracing::debug!(
            target: "medica.service.locator",
            medicine_id = %medicine.medicine_id,
            stock_rows = stock.len(),
            returned = ranked.len(),
            "Medicine search completed"
        );

        Ok(MedicineSearchResponse {
            medicine: MedicineSummary::from(medicine),
            pharmacies: ranked,
        })
    }
}
