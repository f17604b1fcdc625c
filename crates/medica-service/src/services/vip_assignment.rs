//! VIP Assignment Selector.
//!
//! Creates a VIP consult and fans it out to a random subset of qualified
//! doctors.
//!
//! # Flow
//!
//! All steps share one `REPEATABLE READ` transaction:
//! 1. Insert the consult as `pending`
//! 2. Pool A: doctors rated above 3.0 whose specialty contains the request's
//! 3. If pool A has fewer than 5 doctors, use pool B: every doctor rated above 3.0
//! 4. Sample up to 5 doctors uniformly without replacement
//! 5. Insert one `pending` assignment per sampled doctor
//!
//! An empty pool is not an error: the consult is kept with no assignments.

use crate::errors::MedicaError;
use crate::models::{NewConsult, VipConsult};
use crate::observability::metrics;
use crate::repositories::{DoctorsRepository, VipConsultsRepository};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

/// Maximum number of doctors a consult is offered to.
pub const MAX_ASSIGNED_DOCTORS: usize = 5;

/// Doctors must be rated strictly above this to receive VIP consults.
pub const QUALIFYING_RATING_THRESHOLD: f64 = 3.0;

/// Longest accepted consult specialty (`vip_consults.specialty`).
pub const MAX_SPECIALTY_CHARS: usize = 100;

/// Which candidate pool a consult was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatePool {
    /// Qualified doctors matching the requested specialty.
    Specialty,
    /// All qualified doctors, used when too few match the specialty.
    Fallback,
}

impl CandidatePool {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidatePool::Specialty => "specialty",
            CandidatePool::Fallback => "fallback",
        }
    }
}

/// Outcome of consult creation.
#[derive(Debug, Clone)]
pub struct ConsultCreated {
    pub consult: VipConsult,
    pub assigned_doctor_ids: Vec<Uuid>,
    pub pool: CandidatePool,
}

/// Pick up to `count` distinct doctors uniformly at random.
///
/// Returns the whole pool (in random order) when it has `count` or fewer
/// entries.
pub fn select_doctors<R: Rng + ?Sized>(pool: &[Uuid], count: usize, rng: &mut R) -> Vec<Uuid> {
    pool.choose_multiple(rng, count).copied().collect()
}

/// Service for VIP consult creation and fan-out.
pub struct VipAssignmentService;

impl VipAssignmentService {
    /// Create a consult and assign it to up to 5 qualified doctors.
    ///
    /// # Errors
    ///
    /// - `MedicaError::Database` - Database operation failed; nothing is
    ///   persisted
    #[instrument(skip_all, fields(specialty = %new_consult.specialty))]
    pub async fn create_consult_with_assignments(
        pool: &PgPool,
        patient_id: Uuid,
        new_consult: NewConsult,
    ) -> Result<ConsultCreated, MedicaError> {
        let start = Instant::now();

        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let consult = VipConsultsRepository::insert_consult(&mut tx, patient_id, &new_consult).await?;

        let specialty_pool = DoctorsRepository::list_qualifying_ids(
            &mut tx,
            QUALIFYING_RATING_THRESHOLD,
            Some(&new_consult.specialty),
        )
        .await?;

        let (candidates, candidate_pool) = if specialty_pool.len() >= MAX_ASSIGNED_DOCTORS {
            (specialty_pool, CandidatePool::Specialty)
        } else {
            tracing::debug!(
                target: "medica.service.vip_assignment",
                specialty_matches = specialty_pool.len(),
                "Too few specialty matches, widening to all qualified doctors"
            );
            let all_qualified =
                DoctorsRepository::list_qualifying_ids(&mut tx, QUALIFYING_RATING_THRESHOLD, None)
                    .await?;
            (all_qualified, CandidatePool::Fallback)
        };

        let selected = {
            let mut rng = StdRng::from_entropy();
            select_doctors(&candidates, MAX_ASSIGNED_DOCTORS, &mut rng)
        };

        VipConsultsRepository::insert_assignments(&mut tx, consult.consult_id, &selected).await?;

        tx.commit().await?;

        if selected.is_empty() {
            tracing::warn!(
                target: "medica.service.vip_assignment",
                consult_id = %consult.consult_id,
                "No qualified doctors available, consult created without assignments"
            );
            metrics::record_vip_assignment_empty();
        } else {
            tracing::info!(
                target: "medica.service.vip_assignment",
                consult_id = %consult.consult_id,
                pool = candidate_pool.as_str(),
                candidates = candidates.len(),
                assigned = selected.len(),
                "VIP consult assigned"
            );
        }
        metrics::record_vip_assignment(candidate_pool.as_str(), selected.len(), start.elapsed());

        Ok(ConsultCreated {
            consult,
            assigned_doctor_ids: selected,
            pool: candidate_pool,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(n: u128) -> Vec<Uuid> {
        (1..=n).map(Uuid::from_u128).collect()
    }

    #[test]
    fn test_select_from_empty_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(select_doctors(&[], MAX_ASSIGNED_DOCTORS, &mut rng).is_empty());
    }

    #[test]
    fn test_select_small_pool_returns_everyone() {
        let pool = ids(3);
        let mut rng = StdRng::seed_from_u64(7);

        let selected: HashSet<Uuid> = select_doctors(&pool, MAX_ASSIGNED_DOCTORS, &mut rng)
            .into_iter()
            .collect();

        assert_eq!(selected, pool.into_iter().collect());
    }

    #[test]
    fn test_select_caps_at_five_distinct_members() {
        let pool = ids(20);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let selected = select_doctors(&pool, MAX_ASSIGNED_DOCTORS, &mut rng);
            assert_eq!(selected.len(), MAX_ASSIGNED_DOCTORS);

            let distinct: HashSet<&Uuid> = selected.iter().collect();
            assert_eq!(distinct.len(), MAX_ASSIGNED_DOCTORS);
            assert!(selected.iter().all(|id| pool.contains(id)));
        }
    }

    #[test]
    fn test_select_is_deterministic_for_a_seed() {
        let pool = ids(12);

        let a = select_doctors(&pool, 5, &mut StdRng::seed_from_u64(99));
        let b = select_doctors(&pool, 5, &mut StdRng::seed_from_u64(99));

        assert_eq!(a, b);
    }

    #[test]
    fn test_select_reaches_every_member_over_many_draws() {
        let pool = ids(8);
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = HashSet::new();

        for _ in 0..200 {
            seen.extend(select_doctors(&pool, MAX_ASSIGNED_DOCTORS, &mut rng));
        }

        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn test_candidate_pool_labels() {
        assert_eq!(CandidatePool::Specialty.as_str(), "specialty");
        assert_eq!(CandidatePool::Fallback.as_str(), "fallback");
    }
}
