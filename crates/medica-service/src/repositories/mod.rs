//! Repository layer for the Medica service.
//!
//! Provides database access following the Handler -> Service -> Repository
//! architecture. Queries are runtime-checked `sqlx` statements with bound
//! parameters; functions that take part in a transaction accept
//! `&mut PgConnection`, the rest take the pool.

use crate::observability::metrics;
use std::time::Instant;

pub mod admin;
pub mod availability;
pub mod doctors;
pub mod medicines;
pub mod pharmacies;
pub mod reviews;
pub mod stocks;
pub mod vip_consults;

pub use admin::AdminRepository;
pub use availability::AvailabilityRepository;
pub use doctors::DoctorsRepository;
pub use medicines::MedicinesRepository;
pub use pharmacies::PharmaciesRepository;
pub use reviews::ReviewsRepository;
pub use stocks::StocksRepository;
pub use vip_consults::VipConsultsRepository;

/// Record query duration and outcome, passing the result through.
fn observe<T>(
    operation: &'static str,
    start: Instant,
    result: Result<T, sqlx::Error>,
) -> Result<T, sqlx::Error> {
    let status = if result.is_ok() { "success" } else { "error" };
    metrics::record_db_query(operation, status, start.elapsed());
    result
}

/// Escape `%`, `_` and `\` so user input matches literally inside a
/// `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Case-insensitive substring pattern for `ILIKE ... ESCAPE '\'`.
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_plain_text_unchanged() {
        assert_eq!(escape_like("Paracetamol"), "Paracetamol");
        assert_eq!(escape_like(""), "");
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("vit_c"), "vit\\_c");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("card"), "%card%");
        assert_eq!(contains_pattern("%"), "%\\%%");
    }
}
