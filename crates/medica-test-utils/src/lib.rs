//! # Medica Test Utilities
//!
//! Shared test utilities for the Medica service.
//!
//! This crate provides:
//! - Server test harness (`TestMedicaServer` for E2E tests)
//! - Signed test tokens (`TestTokenBuilder`)
//! - Database fixtures for doctors, pharmacies, medicines, stock and reviews
//! - Fixed test IDs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medica_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_example(pool: PgPool) -> Result<()> {
//!     let server = TestMedicaServer::spawn(pool).await?;
//!     let token = TestTokenBuilder::new().patient(TEST_PATIENT_AMIRA).vip().sign();
//!
//!     let response = reqwest::Client::new()
//!         .get(format!("{}/api/v1/doctors", server.url()))
//!         .bearer_auth(token)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

pub use fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
