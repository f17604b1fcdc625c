//! Fixed test IDs for deterministic tests.
//!
//! These are token subjects. Doctor and pharmacy profiles created by the
//! fixtures get their own generated ids.

use uuid::Uuid;

// Patients (100-199)
pub const TEST_PATIENT_AMIRA: Uuid = Uuid::from_u128(100);
pub const TEST_PATIENT_BRUNO: Uuid = Uuid::from_u128(101);
pub const TEST_PATIENT_CHLOE: Uuid = Uuid::from_u128(102);

// Doctor accounts (200-299)
pub const TEST_DOCTOR_USER_1: Uuid = Uuid::from_u128(200);
pub const TEST_DOCTOR_USER_2: Uuid = Uuid::from_u128(201);

// Pharmacy accounts (300-399)
pub const TEST_PHARMACY_USER_1: Uuid = Uuid::from_u128(300);

// Admins (900-999)
pub const TEST_ADMIN: Uuid = Uuid::from_u128(900);

/// Signing secret shared by the harness config and the token builder.
pub const TEST_JWT_SECRET: &str = "medica-test-secret-do-not-use-in-production";
