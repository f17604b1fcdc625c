//! Medica Service Library
//!
//! Core of the Medica healthcare marketplace API:
//!
//! - Medicine Locator: find a medicine and rank stocking pharmacies by distance
//! - VIP consults: fan a paid consultation out to qualified doctors
//! - Doctor reviews with average-rating maintenance
//! - Doctor directory, weekly availability, and pharmacy stock management
//!
//! # Architecture
//!
//! Handler -> Service -> Repository:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - HS256 JWT validation
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication and HTTP metrics middleware
//! - `models` - Domain records and API types
//! - `observability` - Prometheus metrics
//! - `repositories` - PostgreSQL access
//! - `routes` - Axum router setup
//! - `services` - Business logic

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
