//! Observability module for the Medica service.
//!
//! Provides metrics definitions and instrumentation helpers.

pub mod metrics;
