//! Authentication module for the Medica service.
//!
//! Tokens are issued by the external identity provider and signed with a
//! shared HS256 secret. This service only verifies them.
//!
//! # Components
//!
//! - `jwt` - JWT validation into `UserClaims`

pub mod jwt;

pub use jwt::JwtValidator;
