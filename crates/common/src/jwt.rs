//! JWT utilities shared across Medica components.
//!
//! Tokens are minted by the external identity provider and verified by the
//! marketplace service. This module holds the pieces both sides agree on:
//! - Size limit checked before any parsing
//! - Clock skew constants for `iat` validation
//! - The user claims structure
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Error messages are generic to prevent information leakage
//! - The `sub` field in `UserClaims` is redacted in Debug output

use crate::types::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Typical user tokens are 200-400 bytes. Anything larger than this is
/// rejected before base64 decoding or signature verification.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default JWT clock skew tolerance (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Maximum allowed JWT clock skew tolerance (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during JWT pre-validation.
///
/// Messages are intentionally identical; details are logged at debug level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

// =============================================================================
// Claims Types
// =============================================================================

/// User token claims.
///
/// # Fields
///
/// - `sub`: user identifier (UUID string)
/// - `exp` / `iat`: Unix epoch seconds
/// - `role`: account role
/// - `is_vip`: paid tier flag, gates VIP consultations
/// - `name`: optional display name
#[derive(Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Subject (user identifier) - redacted in Debug output.
    pub sub: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Account role.
    pub role: Role,

    /// Whether the account is on the VIP tier.
    #[serde(default)]
    pub is_vip: bool,

    /// Display name, if the identity provider shares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl fmt::Debug for UserClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserClaims")
            .field("sub", &"[REDACTED]")
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("role", &self.role)
            .field("is_vip", &self.is_vip)
            .field("name", &self.name)
            .finish()
    }
}

impl UserClaims {
    /// Check whether the token carries the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Reject tokens larger than [`MAX_JWT_SIZE_BYTES`].
///
/// Must be called before decoding.
///
/// # Errors
///
/// Returns `JwtValidationError::TokenTooLarge` when the token is oversized.
pub fn check_token_size(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }
    Ok(())
}

/// Validate the `iat` (issued-at) claim with clock skew tolerance.
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` if the iat timestamp is more than
/// `clock_skew` in the future.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), JwtValidationError> {
    let now = chrono::Utc::now().timestamp();
    validate_iat_at(iat, clock_skew, now)
}

/// Deterministic `iat` validation against an explicit `now` timestamp.
pub(crate) fn validate_iat_at(
    iat: i64,
    clock_skew: Duration,
    now: i64,
) -> Result<(), JwtValidationError> {
    // clock_skew is bounded to MAX_CLOCK_SKEW by configuration
    #[allow(clippy::cast_possible_wrap)]
    let clock_skew_secs = clock_skew.as_secs() as i64;
    let max_iat = now + clock_skew_secs;

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_wrap)]
mod tests {
    use super::*;

    fn sample_claims() -> UserClaims {
        UserClaims {
            sub: "3f0c8f5e-0000-4000-8000-000000000001".to_string(),
            exp: 1_234_567_890,
            iat: 1_234_567_800,
            role: Role::Patient,
            is_vip: true,
            name: Some("Amira".to_string()),
        }
    }

    #[test]
    fn test_max_jwt_size_is_8kb() {
        assert_eq!(MAX_JWT_SIZE_BYTES, 8192);
    }

    #[test]
    fn test_clock_skew_constants() {
        assert_eq!(DEFAULT_CLOCK_SKEW, Duration::from_secs(300));
        assert_eq!(MAX_CLOCK_SKEW, Duration::from_secs(600));
    }

    #[test]
    fn test_check_token_size_at_limit() {
        let token = "a".repeat(MAX_JWT_SIZE_BYTES);
        assert!(check_token_size(&token).is_ok());
    }

    #[test]
    fn test_check_token_size_over_limit() {
        let token = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(
            check_token_size(&token),
            Err(JwtValidationError::TokenTooLarge)
        );
    }

    #[test]
    fn test_validate_iat_past_time() {
        let past = chrono::Utc::now().timestamp() - 3600;
        assert!(validate_iat(past, DEFAULT_CLOCK_SKEW).is_ok());
    }

    #[test]
    fn test_validate_iat_far_future() {
        let far_future = chrono::Utc::now().timestamp() + 86400;
        assert!(matches!(
            validate_iat(far_future, DEFAULT_CLOCK_SKEW),
            Err(JwtValidationError::IatTooFarInFuture)
        ));
    }

    #[test]
    fn test_validate_iat_at_boundary_exact() {
        let now = 1_700_000_000_i64;

        // iat == now + skew is the last accepted value
        assert!(validate_iat_at(now + 300, DEFAULT_CLOCK_SKEW, now).is_ok());

        // iat == now + skew + 1 is the first rejected value
        assert!(matches!(
            validate_iat_at(now + 301, DEFAULT_CLOCK_SKEW, now),
            Err(JwtValidationError::IatTooFarInFuture)
        ));
    }

    #[test]
    fn test_user_claims_debug_redacts_sub() {
        let debug_str = format!("{:?}", sample_claims());

        assert!(!debug_str.contains("3f0c8f5e"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("Patient"));
    }

    #[test]
    fn test_user_claims_has_role() {
        let claims = sample_claims();
        assert!(claims.has_role(Role::Patient));
        assert!(!claims.has_role(Role::Admin));
    }

    #[test]
    fn test_user_claims_defaults_when_optional_fields_missing() {
        let json = r#"{"sub":"u","exp":10,"iat":1,"role":"doctor"}"#;
        let claims: UserClaims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.role, Role::Doctor);
        assert!(!claims.is_vip);
        assert!(claims.name.is_none());
    }

    #[test]
    fn test_user_claims_without_name_omits_field() {
        let mut claims = sample_claims();
        claims.name = None;

        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("\"name\""));
        assert!(json.contains("\"role\":\"patient\""));
    }
}
