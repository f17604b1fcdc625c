//! JWT validation for the Medica service.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only HS256 is accepted
//! - Expiration and issued-at claims are validated with clock skew tolerance
//! - Generic error messages prevent information leakage

use crate::errors::MedicaError;
use common::jwt::{check_token_size, validate_iat, UserClaims};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::time::Duration;
use tracing::instrument;

const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

/// HS256 JWT validator for user tokens.
pub struct JwtValidator {
    decoding_key: DecodingKey,

    /// Clock skew tolerance for iat validation.
    clock_skew: Duration,
}

impl JwtValidator {
    /// Create a new JWT validator from the shared signing secret.
    ///
    /// # Arguments
    ///
    /// * `secret` - HS256 secret shared with the identity provider
    /// * `clock_skew_seconds` - Clock skew tolerance for iat validation
    pub fn new(secret: &SecretString, clock_skew_seconds: i64) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            clock_skew: Duration::from_secs(clock_skew_seconds.max(0).unsigned_abs()),
        }
    }

    /// Validate a user JWT and return its claims.
    ///
    /// # Security Checks
    ///
    /// 1. Size check - reject tokens > 8KB before parsing
    /// 2. Verify HS256 signature
    /// 3. Validate exp claim (reject expired tokens)
    /// 4. Validate iat claim with clock skew tolerance
    ///
    /// # Errors
    ///
    /// Returns `MedicaError::InvalidToken` for all validation failures with a
    /// generic message.
    #[instrument(skip_all)]
    pub fn validate_user(&self, token: &str) -> Result<UserClaims, MedicaError> {
        check_token_size(token).map_err(|e| {
            tracing::debug!(target: "medica.auth.jwt", error = ?e, "Token size check failed");
            MedicaError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
        })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data =
            decode::<UserClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!(target: "medica.auth.jwt", error = %e, "Token verification failed");
                MedicaError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
            })?;

        let claims = token_data.claims;

        if let Err(e) = validate_iat(claims.iat, self.clock_skew) {
            tracing::debug!(target: "medica.auth.jwt", error = ?e, "Token iat validation failed");
            return Err(MedicaError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()));
        }

        tracing::debug!(target: "medica.auth.jwt", role = claims.role.as_str(), "Token validated successfully");
        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::jwt::MAX_JWT_SIZE_BYTES;
    use common::types::Role;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-0123456789-abcdefghij";

    fn validator() -> JwtValidator {
        JwtValidator::new(&SecretString::from(SECRET.to_string()), 300)
    }

    fn claims(role: Role, iat_offset: i64, exp_offset: i64) -> UserClaims {
        let now = chrono::Utc::now().timestamp();
        UserClaims {
            sub: "7d1d3c56-5b8b-4a8e-9c51-1f0d2f5c9a10".to_string(),
            exp: now + exp_offset,
            iat: now + iat_offset,
            role,
            is_vip: false,
            name: None,
        }
    }

    fn sign(claims: &UserClaims, secret: &str, alg: Algorithm) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_returns_claims() {
        let token = sign(&claims(Role::Doctor, 0, 3600), SECRET, Algorithm::HS256);

        let result = validator().validate_user(&token).unwrap();
        assert_eq!(result.role, Role::Doctor);
        assert_eq!(result.sub, "7d1d3c56-5b8b-4a8e-9c51-1f0d2f5c9a10");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign(
            &claims(Role::Patient, 0, 3600),
            "some-other-secret-0123456789abcdef",
            Algorithm::HS256,
        );

        let result = validator().validate_user(&token);
        assert!(matches!(result, Err(MedicaError::InvalidToken(msg)) if msg == INVALID_TOKEN_MESSAGE));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign(&claims(Role::Patient, -7200, -3600), SECRET, Algorithm::HS256);

        assert!(matches!(
            validator().validate_user(&token),
            Err(MedicaError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_iat_far_in_future_rejected() {
        let token = sign(&claims(Role::Patient, 3600, 7200), SECRET, Algorithm::HS256);

        assert!(matches!(
            validator().validate_user(&token),
            Err(MedicaError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let token = sign(&claims(Role::Admin, 0, 3600), SECRET, Algorithm::HS512);

        assert!(matches!(
            validator().validate_user(&token),
            Err(MedicaError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_oversized_token_rejected() {
        let token = "a".repeat(MAX_JWT_SIZE_BYTES + 1);

        assert!(matches!(
            validator().validate_user(&token),
            Err(MedicaError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(validator().validate_user("not-a-jwt").is_err());
        assert!(validator().validate_user("").is_err());
    }
}
