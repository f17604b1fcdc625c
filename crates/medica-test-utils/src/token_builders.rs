//! Builder for signed test tokens.

use crate::test_ids::TEST_JWT_SECRET;
use chrono::{Duration, Utc};
use common::jwt::UserClaims;
use common::types::Role;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

/// Builder for HS256 user tokens accepted by the test server.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .patient(TEST_PATIENT_AMIRA)
///     .vip()
///     .expires_in(3600)
///     .sign();
/// ```
pub struct TestTokenBuilder {
    claims: UserClaims,
    secret: String,
}

impl TestTokenBuilder {
    /// Create a non-VIP patient token with a random subject, valid for an hour.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            claims: UserClaims {
                sub: Uuid::new_v4().to_string(),
                exp: (now + Duration::seconds(3600)).timestamp(),
                iat: now.timestamp(),
                role: Role::Patient,
                is_vip: false,
                name: None,
            },
            secret: TEST_JWT_SECRET.to_string(),
        }
    }

    /// Set the subject.
    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.claims.sub = user_id.to_string();
        self
    }

    /// Set a raw subject string (for malformed-subject tests).
    pub fn with_raw_subject(mut self, subject: &str) -> Self {
        self.claims.sub = subject.to_string();
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.claims.role = role;
        self
    }

    /// Patient token for `user_id`.
    pub fn patient(self, user_id: Uuid) -> Self {
        self.for_user(user_id).with_role(Role::Patient)
    }

    /// Doctor token for `user_id`.
    pub fn doctor(self, user_id: Uuid) -> Self {
        self.for_user(user_id).with_role(Role::Doctor)
    }

    /// Pharmacy token for `user_id`.
    pub fn pharmacy(self, user_id: Uuid) -> Self {
        self.for_user(user_id).with_role(Role::Pharmacy)
    }

    /// Admin token for `user_id`.
    pub fn admin(self, user_id: Uuid) -> Self {
        self.for_user(user_id).with_role(Role::Admin)
    }

    /// Mark the account as VIP.
    pub fn vip(mut self) -> Self {
        self.claims.is_vip = true;
        self
    }

    /// Set expiration in seconds from now (negative for an expired token).
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.claims.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set issued-at timestamp.
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.claims.iat = timestamp;
        self
    }

    /// Sign with a different secret.
    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    /// The claims as they will be signed.
    pub fn claims(&self) -> &UserClaims {
        &self.claims
    }

    /// Encode and sign the token.
    pub fn sign(self) -> String {
        encode(
            &Header::default(),
            &self.claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("test token signing should not fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
