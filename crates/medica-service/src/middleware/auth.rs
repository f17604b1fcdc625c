//! Authentication middleware for protected routes.
//!
//! `require_user_auth` extracts the Bearer token from the Authorization
//! header, validates it, and injects `UserClaims` into request extensions.
//! Role checks happen in handlers via [`require_role`] and [`require_vip`].

use crate::auth::JwtValidator;
use crate::errors::MedicaError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use common::jwt::UserClaims;
use common::types::Role;
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    /// HS256 JWT validator.
    pub jwt_validator: Arc<JwtValidator>,
}

fn extract_bearer_token(req: &Request) -> Result<&str, MedicaError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "medica.middleware.auth", "Missing Authorization header");
            MedicaError::InvalidToken("Missing Authorization header".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "medica.middleware.auth", "Invalid Authorization header format");
        MedicaError::InvalidToken("Invalid Authorization header format".to_string())
    })
}

/// Authentication middleware for user tokens.
///
/// # Response
///
/// - Returns 401 Unauthorized if token is missing or invalid
/// - Continues to next handler with `UserClaims` in extensions if token is valid
#[instrument(skip_all, name = "medica.middleware.user_auth")]
pub async fn require_user_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, MedicaError> {
    let token = extract_bearer_token(&req)?;

    let user_claims = state.jwt_validator.validate_user(token)?;

    req.extensions_mut().insert(user_claims);

    Ok(next.run(req).await)
}

/// Reject callers whose token does not carry `role`.
pub fn require_role(claims: &UserClaims, role: Role) -> Result<(), MedicaError> {
    if claims.has_role(role) {
        return Ok(());
    }
    tracing::debug!(
        target: "medica.middleware.auth",
        required = role.as_str(),
        actual = claims.role.as_str(),
        "Role check failed"
    );
    Err(MedicaError::Forbidden(format!(
        "This action requires the {} role",
        role.as_str()
    )))
}

/// Reject callers that are not on the VIP tier.
pub fn require_vip(claims: &UserClaims) -> Result<(), MedicaError> {
    if claims.is_vip {
        return Ok(());
    }
    Err(MedicaError::Forbidden(
        "VIP consultations are available to VIP members only".to_string(),
    ))
}

/// Parse the token subject as a user id.
pub fn subject_id(claims: &UserClaims) -> Result<uuid::Uuid, MedicaError> {
    uuid::Uuid::parse_str(&claims.sub).map_err(|_| {
        tracing::debug!(target: "medica.middleware.auth", "Token subject is not a UUID");
        MedicaError::InvalidToken("The access token is invalid or expired".to_string())
    })
}
