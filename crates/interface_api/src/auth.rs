//! JWT authentication and role checks
//!
//! Tokens carry a subject (user id), a role list, and an expiry. Handlers
//! that mutate financial state call [`require_role`] with one of the
//! [`roles`] constants; `admin` passes every check.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

/// Role names recognized by the API
pub mod roles {
    /// Full access, including configuration changes
    pub const ADMIN: &str = "admin";
    /// Records and voids payments, runs the sweep, manages dues
    pub const TREASURER: &str = "treasurer";
    /// Read-only access to dues, payments, and reports
    pub const STAFF: &str = "staff";
}

/// Claims embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (UUID as string)
    pub sub: String,
    /// Roles granted to the user
    pub roles: Vec<String>,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
}

/// Authentication failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token creation failed: {0}")]
    TokenCreation(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl Claims {
    /// Whether the user holds the role; `admin` satisfies any check
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role || r == roles::ADMIN)
    }
}

/// Issues a signed token for the given user
pub fn create_token(
    user_id: &str,
    user_roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        roles: user_roles,
        exp: now + expiration_secs as i64,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenCreation(e.to_string()))
}

/// Verifies a token and returns its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(e.to_string()),
    })
}

/// Rejects the request unless the caller holds the role
pub fn require_role(claims: &Claims, role: &str) -> Result<(), ApiError> {
    if claims.has_role(role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!("requires role '{role}'")))
    }
}
