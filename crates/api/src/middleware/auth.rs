//! # Authentication Module
//!
//! Admin endpoints take the admin password as a bearer token
//! (`Authorization: Bearer <password>`), checked against the Argon2 hash from
//! `ADMIN_PASSWORD_HASH`.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use eyre::{Result, eyre};
use slotbook_core::errors::BookingError;
use tracing::warn;

use crate::{ApiState, middleware::error_handling::AppError};

/// Hashes a password with Argon2 and a random salt, returning the PHC string
/// to put into `ADMIN_PASSWORD_HASH`.
///
/// # Example
///
/// ```rust
/// let hashed = slotbook_api::middleware::auth::hash_password("secret").unwrap();
/// assert!(hashed.starts_with("$argon2"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks `password` against a PHC hash string. A malformed hash is an error,
/// a wrong password is `Ok(false)`.
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(password_hash).map_err(|e| eyre!("Invalid password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Extractor that only succeeds for requests carrying the admin password.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(password_hash) = state.admin_password_hash.as_deref() else {
            return Err(unauthorized("Admin access is not configured"));
        };

        let password = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| unauthorized("Missing admin credentials"))?;

        if verify_password(password_hash, password)? {
            Ok(AdminAuth)
        } else {
            warn!("Rejected admin request with a wrong password");
            Err(unauthorized("Invalid admin credentials"))
        }
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError(BookingError::Authentication(message.to_string()))
}
