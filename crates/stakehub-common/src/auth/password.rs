//! Password hashing and verification utilities
//!
//! Uses Argon2id with the crate's default (fixed) parameters.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

/// Hash a password using Argon2id
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// Verify a password against a hash
///
/// # Errors
/// Returns an error if the stored hash is not a valid PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Password service for dependency injection
///
/// Argon2 is CPU bound, so the async methods move the work onto the
/// blocking thread pool instead of stalling the runtime.
#[derive(Debug, Clone, Default)]
pub struct PasswordService;

impl PasswordService {
    /// Create a new password service
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Hash a password
    ///
    /// # Errors
    /// Returns an error if hashing fails
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(AppError::internal)?
    }

    /// Verify a password against a hash
    ///
    /// # Errors
    /// Returns an error if the stored hash is malformed
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(AppError::internal)?
    }
}
