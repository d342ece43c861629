//! Time-based one-time passwords (RFC 6238)

use totp_rs::{Algorithm, Secret, TOTP};

use crate::error::AppError;

/// Verify a 6-digit code against a base32 secret, allowing one step of clock skew.
///
/// Codes that are not six ASCII digits are rejected without touching the secret.
///
/// # Errors
/// Returns an error if the stored secret cannot be decoded or the system clock is unusable
pub fn verify_totp(secret_base32: &str, code: &str) -> Result<bool, AppError> {
    let code = code.trim();
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(false);
    }

    let secret = Secret::Encoded(secret_base32.trim().to_uppercase())
        .to_bytes()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to decode TOTP secret: {e:?}")))?;

    // Authenticator apps commonly issue 80-bit secrets, below the RFC's recommended minimum
    let totp = TOTP::new_unchecked(Algorithm::SHA1, 6, 1, 30, secret, None, String::new());

    totp.check_current(code)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("TOTP system time error: {e}")))
}
