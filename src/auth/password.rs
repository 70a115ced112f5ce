//! Account password hashing. Only the PHC string is ever stored on a user row.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash a new account password (registration, password change).
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| {
            error!(error = %e, "could not hash account password");
            anyhow::anyhow!("password hashing failed: {e}")
        })
}

/// Check a login or old-password attempt against the stored hash.
/// `Ok(false)` is a wrong password; `Err` means the stored hash is unreadable.
pub fn verify_password(attempt: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "stored password hash is not a PHC string");
        anyhow::anyhow!("stored password hash is corrupt: {e}")
    })?;
    Ok(Argon2::default().verify_password(attempt.as_bytes(), &parsed).is_ok())
}
