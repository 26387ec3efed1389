use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::OnceLock;

use argon2::Argon2;
use rand::rngs::OsRng;

use super::AuthError;

/// Hash a password with Argon2id and a fresh random salt.
///
/// The PHC output embeds the salt and parameters, so hashing the same
/// plaintext twice yields two different strings. Empty passwords are hashed
/// like any other input.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns an error rather than a bool: a mismatch and an unreadable stored
/// hash both fail, and callers must treat them the same way.
pub fn check_password_hash(hash: &str, password: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        tracing::error!("stored password hash could not be parsed: {}", e);
        AuthError::UnreadableHash
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::PasswordMismatch)
}

/// A real Argon2 hash of a throwaway secret, computed once. Verifying
/// against it makes a login for an unknown email cost as much as one for a
/// known email with the wrong password.
pub fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        let secret = super::make_refresh_token();
        hash_password(&secret).unwrap_or_else(|e| {
            tracing::error!("could not build timing-equalization hash: {}", e);
            String::new()
        })
    })
}
