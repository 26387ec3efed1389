use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use uuid::Uuid;

use super::AuthError;

/// Lifetime of a refresh token from issuance.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// A long-lived opaque session token.
///
/// Revocation is one-way: once `revoked_at` is set the token never
/// authorizes anything again, whatever its `expires_at` says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Mint a fresh, unrevoked token for `user_id` issued at `now`.
    pub fn issue(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            token: make_refresh_token(),
            created_at: now,
            updated_at: now,
            user_id,
            expires_at: now + Duration::days(REFRESH_TOKEN_TTL_DAYS),
            revoked_at: None,
        }
    }

    /// Return the owning user if this token may still mint access tokens.
    ///
    /// Revocation is checked before expiry.
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        if self.revoked_at.is_some() {
            return Err(AuthError::RefreshTokenRevoked);
        }
        if now >= self.expires_at {
            return Err(AuthError::RefreshTokenExpired);
        }
        Ok(self.user_id)
    }
}

/// 32 bytes from the OS CSPRNG, hex-encoded to 64 characters.
pub fn make_refresh_token() -> String {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    hex::encode(key)
}
