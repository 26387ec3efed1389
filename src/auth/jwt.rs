//! Access tokens: HS256-signed JWTs binding a user id.
//!
//! Tokens are stateless. Validity is the signature plus the expiry claim;
//! there is no revocation list, so a token lives until `exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

/// `iss` claim written into and required from every access token.
pub const TOKEN_ISSUER: &str = "auth-service";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign an access token for `user_id` valid for `ttl` from now.
pub fn make_jwt(user_id: Uuid, secret: &str, ttl: Duration) -> anyhow::Result<String> {
    make_jwt_at(user_id, secret, ttl, Utc::now())
}

/// Same as [`make_jwt`] with an explicit issue time.
pub fn make_jwt_at(
    user_id: Uuid,
    secret: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> anyhow::Result<String> {
    if ttl.num_seconds() < 1 {
        anyhow::bail!("access token ttl must be at least one second, got {}", ttl);
    }

    let claims = Claims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("failed to sign access token: {}", e))
}

/// Verify an access token and return the user id it was issued for.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    validate_jwt_at(token, secret, Utc::now())
}

/// Same as [`validate_jwt`] against an explicit clock.
///
/// The token is expired from the `exp` instant onwards.
pub fn validate_jwt_at(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked below so the boundary and the clock are ours.
    validation.validate_exp = false;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
        _ => AuthError::MalformedToken(e.to_string()),
    })?;

    if now.timestamp() >= data.claims.exp {
        return Err(AuthError::Expired);
    }

    Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::MalformedSubject)
}
