//! Authentication core: password hashing, access tokens, refresh tokens,
//! credential extraction and the authorization gate.
//!
//! Every way a caller can fail to authenticate is a distinct [`AuthError`]
//! variant so tests and logs can tell them apart. The HTTP layer collapses all
//! of them into one uniform 401 response.

pub mod extract;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod session;

use thiserror::Error;

pub use extract::{extract_api_key, extract_bearer, get_api_key, get_bearer_token};
pub use gate::{ensure_owner, AuthGate, NotOwner};
pub use jwt::{make_jwt, validate_jwt, TOKEN_ISSUER};
pub use password::{check_password_hash, hash_password};
pub use refresh::{make_refresh_token, RefreshToken, REFRESH_TOKEN_TTL_DAYS};

/// Root cause of an authentication failure.
///
/// Never rendered to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no bearer token found")]
    NoTokenFound,

    #[error("no api key found")]
    NoApiKeyFound,

    #[error("api key does not match")]
    ApiKeyMismatch,

    #[error("token signature invalid")]
    SignatureInvalid,

    #[error("token expired")]
    Expired,

    #[error("token subject is not a valid user id")]
    MalformedSubject,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("password does not match")]
    PasswordMismatch,

    #[error("stored password hash is unreadable")]
    UnreadableHash,

    #[error("no user with that email")]
    UnknownEmail,

    #[error("refresh token not found")]
    RefreshTokenNotFound,

    #[error("refresh token revoked")]
    RefreshTokenRevoked,

    #[error("refresh token expired")]
    RefreshTokenExpired,
}
