//! Pulls credentials out of the `Authorization` header.
//!
//! Two schemes, never mixed: `Bearer <token>` for users and
//! `ApiKey <key>` for trusted backends. The prefix match is exact and
//! case-sensitive and the remainder is returned untouched; whatever consumes
//! it rejects malformed values.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

pub fn extract_bearer(value: &str) -> Result<&str, AuthError> {
    value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::NoTokenFound)
}

pub fn extract_api_key(value: &str) -> Result<&str, AuthError> {
    value
        .strip_prefix(API_KEY_PREFIX)
        .ok_or(AuthError::NoApiKeyFound)
}

/// Bearer token from the request headers.
pub fn get_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    authorization(headers)
        .ok_or(AuthError::NoTokenFound)
        .and_then(extract_bearer)
}

/// API key from the request headers.
pub fn get_api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    authorization(headers)
        .ok_or(AuthError::NoApiKeyFound)
        .and_then(extract_api_key)
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}
