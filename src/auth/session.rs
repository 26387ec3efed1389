//! Login, refresh and revoke, composed from the auth primitives and the store.

use chrono::{Duration, Utc};

use super::{jwt, password, AuthError, RefreshToken};
use crate::errors::AppError;
use crate::models::user::User;
use crate::store::Store;

/// Access token lifetime when the client does not ask for one.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
/// Upper bound on a client-requested access token lifetime.
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Clamp a client-requested lifetime. Missing, zero or negative requests get
/// the default; anything above the ceiling is cut down to it.
pub fn access_token_ttl(requested_secs: Option<i64>) -> Duration {
    let secs = match requested_secs {
        Some(s) if s > 0 => s.min(MAX_ACCESS_TOKEN_TTL_SECS),
        _ => DEFAULT_ACCESS_TOKEN_TTL_SECS,
    };
    Duration::seconds(secs)
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: RefreshToken,
}

/// Check credentials and open a session.
///
/// Unknown email and wrong password are distinct internally but surface as
/// the same unauthorized response.
#[tracing::instrument(skip(store, secret, plaintext))]
pub async fn login(
    store: &dyn Store,
    secret: &str,
    email: &str,
    plaintext: String,
    expires_in_seconds: Option<i64>,
) -> Result<LoginOutcome, AppError> {
    let Some(user) = store.get_user_by_email(email).await? else {
        // Burn the same Argon2 work so timing doesn't reveal which emails exist.
        tokio::task::spawn_blocking(move || {
            let _ = password::check_password_hash(password::dummy_hash(), &plaintext);
        })
        .await?;
        return Err(AuthError::UnknownEmail.into());
    };

    let hash = user.hashed_password.clone();
    tokio::task::spawn_blocking(move || password::check_password_hash(&hash, &plaintext))
        .await??;

    let access_token = jwt::make_jwt(user.id, secret, access_token_ttl(expires_in_seconds))?;

    let refresh_token = RefreshToken::issue(user.id, Utc::now());
    store.insert_refresh_token(&refresh_token).await?;

    tracing::info!(user_id = %user.id, "session opened");
    Ok(LoginOutcome {
        user,
        access_token,
        refresh_token,
    })
}

/// Mint a new access token from a refresh token.
///
/// The refresh token itself is not rotated and stays valid until it expires
/// or is revoked.
pub async fn refresh(store: &dyn Store, secret: &str, token: &str) -> Result<String, AppError> {
    let record = store
        .get_refresh_token(token)
        .await?
        .ok_or(AuthError::RefreshTokenNotFound)?;

    let user_id = record.ensure_usable(Utc::now())?;

    let access_token = jwt::make_jwt(user_id, secret, access_token_ttl(None))?;
    tracing::debug!(user_id = %user_id, "access token refreshed");
    Ok(access_token)
}

/// Revoke a refresh token. Revoking twice is not an error.
pub async fn revoke(store: &dyn Store, token: &str) -> Result<(), AppError> {
    if !store.revoke_refresh_token(token, Utc::now()).await? {
        return Err(AppError::NotFound("refresh token"));
    }
    tracing::info!("refresh token revoked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    const SECRET: &str = "session-test-secret";

    async fn store_with_user(email: &str, pw: &str) -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let hash = password::hash_password(pw).unwrap();
        let user = store.create_user(email, &hash).await.unwrap();
        (store, user)
    }

    #[test]
    fn test_access_token_ttl_clamping() {
        assert_eq!(access_token_ttl(None), Duration::hours(1));
        assert_eq!(access_token_ttl(Some(0)), Duration::hours(1));
        assert_eq!(access_token_ttl(Some(-5)), Duration::hours(1));
        assert_eq!(access_token_ttl(Some(60)), Duration::seconds(60));
        assert_eq!(access_token_ttl(Some(3600)), Duration::hours(1));
        assert_eq!(access_token_ttl(Some(86_400)), Duration::hours(1));
    }

    #[tokio::test]
    async fn test_login_issues_both_tokens() {
        let (store, user) = store_with_user("a@example.com", "correcthorse").await;

        let outcome = login(&store, SECRET, "a@example.com", "correcthorse".into(), None)
            .await
            .unwrap();

        assert_eq!(outcome.user.id, user.id);
        assert_eq!(jwt::validate_jwt(&outcome.access_token, SECRET), Ok(user.id));
        assert_eq!(outcome.refresh_token.token.len(), 64);
        assert!(store
            .get_refresh_token(&outcome.refresh_token.token)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_login_failures_are_unauthorized() {
        let (store, _) = store_with_user("a@example.com", "correcthorse").await;

        let wrong_pw = login(&store, SECRET, "a@example.com", "nope".into(), None).await;
        assert!(matches!(
            wrong_pw,
            Err(AppError::Unauthorized(AuthError::PasswordMismatch))
        ));

        let no_user = login(&store, SECRET, "b@example.com", "correcthorse".into(), None).await;
        assert!(matches!(
            no_user,
            Err(AppError::Unauthorized(AuthError::UnknownEmail))
        ));
    }

    #[tokio::test]
    async fn test_refresh_after_revoke_fails() {
        let (store, user) = store_with_user("a@example.com", "pw").await;
        let rt = RefreshToken::issue(user.id, Utc::now());
        store.insert_refresh_token(&rt).await.unwrap();

        let token = refresh(&store, SECRET, &rt.token).await.unwrap();
        assert_eq!(jwt::validate_jwt(&token, SECRET), Ok(user.id));

        revoke(&store, &rt.token).await.unwrap();
        assert!(matches!(
            refresh(&store, SECRET, &rt.token).await,
            Err(AppError::Unauthorized(AuthError::RefreshTokenRevoked))
        ));

        // idempotent
        assert!(revoke(&store, &rt.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_does_not_rotate() {
        let (store, user) = store_with_user("a@example.com", "pw").await;
        let rt = RefreshToken::issue(user.id, Utc::now());
        store.insert_refresh_token(&rt).await.unwrap();

        refresh(&store, SECRET, &rt.token).await.unwrap();
        refresh(&store, SECRET, &rt.token).await.unwrap();
        let stored = store.get_refresh_token(&rt.token).await.unwrap().unwrap();
        assert_eq!(stored, rt);
    }

    #[tokio::test]
    async fn test_refresh_expired_and_unknown() {
        let (store, user) = store_with_user("a@example.com", "pw").await;
        let rt = RefreshToken::issue(user.id, Utc::now() - Duration::days(61));
        store.insert_refresh_token(&rt).await.unwrap();

        assert!(matches!(
            refresh(&store, SECRET, &rt.token).await,
            Err(AppError::Unauthorized(AuthError::RefreshTokenExpired))
        ));
        assert!(matches!(
            refresh(&store, SECRET, "deadbeef").await,
            Err(AppError::Unauthorized(AuthError::RefreshTokenNotFound))
        ));
    }

    #[tokio::test]
    async fn test_revoke_unknown_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            revoke(&store, "missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
