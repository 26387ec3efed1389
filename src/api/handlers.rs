use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, ensure_owner, hash_password, session};
use crate::errors::AppError;
use crate::models::chirp::{validate_chirp, Chirp, SortOrder};
use crate::models::user::UserResponse;
use crate::AppState;

/// The only webhook event that changes state.
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub expires_in_seconds: Option<i64>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsParams {
    pub author_id: Option<Uuid>,
    pub sort: Option<SortOrder>,
}

/// Only `event` is required; `data` is read for upgrade events alone.
#[derive(Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub user_id: String,
}

async fn hash_off_thread(plaintext: String) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&plaintext)).await??;
    Ok(hash)
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /api/healthz
pub async fn readiness() -> &'static str {
    "OK"
}

/// POST /api/users: register an account
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(req) = payload?;
    let hashed = hash_off_thread(req.password).await?;
    let user = state.db.create_user(&req.email, &hashed).await?;

    tracing::info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /api/users: change the caller's own email and password
pub async fn update_credentials(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = state.auth.authenticate(&headers)?;
    let Json(req) = payload?;

    let hashed = hash_off_thread(req.password).await?;
    let user = state
        .db
        .update_user_credentials(user_id, &req.email, &hashed)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    tracing::info!(user_id = %user.id, "credentials updated");
    Ok(Json(user.into()))
}

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;
    let outcome = session::login(
        state.db.as_ref(),
        state.auth.jwt_secret(),
        &req.email,
        req.password,
        req.expires_in_seconds,
    )
    .await?;

    Ok(Json(LoginResponse {
        user: outcome.user.into(),
        token: outcome.access_token,
        refresh_token: outcome.refresh_token.token,
    }))
}

/// POST /api/refresh: `Authorization: Bearer <refresh token>`
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let token = auth::get_bearer_token(&headers)?;
    let access = session::refresh(state.db.as_ref(), state.auth.jwt_secret(), token).await?;
    Ok(Json(TokenResponse { token: access }))
}

/// POST /api/revoke: `Authorization: Bearer <refresh token>`
pub async fn revoke(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = auth::get_bearer_token(&headers)?;
    session::revoke(state.db.as_ref(), token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/chirps
pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CreateChirpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Chirp>), AppError> {
    let user_id = state.auth.authenticate(&headers)?;
    let Json(req) = payload?;

    let cleaned = validate_chirp(&req.body).ok_or(AppError::ChirpTooLong)?;
    let chirp = state.db.create_chirp(user_id, &cleaned).await?;

    tracing::debug!(chirp_id = %chirp.id, user_id = %user_id, "chirp created");
    Ok((StatusCode::CREATED, Json(chirp)))
}

/// GET /api/chirps?author_id=&sort=asc|desc
pub async fn list_chirps(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListChirpsParams>, QueryRejection>,
) -> Result<Json<Vec<Chirp>>, AppError> {
    let Query(params) = params?;
    let chirps = state
        .db
        .list_chirps(params.author_id, params.sort.unwrap_or_default())
        .await?;
    Ok(Json(chirps))
}

/// GET /api/chirps/:chirp_id
pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    chirp_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Chirp>, AppError> {
    let Path(chirp_id) = chirp_id?;
    let chirp = state
        .db
        .get_chirp(chirp_id)
        .await?
        .ok_or(AppError::NotFound("chirp"))?;
    Ok(Json(chirp))
}

/// DELETE /api/chirps/:chirp_id: only the author may delete
pub async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    chirp_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let caller = state.auth.authenticate(&headers)?;
    let Path(chirp_id) = chirp_id?;

    let chirp = state
        .db
        .get_chirp(chirp_id)
        .await?
        .ok_or(AppError::NotFound("chirp"))?;
    ensure_owner(caller, chirp.user_id)?;

    if !state.db.delete_chirp(chirp_id).await? {
        // Lost a race with another delete.
        return Err(AppError::NotFound("chirp"));
    }

    tracing::info!(chirp_id = %chirp_id, user_id = %caller, "chirp deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/polka/webhooks: payment provider callback
pub async fn polka_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    state.auth.authenticate_service(&headers)?;
    let Json(req) = payload?;

    if req.event != USER_UPGRADED_EVENT {
        tracing::debug!(event = %req.event, "ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = Uuid::parse_str(&req.data.user_id)
        .map_err(|e| AppError::InvalidInput(format!("user_id: {}", e)))?;

    if !state.db.upgrade_to_chirpy_red(user_id).await? {
        return Err(AppError::NotFound("user"));
    }

    tracing::info!(user_id = %user_id, "user upgraded to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
