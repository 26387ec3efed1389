use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::auth::gate::NotOwner;
use crate::auth::AuthError;

/// Every failure a handler can return. This is the only place an error kind
/// becomes an HTTP status and body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("chirp is too long")]
    ChirpTooLong,

    /// The wrapped kind is logged, never sent.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("forbidden: {0}")]
    Forbidden(#[from] NotOwner),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("platform '{0}' does not allow this operation")]
    PlatformForbidden(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            AppError::InvalidInput(detail) => {
                tracing::info!("rejected request body: {}", detail);
                (StatusCode::BAD_REQUEST, "Invalid request body")
            }
            AppError::ChirpTooLong => (StatusCode::BAD_REQUEST, "Chirp is too long"),
            AppError::Unauthorized(cause) => {
                tracing::warn!(cause = %cause, "request not authorized");
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            AppError::Forbidden(e) => {
                tracing::warn!("{}", e);
                (StatusCode::FORBIDDEN, "Forbidden")
            }
            AppError::NotFound(what) => {
                tracing::debug!("{} not found", what);
                (StatusCode::NOT_FOUND, "Not found")
            }
            AppError::PlatformForbidden(platform) => {
                tracing::warn!(platform = %platform, "admin operation blocked outside dev");
                (StatusCode::FORBIDDEN, "Forbidden")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_auth_failures_share_one_status() {
        let kinds = [
            AuthError::NoTokenFound,
            AuthError::SignatureInvalid,
            AuthError::Expired,
            AuthError::MalformedSubject,
            AuthError::PasswordMismatch,
            AuthError::UnknownEmail,
            AuthError::RefreshTokenRevoked,
            AuthError::ApiKeyMismatch,
        ];
        for kind in kinds {
            let resp = AppError::from(kind).into_response();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_status_mapping() {
        let forbidden = AppError::from(NotOwner {
            caller: uuid::Uuid::new_v4(),
            owner: uuid::Uuid::new_v4(),
        });
        assert_eq!(forbidden.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::NotFound("chirp").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("db down"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::ChirpTooLong.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
