use std::sync::Arc;

use axum::{extract::State, response::Html, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::AppState;

/// GET /admin/metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        "<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>",
        state.file_server_hits()
    ))
}

/// POST /admin/reset. Dev only. Wipes every account (chirps and refresh
/// tokens cascade) and zeroes the hit counter.
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    if !state.config.is_dev() {
        return Err(AppError::PlatformForbidden(state.config.platform.clone()));
    }

    let deleted = state.db.delete_all_users().await?;
    state.reset_file_server_hits();

    tracing::warn!(deleted_users = deleted, "store reset");
    Ok(Json(json!({ "deleted_users": deleted })))
}
