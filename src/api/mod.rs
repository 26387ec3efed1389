use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    count_file_server_hits, request_id_middleware, security_headers_middleware,
};
use crate::AppState;

pub mod admin;
pub mod handlers;

/// Build the full application router.
///
/// `/api/*` is JSON, `/admin/*` is operator tooling, `/app/*` serves static
/// files from the configured root and counts hits.
pub fn router(state: Arc<AppState>) -> Router {
    let file_server = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.filepath_root))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            count_file_server_hits,
        ));

    Router::new()
        // Health (no auth)
        .route("/api/healthz", get(handlers::readiness))
        // Accounts & sessions
        .route(
            "/api/users",
            post(handlers::create_user).put(handlers::update_credentials),
        )
        .route("/api/login", post(handlers::login))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/revoke", post(handlers::revoke))
        // Chirps
        .route(
            "/api/chirps",
            get(handlers::list_chirps).post(handlers::create_chirp),
        )
        .route(
            "/api/chirps/:chirp_id",
            get(handlers::get_chirp).delete(handlers::delete_chirp),
        )
        // Payment provider callback (ApiKey auth)
        .route("/api/polka/webhooks", post(handlers::polka_webhook))
        // Admin
        .route("/admin/metrics", get(admin::metrics))
        .route("/admin/reset", post(admin::reset))
        .merge(file_server)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
}
