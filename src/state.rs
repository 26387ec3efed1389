use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::auth::AuthGate;
use crate::config::Config;
use crate::store::Store;

/// Shared application state passed to handlers and middleware.
///
/// Built once at startup; everything except the store and the hit counter is
/// read-only afterwards.
pub struct AppState {
    pub db: Arc<dyn Store>,
    pub auth: AuthGate,
    pub config: Config,
    file_server_hits: AtomicU64,
}

impl AppState {
    pub fn new(db: Arc<dyn Store>, config: Config) -> Self {
        Self {
            db,
            auth: AuthGate::new(config.jwt_secret.clone(), config.polka_key.clone()),
            config,
            file_server_hits: AtomicU64::new(0),
        }
    }

    pub fn record_file_server_hit(&self) {
        self.file_server_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_server_hits(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    pub fn reset_file_server_hits(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}
