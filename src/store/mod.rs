pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::RefreshToken;
use crate::models::chirp::{Chirp, SortOrder};
use crate::models::user::User;

/// Persistence for accounts, chirps and refresh tokens.
/// Implementations: PgStore (PostgreSQL), MemoryStore (in-process, tests/dev).
///
/// Every method is a single atomic operation; concurrent revoke and lookup of
/// the same refresh token never observe a half-written row.
#[async_trait]
pub trait Store: Send + Sync {
    // -- Users --

    async fn create_user(&self, email: &str, hashed_password: &str) -> anyhow::Result<User>;

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Returns `None` if the user does not exist.
    async fn update_user_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> anyhow::Result<Option<User>>;

    /// Set the premium flag. Returns false if the user does not exist.
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Remove every user along with their chirps and refresh tokens.
    async fn delete_all_users(&self) -> anyhow::Result<u64>;

    // -- Chirps --

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> anyhow::Result<Chirp>;

    async fn list_chirps(
        &self,
        author_id: Option<Uuid>,
        order: SortOrder,
    ) -> anyhow::Result<Vec<Chirp>>;

    async fn get_chirp(&self, id: Uuid) -> anyhow::Result<Option<Chirp>>;

    async fn delete_chirp(&self, id: Uuid) -> anyhow::Result<bool>;

    // -- Refresh tokens --

    async fn insert_refresh_token(&self, token: &RefreshToken) -> anyhow::Result<()>;

    async fn get_refresh_token(&self, token: &str) -> anyhow::Result<Option<RefreshToken>>;

    /// Stamp `revoked_at` if it is not already set. Returns false if no such
    /// token exists; revoking an already-revoked token returns true and keeps
    /// the first timestamp.
    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> anyhow::Result<bool>;
}
