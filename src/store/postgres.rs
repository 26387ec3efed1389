use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::auth::RefreshToken;
use crate::models::chirp::{Chirp, SortOrder};
use crate::models::user::User;

const USER_COLUMNS: &str = "id, created_at, updated_at, email, hashed_password, is_chirpy_red";
const CHIRP_COLUMNS: &str = "id, created_at, updated_at, body, user_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    // -- User Operations --

    async fn create_user(&self, email: &str, hashed_password: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, hashed_password) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users SET email = $2, hashed_password = $3, updated_at = NOW()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET is_chirpy_red = true, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_users(&self) -> anyhow::Result<u64> {
        // chirps and refresh_tokens go with ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // -- Chirp Operations --

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> anyhow::Result<Chirp> {
        let chirp = sqlx::query_as::<_, Chirp>(&format!(
            "INSERT INTO chirps (body, user_id) VALUES ($1, $2) RETURNING {CHIRP_COLUMNS}"
        ))
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(chirp)
    }

    async fn list_chirps(
        &self,
        author_id: Option<Uuid>,
        order: SortOrder,
    ) -> anyhow::Result<Vec<Chirp>> {
        let rows = sqlx::query_as::<_, Chirp>(&format!(
            r#"SELECT {CHIRP_COLUMNS} FROM chirps
               WHERE ($1::UUID IS NULL OR user_id = $1)
               ORDER BY created_at {}"#,
            order.as_sql()
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_chirp(&self, id: Uuid) -> anyhow::Result<Option<Chirp>> {
        let chirp = sqlx::query_as::<_, Chirp>(&format!(
            "SELECT {CHIRP_COLUMNS} FROM chirps WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(chirp)
    }

    async fn delete_chirp(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- Refresh Token Operations --

    async fn insert_refresh_token(&self, token: &RefreshToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO refresh_tokens (token, created_at, updated_at, user_id, expires_at, revoked_at)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(&token.token)
        .bind(token.created_at)
        .bind(token.updated_at)
        .bind(token.user_id)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> anyhow::Result<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshToken>(
            "SELECT token, created_at, updated_at, user_id, expires_at, revoked_at FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> anyhow::Result<bool> {
        // UPDATE not DELETE: revoked rows stay for the audit trail.
        let result = sqlx::query(
            r#"UPDATE refresh_tokens
               SET revoked_at = COALESCE(revoked_at, $2), updated_at = $2
               WHERE token = $1"#,
        )
        .bind(token)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
