//! In-process store backed by DashMaps.
//!
//! Used by the test suite and by `chirpy serve --memory`. Each operation
//! touches one map entry under its shard lock, which is what gives refresh
//! token revoke/lookup their per-call atomicity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::Store;
use crate::auth::RefreshToken;
use crate::models::chirp::{Chirp, SortOrder};
use crate::models::user::User;

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    /// email -> user id, enforces the unique email constraint
    emails: DashMap<String, Uuid>,
    chirps: DashMap<Uuid, Chirp>,
    refresh_tokens: DashMap<String, RefreshToken>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> anyhow::Result<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
        };

        match self.emails.entry(email.to_string()) {
            Entry::Occupied(_) => anyhow::bail!("email already registered: {}", email),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let Some(id) = self.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn update_user_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> anyhow::Result<Option<User>> {
        let old_email = match self.users.get(&id) {
            Some(u) => u.email.clone(),
            None => return Ok(None),
        };

        if old_email != email {
            match self.emails.entry(email.to_string()) {
                Entry::Occupied(_) => anyhow::bail!("email already registered: {}", email),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.emails.remove(&old_email);
        }

        let Some(mut user) = self.users.get_mut(&id) else {
            // Deleted while we were moving the index; don't strand the address.
            self.emails.remove_if(email, |_, owner| *owner == id);
            return Ok(None);
        };
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> anyhow::Result<bool> {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all_users(&self) -> anyhow::Result<u64> {
        let removed = self.users.len() as u64;
        self.users.clear();
        self.emails.clear();
        self.chirps.clear();
        self.refresh_tokens.clear();
        Ok(removed)
    }

    async fn create_chirp(&self, user_id: Uuid, body: &str) -> anyhow::Result<Chirp> {
        if !self.users.contains_key(&user_id) {
            anyhow::bail!("chirp author {} does not exist", user_id);
        }
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        self.chirps.insert(chirp.id, chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(
        &self,
        author_id: Option<Uuid>,
        order: SortOrder,
    ) -> anyhow::Result<Vec<Chirp>> {
        let mut chirps: Vec<Chirp> = self
            .chirps
            .iter()
            .filter(|c| author_id.map_or(true, |a| c.user_id == a))
            .map(|c| c.clone())
            .collect();

        chirps.sort_by_key(|c| c.created_at);
        if order == SortOrder::Desc {
            chirps.reverse();
        }
        Ok(chirps)
    }

    async fn get_chirp(&self, id: Uuid) -> anyhow::Result<Option<Chirp>> {
        Ok(self.chirps.get(&id).map(|c| c.clone()))
    }

    async fn delete_chirp(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.chirps.remove(&id).is_some())
    }

    async fn insert_refresh_token(&self, token: &RefreshToken) -> anyhow::Result<()> {
        if !self.users.contains_key(&token.user_id) {
            anyhow::bail!("refresh token owner {} does not exist", token.user_id);
        }
        match self.refresh_tokens.entry(token.token.clone()) {
            Entry::Occupied(_) => anyhow::bail!("refresh token already exists"),
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
            }
        }
        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> anyhow::Result<Option<RefreshToken>> {
        Ok(self.refresh_tokens.get(token).map(|t| t.clone()))
    }

    async fn revoke_refresh_token(&self, token: &str, at: DateTime<Utc>) -> anyhow::Result<bool> {
        match self.refresh_tokens.get_mut(token) {
            Some(mut record) => {
                record.revoked_at.get_or_insert(at);
                record.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
