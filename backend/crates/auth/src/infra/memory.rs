//! In-memory repository
//!
//! Same contract as [`PgAuthRepository`](super::PgAuthRepository), backed by
//! concurrent maps. Used by tests and for running the service without a
//! database.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use kernel::id::{AccessId, PairId};
use uuid::Uuid;

use crate::domain::entity::{
    token::TokenRecord,
    user::{NewUser, User},
};
use crate::domain::repository::{RefreshRotation, TokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, token_kind::TokenKind, user_id::UserId, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug)]
pub struct InMemoryAuthRepository {
    users: DashMap<i64, User>,
    emails: DashMap<String, i64>,
    tokens: DashMap<(TokenKind, Uuid), TokenRecord>,
    next_user_id: AtomicI64,
}

impl Default for InMemoryAuthRepository {
    fn default() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            tokens: DashMap::new(),
            next_user_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored token records
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn delete_where(&self, mut predicate: impl FnMut(&TokenKind, &TokenRecord) -> bool) -> u64 {
        let mut deleted = 0;
        self.tokens.retain(|(kind, _), record| {
            let remove = predicate(kind, record);
            if remove {
                deleted += 1;
            }
            !remove
        });
        deleted
    }

    fn put(&self, record: &TokenRecord) {
        self.tokens
            .insert((record.kind, record.token_id), record.clone());
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        match self.emails.entry(user.email.as_str().to_owned()) {
            Entry::Occupied(_) => Err(AuthError::EmailTaken),
            Entry::Vacant(slot) => {
                let id = self.next_user_id.fetch_add(1, Ordering::Relaxed);
                let created = user.clone().into_user(UserId::new(id), Utc::now());
                self.users.insert(id, created.clone());
                slot.insert(id);
                Ok(created)
            }
        }
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.users.get(&user_id.value()).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let Some(id) = self.emails.get(email.as_str()).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.emails.contains_key(email.as_str()))
    }

    async fn find_by_confirmation_digest(&self, digest: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.confirmation_digest.as_deref() == Some(digest))
            .map(|u| u.clone()))
    }

    async fn confirm(&self, user_id: UserId) -> AuthResult<()> {
        let mut user = self
            .users
            .get_mut(&user_id.value())
            .ok_or(AuthError::UserNotFound)?;
        user.confirmed = true;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_last_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()> {
        if let Some(mut user) = self.users.get_mut(&user_id.value()) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn update_password(&self, user_id: UserId, password: &UserPassword) -> AuthResult<()> {
        let mut user = self
            .users
            .get_mut(&user_id.value())
            .ok_or(AuthError::UserNotFound)?;
        user.password_hash = password.clone();
        user.updated_at = Utc::now();
        Ok(())
    }
}

impl TokenRepository for InMemoryAuthRepository {
    async fn insert(&self, record: &TokenRecord) -> AuthResult<()> {
        self.put(record);
        Ok(())
    }

    async fn insert_pair(&self, access: &TokenRecord, refresh: &TokenRecord) -> AuthResult<()> {
        self.put(access);
        self.put(refresh);
        Ok(())
    }

    async fn delete_pair(&self, access_id: AccessId, pair_id: PairId) -> AuthResult<u64> {
        // Refresh first: a half-finished revoke must not leave it live
        let refresh = self.delete_where(|k, r| *k == TokenKind::Refresh && r.pair_id == pair_id);
        let access = self
            .tokens
            .remove(&(TokenKind::Access, access_id.into_uuid()))
            .map_or(0, |_| 1);
        Ok(refresh + access)
    }

    async fn find_owner_by_id_and_kind(
        &self,
        token_id: Uuid,
        kind: TokenKind,
    ) -> AuthResult<Option<UserId>> {
        Ok(self.tokens.get(&(kind, token_id)).map(|r| r.owner))
    }

    async fn rotate_refresh(&self, rotation: &RefreshRotation) -> AuthResult<bool> {
        // The single remove decides the winner among concurrent rotations
        let consumed = self.tokens.remove_if(
            &(TokenKind::Refresh, rotation.consumed.into_uuid()),
            |_, record| record.owner == rotation.owner,
        );
        if consumed.is_none() {
            return Ok(false);
        }

        if let Some(pair_id) = rotation.revoke_access_of {
            self.delete_where(|k, r| *k == TokenKind::Access && r.pair_id == pair_id);
        }
        self.put(&rotation.access);
        self.put(&rotation.refresh);
        Ok(true)
    }

    async fn delete_all_for_user(&self, owner: UserId, except: Option<PairId>) -> AuthResult<u64> {
        Ok(self.delete_where(|_, r| r.owner == owner && Some(r.pair_id) != except))
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let now = Utc::now();
        Ok(self.delete_where(|_, r| r.is_expired_at(now)))
    }
}
