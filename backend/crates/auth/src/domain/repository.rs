//! Repository Traits
//!
//! Interfaces for persistence and outbound notifications. Implementations
//! live in the infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::{AccessId, PairId, RefreshId};
use uuid::Uuid;

use crate::domain::entity::{
    token::TokenRecord,
    user::{NewUser, User},
};
use crate::domain::value_object::{
    email::Email, token_kind::TokenKind, user_id::UserId, user_password::UserPassword,
};
use crate::error::AuthResult;

/// Credential store
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new account; fails with `EmailTaken` on a duplicate email
    async fn create(&self, user: &NewUser) -> AuthResult<User>;

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn find_by_confirmation_digest(&self, digest: &str) -> AuthResult<Option<User>>;

    /// Mark confirmed. The digest stays so a reused link reports `AlreadyConfirmed`
    async fn confirm(&self, user_id: UserId) -> AuthResult<()>;

    async fn update_last_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()>;

    async fn update_password(&self, user_id: UserId, password: &UserPassword) -> AuthResult<()>;
}

/// Single-use exchange of one refresh record for a new pair.
#[derive(Debug, Clone)]
pub struct RefreshRotation {
    /// Refresh record being consumed
    pub consumed: RefreshId,
    /// Only a record owned by this identity may be consumed
    pub owner: UserId,
    /// Also delete the ACCESS record of this pair (the consumed one's sibling)
    pub revoke_access_of: Option<PairId>,
    pub access: TokenRecord,
    pub refresh: TokenRecord,
}

/// Token metadata store
#[trait_variant::make(TokenRepository: Send)]
pub trait LocalTokenRepository {
    async fn insert(&self, record: &TokenRecord) -> AuthResult<()>;

    /// Write both records of a pair, or neither
    async fn insert_pair(&self, access: &TokenRecord, refresh: &TokenRecord) -> AuthResult<()>;

    /// Delete the ACCESS record `access_id` and the REFRESH record of
    /// `pair_id` together, or neither. Returns the number removed (0 to 2).
    async fn delete_pair(&self, access_id: AccessId, pair_id: PairId) -> AuthResult<u64>;

    async fn find_owner_by_id_and_kind(
        &self,
        token_id: Uuid,
        kind: TokenKind,
    ) -> AuthResult<Option<UserId>>;

    /// Atomically consume `rotation.consumed` and store the replacement pair.
    ///
    /// Returns `false`, with nothing written, when the refresh record was
    /// already gone. Among concurrent callers presenting the same refresh
    /// token at most one observes `true`.
    async fn rotate_refresh(&self, rotation: &RefreshRotation) -> AuthResult<bool>;

    /// Delete every record of `owner`, keeping the pair `except` if given
    async fn delete_all_for_user(&self, owner: UserId, except: Option<PairId>) -> AuthResult<u64>;

    /// Remove records whose expiry has passed
    async fn delete_expired(&self) -> AuthResult<u64>;
}

/// Outbound account messages (e.g. email). Called off the request path.
#[trait_variant::make(AccountNotifier: Send)]
pub trait LocalAccountNotifier {
    async fn registration_pending(&self, email: &Email, confirmation_token: &str)
    -> AuthResult<()>;

    async fn registration_confirmed(&self, email: &Email) -> AuthResult<()>;

    async fn password_reset(&self, email: &Email, temporary_password: &str) -> AuthResult<()>;
}
