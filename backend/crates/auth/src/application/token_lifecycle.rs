//! Token Lifecycle
//!
//! Owns every read and write of token metadata. A signed token authorizes a
//! request only while its signature verifies, it is unexpired, and its
//! metadata record still exists with the same owner. Deleting the record is
//! revocation.
//!
//! Per pair: `minted -> persisted -> { rotated away | revoked | expired }`,
//! with no way back from a terminal state.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use kernel::id::{AccessId, PairId, RefreshId};

use crate::application::config::AuthConfig;
use crate::domain::codec::{AccessClaims, RefreshClaims, TokenClaims, TokenCodec};
use crate::domain::entity::{
    token::{AccessDetails, TokenPair},
    user::User,
};
use crate::domain::repository::{RefreshRotation, TokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    token_kind::TokenKind,
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult, TokenError};

pub struct TokenLifecycleManager<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<T>,
    codec: TokenCodec,
    config: Arc<AuthConfig>,
}

impl<U, T> TokenLifecycleManager<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<T>, config: Arc<AuthConfig>) -> Self {
        let codec = TokenCodec::new(&config.access_secret, &config.refresh_secret);
        Self {
            user_repo,
            token_repo,
            codec,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Resolve credentials to a confirmed account.
    ///
    /// Unknown email and wrong password both yield `CredentialsNotFound`.
    /// An unconfirmed account yields `Unconfirmed` whatever the password.
    pub async fn authenticate(&self, email: &str, password: String) -> AuthResult<User> {
        let email = Email::new(email).map_err(|_| AuthError::CredentialsNotFound)?;

        let mut user = self
            .bounded("find_by_email", self.user_repo.find_by_email(&email))
            .await?
            .ok_or(AuthError::CredentialsNotFound)?;

        if !user.can_sign_in() {
            return Err(AuthError::Unconfirmed);
        }

        let submitted = RawPassword::submitted(password);
        if !user.password_hash.verify(&submitted, self.config.pepper())? {
            return Err(AuthError::CredentialsNotFound);
        }

        if user.password_hash.needs_rehash() {
            self.upgrade_hash(&mut user, &submitted).await;
        }

        Ok(user)
    }

    /// Re-hash a verified password at the current cost. Failure leaves the
    /// old hash in place; sign-in goes ahead either way.
    async fn upgrade_hash(&self, user: &mut User, submitted: &RawPassword) {
        let upgraded = match UserPassword::from_raw(submitted, self.config.pepper()) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(user_id = %user.user_id, error = %e, "Password rehash failed");
                return;
            }
        };

        match self
            .bounded(
                "update_password",
                self.user_repo.update_password(user.user_id, &upgraded),
            )
            .await
        {
            Ok(()) => {
                tracing::info!(user_id = %user.user_id, "Password hash upgraded");
                user.password_hash = upgraded;
            }
            Err(e) => {
                tracing::warn!(user_id = %user.user_id, error = %e, "Failed to store upgraded password hash");
            }
        }
    }

    /// Sign a fresh pair for `owner`. Touches no stored state.
    pub fn mint(&self, owner: UserId) -> AuthResult<TokenPair> {
        let issued_at = Utc::now();
        let access_expires_at = issued_at + to_delta(self.config.access_ttl)?;
        let refresh_expires_at = issued_at + to_delta(self.config.refresh_ttl)?;

        let access_id = AccessId::new();
        let refresh_id = RefreshId::new();
        let pair_id = PairId::new();

        let access_token = self.codec.encode(&TokenClaims::Access(AccessClaims {
            authorized: true,
            access_id,
            pair_id,
            user_id: owner,
            iat: issued_at.timestamp(),
            exp: access_expires_at.timestamp(),
        }))?;

        let refresh_token = self.codec.encode(&TokenClaims::Refresh(RefreshClaims {
            refresh_id,
            pair_id,
            user_id: owner,
            iat: issued_at.timestamp(),
            exp: refresh_expires_at.timestamp(),
        }))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_id,
            refresh_id,
            pair_id,
            owner,
            issued_at,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Store both metadata records of `pair` atomically.
    pub async fn persist(&self, pair: &TokenPair) -> AuthResult<()> {
        let access = pair.access_record();
        let refresh = pair.refresh_record();
        self.bounded("insert_pair", self.token_repo.insert_pair(&access, &refresh))
            .await?;

        tracing::debug!(
            user_id = %pair.owner,
            pair_id = %pair.pair_id,
            "Token pair persisted"
        );
        Ok(())
    }

    /// Check an access token against the codec and the metadata store.
    pub async fn validate(&self, access_token: &str) -> AuthResult<AccessDetails> {
        let claims = self
            .codec
            .decode_access(access_token)
            .map_err(AuthError::Unauthenticated)?;

        let stored_owner = self
            .bounded(
                "find_owner_by_id_and_kind",
                self.token_repo
                    .find_owner_by_id_and_kind(claims.access_id.into_uuid(), TokenKind::Access),
            )
            .await?;

        match stored_owner {
            None => Err(AuthError::Revoked),
            Some(owner) if owner != claims.user_id => {
                tracing::warn!(
                    access_id = %claims.access_id,
                    claimed = %claims.user_id,
                    stored = %owner,
                    "Access record owner differs from token claims"
                );
                Err(AuthError::OwnerMismatch)
            }
            Some(owner) => Ok(AccessDetails {
                access_id: claims.access_id,
                pair_id: claims.pair_id,
                owner,
                expires_at: DateTime::from_timestamp(claims.exp, 0)
                    .ok_or(AuthError::Unauthenticated(TokenError::Malformed))?,
            }),
        }
    }

    /// Exchange a refresh token, once, for a new persisted pair.
    ///
    /// The store consumes the presented refresh record and writes the new
    /// pair in one atomic step; a consumed or unknown refresh record fails
    /// with `Unauthorized`. The consumed pair's access token stays valid
    /// until its own expiry unless `revoke_access_on_rotate` is set.
    pub async fn rotate(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self
            .codec
            .decode_refresh(refresh_token)
            .map_err(AuthError::RefreshExpired)?;

        let pair = self.mint(claims.user_id)?;
        let rotation = RefreshRotation {
            consumed: claims.refresh_id,
            owner: claims.user_id,
            revoke_access_of: self
                .config
                .revoke_access_on_rotate
                .then_some(claims.pair_id),
            access: pair.access_record(),
            refresh: pair.refresh_record(),
        };

        let rotated = self
            .bounded("rotate_refresh", self.token_repo.rotate_refresh(&rotation))
            .await?;

        if !rotated {
            tracing::warn!(
                user_id = %claims.user_id,
                pair_id = %claims.pair_id,
                "Refresh token already consumed"
            );
            return Err(AuthError::Unauthorized);
        }

        tracing::info!(
            user_id = %claims.user_id,
            old_pair_id = %claims.pair_id,
            pair_id = %pair.pair_id,
            "Refresh token rotated"
        );
        Ok(pair)
    }

    /// Delete both records of the pair in one store call, so a failure
    /// leaves the pair intact and the caller can retry. Deleting nothing is
    /// not an error.
    pub async fn revoke(&self, details: &AccessDetails) -> AuthResult<()> {
        let rows = self
            .bounded(
                "delete_pair",
                self.token_repo.delete_pair(details.access_id, details.pair_id),
            )
            .await?;

        tracing::info!(
            user_id = %details.owner,
            pair_id = %details.pair_id,
            rows,
            "Token pair revoked"
        );
        Ok(())
    }

    /// Owner of the access record as the store sees it
    pub async fn fetch_owner(&self, details: &AccessDetails) -> AuthResult<Option<UserId>> {
        self.bounded(
            "find_owner_by_id_and_kind",
            self.token_repo
                .find_owner_by_id_and_kind(details.access_id.into_uuid(), TokenKind::Access),
        )
        .await
    }

    /// Revoke every pair of `owner`, optionally sparing one.
    pub async fn revoke_all(&self, owner: UserId, except: Option<PairId>) -> AuthResult<u64> {
        let rows = self
            .bounded(
                "delete_all_for_user",
                self.token_repo.delete_all_for_user(owner, except),
            )
            .await?;

        tracing::info!(user_id = %owner, rows, kept_pair = ?except, "Token pairs revoked");
        Ok(rows)
    }

    /// Drop metadata records that can no longer authorize anything.
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let rows = self
            .bounded("delete_expired", self.token_repo.delete_expired())
            .await?;

        if rows > 0 {
            tracing::info!(rows, "Expired token records purged");
        }
        Ok(rows)
    }

    pub(crate) async fn bounded<F, R>(&self, operation: &'static str, call: F) -> AuthResult<R>
    where
        F: Future<Output = AuthResult<R>>,
    {
        bounded(&self.config, operation, call).await
    }
}

/// Bound one store call by `store_timeout`. Nothing is retried.
pub(crate) async fn bounded<F, R>(
    config: &AuthConfig,
    operation: &'static str,
    call: F,
) -> AuthResult<R>
where
    F: Future<Output = AuthResult<R>>,
{
    match tokio::time::timeout(config.store_timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout = ?config.store_timeout, "Store call timed out");
            Err(AuthError::StoreUnavailable(format!(
                "{operation} exceeded {:?}",
                config.store_timeout
            )))
        }
    }
}

fn to_delta(ttl: std::time::Duration) -> AuthResult<TimeDelta> {
    TimeDelta::from_std(ttl).map_err(|_| AuthError::InvalidConfig(format!("ttl out of range: {ttl:?}")))
}
