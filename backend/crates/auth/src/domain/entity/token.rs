//! Token pair and metadata record entities

use chrono::{DateTime, Duration, Utc};
use kernel::id::{AccessId, PairId, RefreshId};
use uuid::Uuid;

use crate::domain::value_object::{token_kind::TokenKind, user_id::UserId};

/// Server-side entry that makes one signed token revocable.
///
/// Created at mint time, deleted on revocation or rotation, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub kind: TokenKind,
    pub token_id: Uuid,
    pub pair_id: PairId,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Time-to-live the record was created with
    pub fn ttl(&self) -> Duration {
        self.expires_at - self.created_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Result of a mint: two independently signed tokens sharing one pair id.
#[derive(Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_id: AccessId,
    pub refresh_id: RefreshId,
    pub pair_id: PairId,
    pub owner: UserId,
    pub issued_at: DateTime<Utc>,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenPair {
    pub fn access_record(&self) -> TokenRecord {
        TokenRecord {
            kind: TokenKind::Access,
            token_id: self.access_id.into_uuid(),
            pair_id: self.pair_id,
            owner: self.owner,
            created_at: self.issued_at,
            expires_at: self.access_expires_at,
        }
    }

    pub fn refresh_record(&self) -> TokenRecord {
        TokenRecord {
            kind: TokenKind::Refresh,
            token_id: self.refresh_id.into_uuid(),
            pair_id: self.pair_id,
            owner: self.owner,
            created_at: self.issued_at,
            expires_at: self.refresh_expires_at,
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_id", &self.access_id)
            .field("refresh_id", &self.refresh_id)
            .field("pair_id", &self.pair_id)
            .field("owner", &self.owner)
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish_non_exhaustive()
    }
}

/// Verified facts about the access token of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDetails {
    pub access_id: AccessId,
    pub pair_id: PairId,
    pub owner: UserId,
    pub expires_at: DateTime<Utc>,
}
