//! User Entity
//!
//! The credential-store view of an account: identity, password hash and
//! confirmation state.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, user_id::UserId, user_password::UserPassword, user_role::UserRole,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub email: Email,
    pub password_hash: UserPassword,
    pub user_role: UserRole,
    /// Registration confirmed via the emailed token
    pub confirmed: bool,
    /// SHA-256 digest of the pending confirmation token
    pub confirmation_digest: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn can_sign_in(&self) -> bool {
        self.confirmed
    }
}

/// Account about to be created; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: UserPassword,
    pub user_role: UserRole,
    pub confirmed: bool,
    pub confirmation_digest: Option<String>,
}

impl NewUser {
    /// Self-service registration: unconfirmed until the token comes back
    pub fn pending(email: Email, password_hash: UserPassword, confirmation_digest: String) -> Self {
        Self {
            email,
            password_hash,
            user_role: UserRole::User,
            confirmed: false,
            confirmation_digest: Some(confirmation_digest),
        }
    }

    /// Bootstrap administrator: confirmed from the start
    pub fn admin(email: Email, password_hash: UserPassword) -> Self {
        Self {
            email,
            password_hash,
            user_role: UserRole::Admin,
            confirmed: true,
            confirmation_digest: None,
        }
    }

    pub fn into_user(self, user_id: UserId, now: DateTime<Utc>) -> User {
        User {
            user_id,
            email: self.email,
            password_hash: self.password_hash,
            user_role: self.user_role,
            confirmed: self.confirmed,
            confirmation_digest: self.confirmation_digest,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
