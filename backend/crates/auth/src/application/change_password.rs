//! Change Password Use Case
//!
//! Replaces the caller's password hash and revokes every other pair, so a
//! leaked token does not outlive the password it was obtained with.

use std::sync::Arc;

use crate::application::authorize::AuthenticatedUser;
use crate::application::config::AuthConfig;
use crate::application::token_lifecycle::TokenLifecycleManager;
use crate::domain::repository::{TokenRepository, UserRepository};
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::AuthResult;

pub struct ChangePasswordUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    user_repo: Arc<U>,
    lifecycle: TokenLifecycleManager<U, T>,
    config: Arc<AuthConfig>,
}

impl<U, T> ChangePasswordUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<T>, config: Arc<AuthConfig>) -> Self {
        let lifecycle =
            TokenLifecycleManager::new(Arc::clone(&user_repo), token_repo, Arc::clone(&config));
        Self {
            user_repo,
            lifecycle,
            config,
        }
    }

    /// Returns the number of revoked token records.
    pub async fn execute(&self, caller: &AuthenticatedUser, new_password: String) -> AuthResult<u64> {
        let raw_password = RawPassword::new(new_password)?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        self.lifecycle
            .bounded(
                "update_password",
                self.user_repo.update_password(caller.user_id, &password_hash),
            )
            .await?;

        let revoked = self
            .lifecycle
            .revoke_all(caller.user_id, Some(caller.access.pair_id))
            .await?;

        tracing::info!(user_id = %caller.user_id, revoked, "Password changed");
        Ok(revoked)
    }
}
