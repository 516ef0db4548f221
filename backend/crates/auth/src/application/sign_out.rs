//! Sign Out Use Case
//!
//! Revokes the caller's token pair, or every pair the caller owns.

use std::sync::Arc;

use crate::application::authorize::AuthenticatedUser;
use crate::application::config::AuthConfig;
use crate::application::token_lifecycle::TokenLifecycleManager;
use crate::domain::repository::{TokenRepository, UserRepository};
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    lifecycle: TokenLifecycleManager<U, T>,
}

impl<U, T> SignOutUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<T>, config: Arc<AuthConfig>) -> Self {
        Self {
            lifecycle: TokenLifecycleManager::new(user_repo, token_repo, config),
        }
    }

    /// Sign out the current pair
    pub async fn execute(&self, caller: &AuthenticatedUser) -> AuthResult<()> {
        self.lifecycle.revoke(&caller.access).await?;

        tracing::info!(user_id = %caller.user_id, "User signed out");
        Ok(())
    }

    /// Sign out every pair of the caller, the current one included
    pub async fn execute_all(&self, caller: &AuthenticatedUser) -> AuthResult<u64> {
        let deleted = self.lifecycle.revoke_all(caller.user_id, None).await?;

        tracing::info!(
            user_id = %caller.user_id,
            deleted = deleted,
            "User signed out everywhere"
        );
        Ok(deleted)
    }
}
