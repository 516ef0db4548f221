//! Sign In Use Case
//!
//! Verifies credentials and issues a persisted token pair.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::token_lifecycle::TokenLifecycleManager;
use crate::domain::entity::{token::TokenPair, user::User};
use crate::domain::repository::{TokenRepository, UserRepository};
use crate::error::AuthResult;

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub user: User,
    pub tokens: TokenPair,
}

/// Sign in use case
pub struct SignInUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    user_repo: Arc<U>,
    lifecycle: TokenLifecycleManager<U, T>,
}

impl<U, T> SignInUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<T>, config: Arc<AuthConfig>) -> Self {
        let lifecycle = TokenLifecycleManager::new(Arc::clone(&user_repo), token_repo, config);
        Self {
            user_repo,
            lifecycle,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let mut user = self
            .lifecycle
            .authenticate(&input.email, input.password)
            .await?;

        let tokens = self.lifecycle.mint(user.user_id)?;
        self.lifecycle.persist(&tokens).await?;

        // The pair is already live; a failed bookkeeping write must not undo it
        let now = Utc::now();
        match self
            .lifecycle
            .bounded(
                "update_last_login",
                self.user_repo.update_last_login(user.user_id, now),
            )
            .await
        {
            Ok(()) => user.last_login_at = Some(now),
            Err(e) => {
                tracing::warn!(user_id = %user.user_id, error = %e, "Failed to record last login");
            }
        }

        tracing::info!(
            user_id = %user.user_id,
            pair_id = %tokens.pair_id,
            "User signed in"
        );

        Ok(SignInOutput { user, tokens })
    }
}
