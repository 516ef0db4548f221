//! Refresh Token Use Case

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_lifecycle::TokenLifecycleManager;
use crate::domain::entity::token::TokenPair;
use crate::domain::repository::{TokenRepository, UserRepository};
use crate::error::AuthResult;

pub struct RefreshTokenUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    lifecycle: TokenLifecycleManager<U, T>,
}

impl<U, T> RefreshTokenUseCase<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<T>, config: Arc<AuthConfig>) -> Self {
        Self {
            lifecycle: TokenLifecycleManager::new(user_repo, token_repo, config),
        }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        self.lifecycle.rotate(refresh_token).await
    }
}
