//! Current user lookup

use std::sync::Arc;

use crate::application::authorize::AuthenticatedUser;
use crate::application::config::AuthConfig;
use crate::application::token_lifecycle::bounded;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct ProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, caller: &AuthenticatedUser) -> AuthResult<User> {
        bounded(
            &self.config,
            "find_by_id",
            self.user_repo.find_by_id(caller.user_id),
        )
        .await?
        .ok_or(AuthError::UserNotFound)
    }
}
