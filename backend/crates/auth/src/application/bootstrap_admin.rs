//! Administrator bootstrap, run once at startup

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_lifecycle::bounded;
use crate::domain::entity::user::NewUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::AuthResult;

pub struct BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Create the configured administrator if it does not exist yet.
    ///
    /// Returns the new id, or `None` when nothing was created.
    pub async fn execute(&self) -> AuthResult<Option<UserId>> {
        let Some(admin) = &self.config.admin else {
            return Ok(None);
        };

        let email = Email::new(&admin.email)?;
        let present = bounded(
            &self.config,
            "exists_by_email",
            self.user_repo.exists_by_email(&email),
        )
        .await?;
        if present {
            tracing::debug!("Administrator already present");
            return Ok(None);
        }

        let raw_password = RawPassword::new(admin.password.clone())?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;
        let new_user = NewUser::admin(email, password_hash);
        let user = bounded(&self.config, "create", self.user_repo.create(&new_user)).await?;

        tracing::info!(user_id = %user.user_id, "Administrator account created");
        Ok(Some(user.user_id))
    }
}
