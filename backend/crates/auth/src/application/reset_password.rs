//! Reset Password Use Case
//!
//! Replaces a forgotten password with a random temporary one, delivered
//! through the notifier, and signs the account out everywhere.

use std::sync::Arc;

use platform::crypto::random_token;

use crate::application::config::AuthConfig;
use crate::application::token_lifecycle::TokenLifecycleManager;
use crate::domain::repository::{AccountNotifier, TokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::AuthResult;

/// 12 random bytes, 16 base64url characters
const TEMPORARY_PASSWORD_BYTES: usize = 12;

pub struct ResetPasswordUseCase<U, T, N>
where
    U: UserRepository,
    T: TokenRepository,
    N: AccountNotifier,
{
    user_repo: Arc<U>,
    lifecycle: TokenLifecycleManager<U, T>,
    notifier: Arc<N>,
    config: Arc<AuthConfig>,
}

impl<U, T, N> ResetPasswordUseCase<U, T, N>
where
    U: UserRepository,
    T: TokenRepository,
    N: AccountNotifier + Send + Sync + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        token_repo: Arc<T>,
        notifier: Arc<N>,
        config: Arc<AuthConfig>,
    ) -> Self {
        let lifecycle =
            TokenLifecycleManager::new(Arc::clone(&user_repo), token_repo, Arc::clone(&config));
        Self {
            user_repo,
            lifecycle,
            notifier,
            config,
        }
    }

    /// Succeeds whether or not an account exists for `email`.
    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email)?;

        let user = self
            .lifecycle
            .bounded("find_by_email", self.user_repo.find_by_email(&email))
            .await?;
        let Some(user) = user else {
            tracing::debug!(domain = email.domain(), "Password reset for unknown account");
            return Ok(());
        };

        // Generated, not chosen: the policy for user-chosen passwords does not apply
        let temporary = random_token(TEMPORARY_PASSWORD_BYTES);
        let password_hash = UserPassword::from_raw(
            &RawPassword::submitted(temporary.clone()),
            self.config.pepper(),
        )?;

        self.lifecycle
            .bounded(
                "update_password",
                self.user_repo.update_password(user.user_id, &password_hash),
            )
            .await?;
        let revoked = self.lifecycle.revoke_all(user.user_id, None).await?;

        tracing::info!(user_id = %user.user_id, revoked, "Password reset");

        let notifier = Arc::clone(&self.notifier);
        let recipient = user.email;
        tokio::spawn(async move {
            if let Err(e) = notifier.password_reset(&recipient, &temporary).await {
                tracing::warn!(error = %e, "Failed to send temporary password");
            }
        });

        Ok(())
    }
}
