//! Confirm Registration Use Case

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_lifecycle::bounded;
use crate::domain::repository::{AccountNotifier, UserRepository};
use crate::domain::value_object::{confirmation_token::ConfirmationToken, user_id::UserId};
use crate::error::{AuthError, AuthResult};

pub struct ConfirmRegistrationUseCase<U, N>
where
    U: UserRepository,
    N: AccountNotifier,
{
    user_repo: Arc<U>,
    notifier: Arc<N>,
    config: Arc<AuthConfig>,
}

impl<U, N> ConfirmRegistrationUseCase<U, N>
where
    U: UserRepository,
    N: AccountNotifier + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, notifier: Arc<N>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            notifier,
            config,
        }
    }

    /// Confirm the account the raw `token` was issued for.
    pub async fn execute(&self, token: &str) -> AuthResult<UserId> {
        let digest = ConfirmationToken::digest_of(token);

        let user = bounded(
            &self.config,
            "find_by_confirmation_digest",
            self.user_repo.find_by_confirmation_digest(&digest),
        )
        .await?
        .ok_or(AuthError::ConfirmationNotFound)?;

        if user.confirmed {
            return Err(AuthError::AlreadyConfirmed);
        }

        bounded(&self.config, "confirm", self.user_repo.confirm(user.user_id)).await?;
        tracing::info!(user_id = %user.user_id, "Registration confirmed");

        let notifier = Arc::clone(&self.notifier);
        let recipient = user.email;
        tokio::spawn(async move {
            if let Err(e) = notifier.registration_confirmed(&recipient).await {
                tracing::warn!(error = %e, "Failed to send registration notice");
            }
        });

        Ok(user.user_id)
    }
}
