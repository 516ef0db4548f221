//! Sign Up Use Case
//!
//! Creates an unconfirmed account and sends its confirmation token.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_lifecycle::bounded;
use crate::domain::entity::user::NewUser;
use crate::domain::repository::{AccountNotifier, UserRepository};
use crate::domain::value_object::{
    confirmation_token::ConfirmationToken,
    email::Email,
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user_id: UserId,
    pub email: Email,
}

/// Sign up use case
pub struct SignUpUseCase<U, N>
where
    U: UserRepository,
    N: AccountNotifier,
{
    user_repo: Arc<U>,
    notifier: Arc<N>,
    config: Arc<AuthConfig>,
}

impl<U, N> SignUpUseCase<U, N>
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

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let email = Email::new(&input.email)?;

        let taken = bounded(
            &self.config,
            "exists_by_email",
            self.user_repo.exists_by_email(&email),
        )
        .await?;
        if taken {
            return Err(AuthError::EmailTaken);
        }

        let raw_password = RawPassword::new(input.password)?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let confirmation = ConfirmationToken::generate();
        let new_user = NewUser::pending(email, password_hash, confirmation.digest());
        let user = bounded(&self.config, "create", self.user_repo.create(&new_user)).await?;

        tracing::info!(user_id = %user.user_id, "User signed up");

        // Delivery runs detached; the account exists whether or not it succeeds
        let notifier = Arc::clone(&self.notifier);
        let recipient = user.email.clone();
        let token = confirmation.into_string();
        tokio::spawn(async move {
            if let Err(e) = notifier.registration_pending(&recipient, &token).await {
                tracing::warn!(error = %e, "Failed to send registration confirmation");
            }
        });

        Ok(SignUpOutput {
            user_id: user.user_id,
            email: user.email,
        })
    }
}
