//! Account notifications written to the log
//!
//! Stands in for an email gateway. Confirmation tokens and temporary
//! passwords are never logged; only their presence is.

use crate::domain::repository::AccountNotifier;
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl AccountNotifier for LogNotifier {
    async fn registration_pending(&self, email: &Email, confirmation_token: &str) -> AuthResult<()> {
        tracing::info!(
            domain = email.domain(),
            token_len = confirmation_token.len(),
            "Registration confirmation ready for delivery"
        );
        Ok(())
    }

    async fn registration_confirmed(&self, email: &Email) -> AuthResult<()> {
        tracing::info!(domain = email.domain(), "Registration confirmed notice ready for delivery");
        Ok(())
    }

    async fn password_reset(&self, email: &Email, temporary_password: &str) -> AuthResult<()> {
        tracing::info!(
            domain = email.domain(),
            password_len = temporary_password.len(),
            "Temporary password ready for delivery"
        );
        Ok(())
    }
}
