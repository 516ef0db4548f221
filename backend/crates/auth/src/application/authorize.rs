//! Request Authorization
//!
//! Turns an incoming request into the identity that owns it, or a rejection.

use axum::http::HeaderMap;
use platform::bearer::extract_bearer_token;

use crate::application::token_lifecycle::TokenLifecycleManager;
use crate::domain::entity::token::AccessDetails;
use crate::domain::repository::{TokenRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Identity bound to an authorized request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub access: AccessDetails,
}

pub struct RequestAuthenticator<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    lifecycle: TokenLifecycleManager<U, T>,
}

impl<U, T> RequestAuthenticator<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    pub fn new(lifecycle: TokenLifecycleManager<U, T>) -> Self {
        Self { lifecycle }
    }

    /// Authorize from the `Authorization: Bearer` header.
    pub async fn authorize(&self, headers: &HeaderMap) -> AuthResult<AuthenticatedUser> {
        let token = extract_bearer_token(headers)?;
        self.authorize_token(token).await
    }

    /// Validate the token, then re-derive the owner from the store.
    ///
    /// The record may disappear between the two reads (concurrent sign-out);
    /// that is reported as `Revoked`.
    pub async fn authorize_token(&self, access_token: &str) -> AuthResult<AuthenticatedUser> {
        let access = self.lifecycle.validate(access_token).await?;

        match self.lifecycle.fetch_owner(&access).await? {
            None => Err(AuthError::Revoked),
            Some(owner) if owner != access.owner => Err(AuthError::Forbidden),
            Some(owner) => Ok(AuthenticatedUser {
                user_id: owner,
                access,
            }),
        }
    }
}
