//! Auth Middleware
//!
//! Guards protected routes with the bearer access token.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::application::{RequestAuthenticator, TokenLifecycleManager};
use crate::domain::repository::AccountNotifier;
use crate::error::AuthError;
use crate::presentation::handlers::{AuthAppState, AuthStore};

/// Middleware that requires a valid, unrevoked access token.
///
/// On success the [`AuthenticatedUser`](crate::application::AuthenticatedUser)
/// is stored in the request extensions for downstream handlers.
pub async fn require_bearer_auth<R, N>(
    State(state): State<AuthAppState<R, N>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let authenticator = RequestAuthenticator::new(TokenLifecycleManager::new(
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    ));

    let caller = authenticator.authorize(req.headers()).await?;
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
