//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AccountNotifier;
use crate::infra::{notifier::LogNotifier, postgres::PgAuthRepository};
use crate::presentation::handlers::{self, AuthAppState, AuthStore};
use crate::presentation::middleware::require_bearer_auth;

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(AuthAppState::new(
        Arc::new(repo),
        Arc::new(LogNotifier),
        Arc::new(config),
    ))
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R, N>(state: AuthAppState<R, N>) -> Router
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let protected = Router::new()
        .route("/logout", post(handlers::logout::<R, N>))
        .route("/logout-all", post(handlers::logout_all::<R, N>))
        .route("/user/change-password", post(handlers::change_password::<R, N>))
        .route("/user/me", get(handlers::current_user::<R, N>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer_auth::<R, N>,
        ));

    Router::new()
        .route("/login", post(handlers::login::<R, N>))
        .route("/token/refresh", post(handlers::refresh_token::<R, N>))
        .route("/register-user", post(handlers::register_user::<R, N>))
        .route("/reset-password", post(handlers::reset_password::<R, N>))
        .route(
            "/confirm-registration/{token}",
            get(handlers::confirm_registration::<R, N>),
        )
        .merge(protected)
        .with_state(state)
}
