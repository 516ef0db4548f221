//! HTTP Handlers

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AuthenticatedUser, ChangePasswordUseCase, ConfirmRegistrationUseCase, ProfileUseCase,
    RefreshTokenUseCase, ResetPasswordUseCase, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
};
use crate::domain::repository::{AccountNotifier, TokenRepository, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{
    ChangePasswordRequest, ChangePasswordResponse, ConfirmRegistrationResponse, LoginRequest,
    LoginResponse, LogoutAllResponse, RefreshRequest, RegisterRequest, RegisterResponse,
    ResetPasswordRequest, TokenPairResponse, UserResponse,
};

/// Credential store and token metadata store behind one handle
pub trait AuthStore: UserRepository + TokenRepository + Send + Sync + 'static {}

impl<T> AuthStore for T where T: UserRepository + TokenRepository + Send + Sync + 'static {}

/// Shared state for auth handlers
pub struct AuthAppState<R, N>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub notifier: Arc<N>,
    pub config: Arc<AuthConfig>,
}

impl<R, N> AuthAppState<R, N>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, notifier: Arc<N>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }
}

impl<R, N> Clone for AuthAppState<R, N>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            notifier: Arc::clone(&self.notifier),
            config: Arc::clone(&self.config),
        }
    }
}

// ============================================================================
// Sign In / Sign Out
// ============================================================================

/// POST /api/v1/login
pub async fn login<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        user: output.user.into(),
        tokens: output.tokens.into(),
    }))
}

/// POST /api/v1/logout
pub async fn logout<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let use_case = SignOutUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    use_case.execute(&caller).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/logout-all
pub async fn logout_all<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> AuthResult<Json<LogoutAllResponse>>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let use_case = SignOutUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let revoked_tokens = use_case.execute_all(&caller).await?;

    Ok(Json(LogoutAllResponse { revoked_tokens }))
}

// ============================================================================
// Token Refresh
// ============================================================================

/// POST /api/v1/token/refresh
pub async fn refresh_token<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let use_case =
        RefreshTokenUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let pair = use_case.execute(&req.refresh_token).await?;

    Ok((StatusCode::CREATED, Json(TokenPairResponse::from(pair))))
}

// ============================================================================
// Registration
// ============================================================================

/// POST /api/v1/register-user
pub async fn register_user<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let use_case =
        SignUpUseCase::new(state.repo.clone(), state.notifier.clone(), state.config.clone());

    let output = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: output.user_id.value(),
            email: output.email.into(),
        }),
    ))
}

/// GET /api/v1/confirm-registration/{token}
pub async fn confirm_registration<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Path(token): Path<String>,
) -> AuthResult<Json<ConfirmRegistrationResponse>>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let use_case = ConfirmRegistrationUseCase::new(
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );
    let user_id = use_case.execute(&token).await?;

    Ok(Json(ConfirmRegistrationResponse {
        user_id: user_id.value(),
        confirmed: true,
    }))
}

/// POST /api/v1/reset-password
///
/// 202 for any well-formed email, registered or not.
pub async fn reset_password<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let use_case = ResetPasswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );
    use_case.execute(&req.email).await?;

    Ok(StatusCode::ACCEPTED)
}

// ============================================================================
// Current User
// ============================================================================

/// POST /api/v1/user/change-password
pub async fn change_password<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<Json<ChangePasswordResponse>>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let use_case =
        ChangePasswordUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let revoked_tokens = use_case.execute(&caller, req.password).await?;

    Ok(Json(ChangePasswordResponse { revoked_tokens }))
}

/// GET /api/v1/user/me
pub async fn current_user<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> AuthResult<Json<UserResponse>>
where
    R: AuthStore,
    N: AccountNotifier + Send + Sync + 'static,
{
    let user = ProfileUseCase::new(state.repo.clone(), state.config.clone())
        .execute(&caller)
        .await?;

    Ok(Json(user.into()))
}
