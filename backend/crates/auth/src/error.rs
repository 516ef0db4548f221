//! Auth Error Types
//!
//! Every failure the token lifecycle can produce, plus the ambient ones
//! (validation, storage). Each variant carries a stable machine-readable
//! code and maps onto the unified `kernel::error::AppError` at the HTTP
//! boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::jwt::JwtError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Why a signed token was rejected by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("signature does not verify")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,
}

impl TokenError {
    pub const fn code(&self) -> &'static str {
        match self {
            TokenError::InvalidSignature => "TOKEN_INVALID_SIGNATURE",
            TokenError::Expired => "TOKEN_EXPIRED",
            TokenError::Malformed => "TOKEN_MALFORMED",
        }
    }
}

impl TryFrom<JwtError> for TokenError {
    /// Signing failures are not verification outcomes.
    type Error = String;

    fn try_from(err: JwtError) -> Result<Self, Self::Error> {
        match err {
            JwtError::InvalidSignature => Ok(TokenError::InvalidSignature),
            JwtError::Expired => Ok(TokenError::Expired),
            JwtError::Malformed => Ok(TokenError::Malformed),
            JwtError::Signing(msg) => Err(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password (indistinguishable on purpose)
    #[error("Invalid email or password")]
    CredentialsNotFound,

    #[error("Account has not been confirmed yet")]
    Unconfirmed,

    #[error("Bearer token is missing")]
    MissingBearerToken,

    /// Access token rejected by the codec
    #[error("Access token rejected: {0}")]
    Unauthenticated(TokenError),

    /// Refresh token rejected by the codec; it must not be renewed
    #[error("Refresh token rejected: {0}")]
    RefreshExpired(TokenError),

    /// Valid signature but no metadata record
    #[error("Token has been revoked")]
    Revoked,

    /// Claimed owner differs from the owner stored with the access record
    #[error("Token owner mismatch")]
    OwnerMismatch,

    /// Claimed owner differs from the owner re-derived at authorization
    #[error("Forbidden")]
    Forbidden,

    /// Refresh token already consumed (reuse or lost rotation race)
    #[error("Refresh token is no longer valid")]
    Unauthorized,

    /// Store unreachable or too slow; the detail is for logs only
    #[error("Service temporarily unavailable")]
    StoreUnavailable(String),

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    #[error("Confirmation token not found")]
    ConfirmationNotFound,

    #[error("Account is already confirmed")]
    AlreadyConfirmed,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid auth configuration: {0}")]
    InvalidConfig(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::CredentialsNotFound
            | AuthError::MissingBearerToken
            | AuthError::Unauthenticated(_)
            | AuthError::RefreshExpired(_)
            | AuthError::Revoked
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::Unconfirmed | AuthError::OwnerMismatch | AuthError::Forbidden => {
                ErrorKind::Forbidden
            }
            AuthError::EmailTaken | AuthError::AlreadyConfirmed => ErrorKind::Conflict,
            AuthError::InvalidEmail(_) | AuthError::PasswordValidation(_) => ErrorKind::BadRequest,
            AuthError::ConfirmationNotFound | AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::StoreUnavailable(_) => ErrorKind::ServiceUnavailable,
            AuthError::InvalidConfig(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Stable identifier clients can branch on
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::CredentialsNotFound => "CREDENTIALS_NOT_FOUND",
            AuthError::Unconfirmed => "ACCOUNT_UNCONFIRMED",
            AuthError::MissingBearerToken => "MISSING_BEARER_TOKEN",
            AuthError::Unauthenticated(e) => e.code(),
            AuthError::RefreshExpired(_) => "REFRESH_TOKEN_REJECTED",
            AuthError::Revoked => "TOKEN_REVOKED",
            AuthError::OwnerMismatch => "TOKEN_OWNER_MISMATCH",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::Unauthorized => "REFRESH_TOKEN_CONSUMED",
            AuthError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AuthError::EmailTaken => "EMAIL_TAKEN",
            AuthError::InvalidEmail(_) => "INVALID_EMAIL",
            AuthError::PasswordValidation(_) => "PASSWORD_POLICY",
            AuthError::ConfirmationNotFound => "CONFIRMATION_NOT_FOUND",
            AuthError::AlreadyConfirmed => "ALREADY_CONFIRMED",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::InvalidConfig(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string()).with_code(self.code());
        match self {
            AuthError::Unconfirmed => err.with_action("Confirm your email address first"),
            AuthError::Revoked | AuthError::Unauthorized | AuthError::RefreshExpired(_) => {
                err.with_action("Please sign in again")
            }
            AuthError::StoreUnavailable(_) => err.with_action("Please retry shortly"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::StoreUnavailable(detail) => {
                tracing::error!(detail = %detail, "Auth store unavailable");
            }
            AuthError::Internal(msg) | AuthError::InvalidConfig(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::OwnerMismatch | AuthError::Forbidden => {
                tracing::warn!(code = self.code(), "Token owner disagreement");
            }
            AuthError::Unauthorized => {
                tracing::warn!("Consumed refresh token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        if kernel::error::conversions::is_transient(&err) {
            AuthError::StoreUnavailable(err.to_string())
        } else {
            AuthError::Database(err)
        }
    }
}

impl From<platform::bearer::BearerError> for AuthError {
    fn from(err: platform::bearer::BearerError) -> Self {
        match err {
            platform::bearer::BearerError::Missing => AuthError::MissingBearerToken,
            platform::bearer::BearerError::Malformed => {
                AuthError::Unauthenticated(TokenError::Malformed)
            }
        }
    }
}
