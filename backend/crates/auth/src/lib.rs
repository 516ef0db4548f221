//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, token codec, repository traits
//! - `application/` - Token lifecycle, request authorization, use cases
//! - `infra/` - PostgreSQL and in-memory stores, notifier
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Email + password sign-in issuing an access/refresh JWT pair
//! - Revocable tokens: every token has a server-side metadata record
//! - Single-use refresh rotation
//! - Registration with emailed confirmation token
//! - Password reset with a mailed temporary password
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Access and refresh tokens signed with distinct HS256 secrets
//! - A token authorizes only while its metadata record exists with the
//!   same owner; deleting the record revokes it immediately

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AdminCredentials, AuthConfig};
pub use application::{
    AuthenticatedUser, BootstrapAdminUseCase, RequestAuthenticator, TokenLifecycleManager,
};
pub use error::{AuthError, AuthResult, TokenError};
pub use infra::{InMemoryAuthRepository, LogNotifier, PgAuthRepository};
pub use presentation::router::{auth_router, auth_router_generic};
pub use platform::jwt::JwtSecret;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
