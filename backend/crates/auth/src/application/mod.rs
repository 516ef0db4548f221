//! Application Layer
//!
//! Token lifecycle, request authorization and the use cases built on them.

pub mod authorize;
pub mod bootstrap_admin;
pub mod change_password;
pub mod config;
pub mod confirm_registration;
pub mod profile;
pub mod refresh;
pub mod reset_password;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod token_lifecycle;

// Re-exports
pub use authorize::{AuthenticatedUser, RequestAuthenticator};
pub use bootstrap_admin::BootstrapAdminUseCase;
pub use change_password::ChangePasswordUseCase;
pub use config::{AdminCredentials, AuthConfig};
pub use confirm_registration::ConfirmRegistrationUseCase;
pub use profile::ProfileUseCase;
pub use refresh::RefreshTokenUseCase;
pub use reset_password::ResetPasswordUseCase;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use token_lifecycle::TokenLifecycleManager;
