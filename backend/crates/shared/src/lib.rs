//! Shared kernel for the backend crates.
//!
//! Holds only vocabulary that every bounded context agrees on:
//! - the unified [`error::app_error::AppError`] and its [`error::kind::ErrorKind`]
//! - typed UUID identifiers ([`id::Id`])
//!
//! Framework integrations (`sqlx`, `axum`) are opt-in through cargo features.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
