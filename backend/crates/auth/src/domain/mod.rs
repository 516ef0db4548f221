//! Domain Layer
//!
//! Contains entities, value objects, the token codec and repository traits.

pub mod codec;
pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use codec::{AccessClaims, RefreshClaims, TokenClaims, TokenCodec};
pub use entity::{
    token::{AccessDetails, TokenPair, TokenRecord},
    user::{NewUser, User},
};
pub use repository::{AccountNotifier, RefreshRotation, TokenRepository, UserRepository};
